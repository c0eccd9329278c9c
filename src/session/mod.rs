pub mod input;
pub mod keystroke;
pub mod state;
