pub mod components;
pub mod keymap;
pub mod layout;
pub mod screen;
pub mod theme;
