use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::ui::screen::Overlay;

/// App-level actions bound to keys outside the typing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    Reset,
    NewText,
    Save,
    ToggleMode,
    Logout,
    ToggleHelp,
    ToggleInsights,
    NextTheme,
    CloseOverlay,
}

/// Map a key to a global command. `None` means the key belongs to the typing
/// input filter.
///
/// While an overlay is showing only Ctrl+C and the overlay keys (F1, F2, Esc)
/// do anything; every other binding is swallowed with the rest of the input.
pub fn command_for(key: &KeyEvent, overlay: Overlay) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::F(1) => return Some(Command::ToggleHelp),
        KeyCode::F(2) => return Some(Command::ToggleInsights),
        KeyCode::Esc if overlay != Overlay::None => return Some(Command::CloseOverlay),
        _ => {}
    }

    if overlay != Overlay::None {
        return None;
    }

    match key.code {
        KeyCode::Char('r') if ctrl => Some(Command::Reset),
        KeyCode::Char('n') if ctrl => Some(Command::NewText),
        KeyCode::Char('s') if ctrl => Some(Command::Save),
        KeyCode::Char('l') if ctrl => Some(Command::ToggleMode),
        KeyCode::Char('o') if ctrl => Some(Command::Logout),
        KeyCode::F(3) => Some(Command::NextTheme),
        _ => None,
    }
}
