use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a raw key press turns into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Submit this character as the next keystroke.
    Forward(char),
    /// Enter on the last character: ask for a new text.
    RequestNewText,
    /// Swallowed with no effect.
    Absorb,
}

/// Snapshot of the state the filter needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureContext {
    pub overlay_open: bool,
    pub session_active: bool,
    pub position: usize,
    pub text_len: usize,
}

/// Filter one key event. Rules apply in order: overlays swallow everything,
/// nothing goes through without an active session and room left in the text,
/// modifier chords and control keys are dropped, backspace is refused (no
/// corrections), Enter near the end requests a new text, and any other
/// character is forwarded.
pub fn capture(key: &KeyEvent, ctx: &CaptureContext) -> InputAction {
    // Only process Press events; Repeat and Release would inflate input
    if key.kind != KeyEventKind::Press {
        return InputAction::Absorb;
    }

    if ctx.overlay_open {
        return InputAction::Absorb;
    }

    if !ctx.session_active || ctx.position >= ctx.text_len {
        return InputAction::Absorb;
    }

    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::META | KeyModifiers::SUPER)
    {
        return InputAction::Absorb;
    }

    match key.code {
        KeyCode::Modifier(_)
        | KeyCode::CapsLock
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Esc => InputAction::Absorb,
        KeyCode::Backspace => InputAction::Absorb,
        KeyCode::Enter => {
            if ctx.position + 1 >= ctx.text_len {
                InputAction::RequestNewText
            } else {
                InputAction::Absorb
            }
        }
        KeyCode::Char(ch) => InputAction::Forward(ch),
        _ => InputAction::Absorb,
    }
}
