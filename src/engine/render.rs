use crate::engine::analysis::FocusSet;

/// Glyph drawn in place of a space so word boundaries stay visible.
pub const SPACE_GLYPH: char = '\u{00b7}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellState {
    Typed,
    Current { focus: bool },
    Untouched,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharCell {
    pub glyph: char,
    pub state: CellState,
    pub is_space: bool,
}

/// Map the cursor against the text. Pure: the same inputs always give the
/// same cells.
pub fn render_cells(text: &[char], position: usize, focus: &FocusSet) -> Vec<CharCell> {
    text.iter()
        .enumerate()
        .map(|(idx, &ch)| {
            let state = if idx < position {
                CellState::Typed
            } else if idx == position {
                CellState::Current {
                    focus: focus.contains(ch),
                }
            } else {
                CellState::Untouched
            };
            let is_space = ch == ' ';
            CharCell {
                glyph: if is_space { SPACE_GLYPH } else { ch },
                state,
                is_space,
            }
        })
        .collect()
}
