use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Below this width the stats move from the sidebar into the header.
const SIDEBAR_MIN_WIDTH: u16 = 90;
/// Below this height the progress bar is dropped to keep the text visible.
const PROGRESS_MIN_HEIGHT: u16 = 16;
const PROGRESS_HEIGHT: u16 = 3;
const POPUP_MIN: (u16, u16) = (48, 12);

/// Where each part of the training screen goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenAreas {
    pub header: Rect,
    pub typing: Rect,
    pub progress: Option<Rect>,
    pub sidebar: Option<Rect>,
    pub footer: Rect,
}

impl ScreenAreas {
    /// Split `area`, reserving `footer_lines` rows at the bottom.
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(footer_lines),
        ])
        .areas(area);

        let (main, sidebar) = if area.width >= SIDEBAR_MIN_WIDTH {
            let [main, side] =
                Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)])
                    .areas(body);
            (main, Some(side))
        } else {
            (body, None)
        };

        let (typing, progress) = if area.height >= PROGRESS_MIN_HEIGHT {
            let [typing, bar] =
                Layout::vertical([Constraint::Min(3), Constraint::Length(PROGRESS_HEIGHT)])
                    .areas(main);
            (typing, Some(bar))
        } else {
            (main, None)
        };

        Self {
            header,
            typing,
            progress,
            sidebar,
            footer,
        }
    }

    pub fn is_wide(&self) -> bool {
        self.sidebar.is_some()
    }
}

/// Greedily pack key hints into as few lines of `width` columns as possible.
/// A hint wider than `width` gets a line of its own.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    if width == 0 {
        return lines;
    }
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        match lines.last_mut() {
            Some(line) if line.chars().count() + 2 + hint.chars().count() <= width => {
                line.push_str("  ");
                line.push_str(hint);
            }
            _ => lines.push(format!(" {hint}")),
        }
    }
    lines
}

/// A popup of `percent_x` by `percent_y` of `area`, centred, never smaller
/// than a readable minimum unless `area` itself is.
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (area.width.saturating_mul(percent_x.min(100)) / 100)
        .max(POPUP_MIN.0)
        .min(area.width);
    let height = (area.height.saturating_mul(percent_y.min(100)) / 100)
        .max(POPUP_MIN.1)
        .min(area.height);

    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    popup
}
