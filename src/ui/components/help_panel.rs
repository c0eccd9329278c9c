use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::ui::theme::Theme;

pub const KEY_BINDINGS: &[(&str, &str)] = &[
    ("Ctrl+R", "Reset session"),
    ("Ctrl+N", "New text"),
    ("Enter", "New text (at the end of the text)"),
    ("Ctrl+S", "Save progress"),
    ("Ctrl+L", "Toggle learn / free mode"),
    ("Ctrl+O", "Log out"),
    ("F1", "This help"),
    ("F2", "Insights"),
    ("F3", "Switch theme"),
    ("Esc", "Close overlay"),
    ("Ctrl+C", "Quit"),
];

pub struct HelpPanel<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPanel<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for HelpPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Keys ")
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let lines: Vec<Line> = KEY_BINDINGS
            .iter()
            .map(|(key, action)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {key:<8}"),
                        Style::default()
                            .fg(colors.accent())
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*action, Style::default().fg(colors.fg())),
                ])
            })
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
