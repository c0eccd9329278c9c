use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::engine::analysis::{FocusArea, Priority};
use crate::ui::theme::{Theme, ThemeColors};

/// Overlay listing the latest analysis: focus areas by priority, then the
/// free-text insights.
pub struct InsightsPanel<'a> {
    focus_areas: &'a [FocusArea],
    insights: &'a [String],
    theme: &'a Theme,
}

impl<'a> InsightsPanel<'a> {
    pub fn new(focus_areas: &'a [FocusArea], insights: &'a [String], theme: &'a Theme) -> Self {
        Self {
            focus_areas,
            insights,
            theme,
        }
    }
}

fn priority_color(priority: Priority, colors: &ThemeColors) -> Color {
    match priority {
        Priority::High => colors.error(),
        Priority::Medium => colors.warning(),
        Priority::Low | Priority::Unspecified => colors.text_pending(),
    }
}

fn priority_tag(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "[high]  ",
        Priority::Medium => "[medium]",
        Priority::Low => "[low]   ",
        Priority::Unspecified => "        ",
    }
}

impl Widget for InsightsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        Clear.render(area, buf);
        let block = Block::bordered()
            .title(" Insights ")
            .title_bottom(Line::from(" [Esc] close ").right_aligned())
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        let mut lines: Vec<Line> = Vec::new();

        if self.focus_areas.is_empty() && self.insights.is_empty() {
            lines.push(Line::from(Span::styled(
                "No analysis yet. Keep typing.",
                Style::default().fg(colors.text_pending()),
            )));
        }

        if !self.focus_areas.is_empty() {
            lines.push(Line::from(Span::styled(
                "Focus areas",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            for area in self.focus_areas {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!(" {} ", priority_tag(area.priority)),
                        Style::default().fg(priority_color(area.priority, colors)),
                    ),
                    Span::styled(
                        format!("{}: ", area.kind.label()),
                        Style::default().fg(colors.fg()),
                    ),
                    Span::styled(
                        area.items.join(", "),
                        Style::default().fg(colors.focused_key()),
                    ),
                ]));
            }
            lines.push(Line::from(""));
        }

        for insight in self.insights {
            lines.push(Line::from(vec![
                Span::styled(" * ", Style::default().fg(colors.accent())),
                Span::styled(insight.as_str(), Style::default().fg(colors.fg())),
            ]));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
