use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::{Theme, ThemeColors};
use crate::view::StatsView;

pub struct StatsSidebar<'a> {
    stats: &'a StatsView,
    focus_keys: &'a [char],
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(stats: &'a StatsView, focus_keys: &'a [char], theme: &'a Theme) -> Self {
        Self {
            stats,
            focus_keys,
            theme,
        }
    }
}

fn accuracy_color(accuracy: u32, colors: &ThemeColors) -> ratatui::style::Color {
    if accuracy >= 95 {
        colors.success()
    } else if accuracy >= 85 {
        colors.warning()
    } else {
        colors.error()
    }
}

fn row<'a>(label: &'a str, value: String, value_style: Style, colors: &ThemeColors) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(colors.fg())),
        Span::styled(value, value_style),
    ])
}

/// The compact single-line form used in the header when there is no room
/// for the sidebar.
pub fn compact_summary(stats: &StatsView) -> String {
    format!(
        " Lv {} | {} WPM | {}% | Score {} | Streak {} | x{:.1}",
        stats.level, stats.wpm, stats.accuracy, stats.score, stats.streak, stats.combo
    )
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.stats;
        let accent = Style::default().fg(colors.accent());

        let mut lines = vec![
            row("Level:    ", s.level.to_string(), accent.add_modifier(Modifier::BOLD), colors),
            row("Score:    ", s.score.to_string(), accent, colors),
            Line::from(""),
            row("WPM:      ", s.wpm.to_string(), accent, colors),
            row(
                "Accuracy: ",
                format!("{}%", s.accuracy),
                Style::default().fg(accuracy_color(s.accuracy, colors)),
                colors,
            ),
            Line::from(""),
            row("Streak:   ", s.streak.to_string(), Style::default().fg(colors.success()), colors),
            row("Best:     ", s.max_streak.to_string(), Style::default().fg(colors.fg()), colors),
            row("Combo:    ", format!("x{:.1}", s.combo), Style::default().fg(colors.warning()), colors),
            row("Errors:   ", s.errors.to_string(), Style::default().fg(colors.error()), colors),
        ];

        if !self.focus_keys.is_empty() {
            let keys: Vec<String> = self.focus_keys.iter().map(|c| c.to_string()).collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Focus keys:",
                Style::default().fg(colors.fg()),
            )));
            lines.push(Line::from(Span::styled(
                format!(" {}", keys.join(" ")),
                Style::default()
                    .fg(colors.focused_key())
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let block = Block::bordered()
            .title(" Stats ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
