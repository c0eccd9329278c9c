use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::render::{CellState, CharCell};
use crate::ui::theme::{Theme, ThemeColors};

pub struct TypingArea<'a> {
    cells: &'a [CharCell],
    celebrating: bool,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(cells: &'a [CharCell], theme: &'a Theme) -> Self {
        Self {
            cells,
            celebrating: false,
            theme,
        }
    }

    pub fn celebrating(mut self, celebrating: bool) -> Self {
        self.celebrating = celebrating;
        self
    }
}

fn cell_style(cell: &CharCell, colors: &ThemeColors) -> Style {
    match cell.state {
        CellState::Typed if cell.is_space => Style::default().fg(colors.text_space()),
        CellState::Typed => Style::default().fg(colors.text_typed()),
        CellState::Current { focus: true } => Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.focused_key())
            .add_modifier(Modifier::BOLD),
        CellState::Current { focus: false } => Style::default()
            .fg(colors.text_cursor_fg())
            .bg(colors.text_cursor_bg()),
        CellState::Untouched if cell.is_space => Style::default().fg(colors.text_space()),
        CellState::Untouched => Style::default().fg(colors.text_pending()),
    }
}

fn cell_spans<'a>(cells: &[CharCell], colors: &ThemeColors) -> Vec<Span<'a>> {
    cells
        .iter()
        .map(|cell| Span::styled(cell.glyph.to_string(), cell_style(cell, colors)))
        .collect()
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.celebrating {
            colors.success()
        } else {
            colors.border()
        };
        let mut block = Block::bordered()
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        if self.celebrating {
            block = block.title(Span::styled(
                " Text complete! ",
                Style::default()
                    .fg(colors.success())
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let line = Line::from(cell_spans(self.cells, colors));
        let paragraph = Paragraph::new(line)
            .block(block)
            .wrap(Wrap { trim: false });

        paragraph.render(area, buf);
    }
}
