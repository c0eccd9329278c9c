use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::ui::components::help_panel::HelpPanel;
use crate::ui::components::insights_panel::InsightsPanel;
use crate::ui::components::progress_bar::ProgressBar;
use crate::ui::components::stats_sidebar::{StatsSidebar, compact_summary};
use crate::ui::components::typing_area::TypingArea;
use crate::ui::layout::{ScreenAreas, pack_hint_lines, popup_area};
use crate::ui::theme::Theme;
use crate::view::{PhaseLabel, Presenter, ViewModel};

const FOOTER_HINTS: &[&str] = &[
    "[^R] reset",
    "[^N] new text",
    "[^S] save",
    "[^L] mode",
    "[^O] logout",
    "[F1] help",
    "[F2] insights",
    "[F3] theme",
    "[^C] quit",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    Insights,
}

/// Terminal presenter. Keeps the latest view so the event loop can redraw at
/// any time; the actual drawing happens in [`ScreenPresenter::draw`].
pub struct ScreenPresenter {
    theme: Theme,
    view: Option<ViewModel>,
    overlay: Overlay,
    celebrate_until: Option<Instant>,
    celebration: Duration,
}

impl ScreenPresenter {
    pub fn new(theme: Theme, celebration: Duration) -> Self {
        Self {
            theme,
            view: None,
            overlay: Overlay::None,
            celebrate_until: None,
            celebration,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    /// Show `overlay`, or close it if it is already showing.
    pub fn toggle_overlay(&mut self, overlay: Overlay) {
        self.overlay = if self.overlay == overlay {
            Overlay::None
        } else {
            overlay
        };
    }

    pub fn close_overlay(&mut self) {
        self.overlay = Overlay::None;
    }

    pub fn is_celebrating(&self, now: Instant) -> bool {
        self.celebrate_until.is_some_and(|until| now < until)
    }

    pub fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let colors = &self.theme.colors;

        frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

        let Some(view) = &self.view else {
            let waiting = Paragraph::new(Line::from(Span::styled(
                " Connecting...",
                Style::default().fg(colors.text_pending()),
            )));
            frame.render_widget(waiting, area);
            return;
        };

        let hints = pack_hint_lines(FOOTER_HINTS, area.width as usize);
        let footer_height = (hints.len() + usize::from(view.notice.is_some())) as u16;
        let areas = ScreenAreas::new(area, footer_height);

        let mut header_spans = vec![Span::styled(
            if areas.is_wide() {
                format!(" tapcoach  Level {} ", view.stats.level)
            } else {
                compact_summary(&view.stats)
            },
            Style::default()
                .fg(colors.header_fg())
                .add_modifier(Modifier::BOLD),
        )];
        header_spans.push(Span::styled(
            if view.learn_mode { " [learn] " } else { " [free] " },
            Style::default().fg(colors.accent()),
        ));
        if view.degraded {
            header_spans.push(Span::styled(
                " offline ",
                Style::default().fg(colors.warning()),
            ));
        }
        if view.phase == PhaseLabel::Resetting {
            header_spans.push(Span::styled(
                " resetting ",
                Style::default().fg(colors.text_pending()),
            ));
        }
        frame.render_widget(
            Paragraph::new(Line::from(header_spans))
                .style(Style::default().bg(colors.header_bg())),
            areas.header,
        );

        let celebrating = view.phase == PhaseLabel::Completing || self.is_celebrating(Instant::now());
        frame.render_widget(
            TypingArea::new(&view.cells, &self.theme).celebrating(celebrating),
            areas.typing,
        );

        if let Some(progress_area) = areas.progress {
            frame.render_widget(
                ProgressBar::new(view.position, view.cells.len(), view.progress, &self.theme),
                progress_area,
            );
        }

        if let Some(sidebar_area) = areas.sidebar {
            frame.render_widget(
                StatsSidebar::new(&view.stats, &view.focus_keys, &self.theme),
                sidebar_area,
            );
        }

        let mut footer_lines: Vec<Line> = Vec::new();
        if let Some(notice) = &view.notice {
            footer_lines.push(Line::from(Span::styled(
                format!(" {notice}"),
                Style::default().fg(colors.warning()),
            )));
        }
        for hint in hints {
            footer_lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(colors.text_pending()),
            )));
        }
        frame.render_widget(Paragraph::new(footer_lines), areas.footer);

        match self.overlay {
            Overlay::None => {}
            Overlay::Help => {
                frame.render_widget(HelpPanel::new(&self.theme), popup_area(area, 50, 60));
            }
            Overlay::Insights => {
                frame.render_widget(
                    InsightsPanel::new(&view.focus_areas, &view.insights, &self.theme),
                    popup_area(area, 70, 70),
                );
            }
        }
    }
}

impl Presenter for ScreenPresenter {
    fn render(&mut self, view: &ViewModel) {
        self.view = Some(view.clone());
    }

    fn celebrate(&mut self) {
        self.celebrate_until = Some(Instant::now() + self.celebration);
    }
}
