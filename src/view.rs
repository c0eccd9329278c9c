//! Presentation port. The trainer never draws anything itself; it builds a
//! [`ViewModel`] and hands it to whatever [`Presenter`] it was given.

use crate::engine::analysis::FocusArea;
use crate::engine::render::CharCell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseLabel {
    Idle,
    Active,
    Completing,
    Resetting,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsView {
    pub wpm: u32,
    pub accuracy: u32,
    pub score: i64,
    pub streak: u32,
    pub max_streak: u32,
    pub combo: f64,
    pub errors: u32,
    pub level: u32,
    pub session_chars: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewModel {
    pub cells: Vec<CharCell>,
    pub position: usize,
    pub progress: f64,
    pub stats: StatsView,
    pub phase: PhaseLabel,
    pub focus_keys: Vec<char>,
    pub focus_areas: Vec<FocusArea>,
    pub insights: Vec<String>,
    pub notice: Option<String>,
    /// Running on locally fabricated state.
    pub degraded: bool,
    pub learn_mode: bool,
    pub signed_in: bool,
}

pub trait Presenter {
    fn render(&mut self, view: &ViewModel);

    /// Start the text-completed effect. Purely cosmetic.
    fn celebrate(&mut self) {}
}
