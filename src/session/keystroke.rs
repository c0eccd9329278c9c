use std::time::{Duration, Instant};

use chrono::Utc;

use crate::engine::stats::StatsSnapshot;
use crate::exchange::wire::{KeystrokeReply, KeystrokeRequest};

/// The remote side cuts the combo by this much on every wrong key, down to
/// [`MIN_COMBO`].
const WRONG_KEY_COMBO_PENALTY: f64 = 0.2;
const MIN_COMBO: f64 = 1.0;

/// One accepted input character, ready to be submitted.
#[derive(Clone, Debug)]
pub struct KeystrokeEvent {
    pub ch: char,
    pub time_since_last: Option<Duration>,
    /// Seconds since the Unix epoch, as the remote side expects.
    pub timestamp: f64,
}

impl KeystrokeEvent {
    pub fn to_request(&self, session_id: &str) -> KeystrokeRequest {
        KeystrokeRequest {
            session_id: session_id.to_string(),
            key: self.ch.to_string(),
            timestamp: self.timestamp,
        }
    }
}

/// Inter-keystroke timing. The last timestamp is recorded for every accepted
/// key, including ones whose request later fails.
#[derive(Clone, Debug, Default)]
pub struct KeystrokeTimer {
    last: Option<Instant>,
}

impl KeystrokeTimer {
    pub fn stamp(&mut self, ch: char, now: Instant) -> KeystrokeEvent {
        let time_since_last = self.last.map(|last| now.saturating_duration_since(last));
        self.last = Some(now);
        KeystrokeEvent {
            ch,
            time_since_last,
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
        }
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }
}

/// Authoritative outcome of one keystroke, either from the remote side or
/// synthesized locally when the request failed.
#[derive(Clone, Debug, PartialEq)]
pub struct KeystrokeResult {
    pub correct: bool,
    pub position: usize,
    pub streak: u32,
    pub combo_multiplier: f64,
    pub score: i64,
    pub errors: u32,
    pub is_complete: bool,
    pub new_text: Option<String>,
    /// Inline hint shown after a blocked key in learn mode.
    pub hint: Option<String>,
}

impl KeystrokeResult {
    /// Degraded-mode result for a failed submission: the cursor and score stay
    /// put, the streak breaks and one error is counted.
    pub fn fallback(position: usize, stats: &StatsSnapshot) -> Self {
        Self {
            correct: false,
            position,
            streak: 0,
            combo_multiplier: stats.combo,
            score: stats.score,
            errors: stats.errors + 1,
            is_complete: false,
            new_text: None,
            hint: None,
        }
    }

    /// Resolve a raw reply. A blocked reply carries no counters, so it is
    /// treated like a fallback: the remote side did count the error and cut
    /// the combo, but left the cursor where it was.
    pub fn from_reply(reply: KeystrokeReply, position: usize, stats: &StatsSnapshot) -> Self {
        if reply.blocked {
            let hint = reply.message.or_else(|| {
                reply
                    .expected_char
                    .as_ref()
                    .map(|expected| format!("Type '{expected}'"))
            });
            return Self {
                hint,
                combo_multiplier: (stats.combo - WRONG_KEY_COMBO_PENALTY).max(MIN_COMBO),
                ..Self::fallback(position, stats)
            };
        }

        Self {
            correct: reply.correct,
            position: reply.position.unwrap_or(position),
            streak: reply.streak.unwrap_or(0),
            combo_multiplier: reply.combo_multiplier.unwrap_or(stats.combo),
            score: reply.score.unwrap_or(stats.score),
            errors: reply.errors.unwrap_or(stats.errors),
            is_complete: reply.is_complete,
            new_text: reply.new_text.filter(|text| !text.is_empty()),
            hint: None,
        }
    }
}
