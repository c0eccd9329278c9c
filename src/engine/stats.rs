use std::time::Duration;

use crate::session::keystroke::KeystrokeResult;

/// Score needed per level on the remote side.
pub const LEVEL_SCORE_STEP: i64 = 1000;

/// Running statistics for one session.
///
/// `score`, `streak`, `errors` and `combo` mirror the latest keystroke result.
/// `wpm` and `accuracy` are derived from the session-scoped counters.
#[derive(Clone, Debug, PartialEq)]
pub struct StatsSnapshot {
    pub score: i64,
    pub streak: u32,
    pub max_streak: u32,
    pub combo: f64,
    pub errors: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub total_chars: u64,
    pub correct_chars: u64,
    pub session_chars: u64,
    pub session_correct: u64,
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            score: 0,
            streak: 0,
            max_streak: 0,
            combo: 1.0,
            errors: 0,
            wpm: 0,
            accuracy: 100,
            total_chars: 0,
            correct_chars: 0,
            session_chars: 0,
            session_correct: 0,
        }
    }
}

impl StatsSnapshot {
    /// Fresh snapshot for a newly created remote session whose running score
    /// starts at `total_score`.
    pub fn for_session(total_score: i64) -> Self {
        Self {
            score: total_score,
            ..Self::default()
        }
    }

    /// Merge one keystroke result. Authoritative fields are copied verbatim;
    /// counters and derived metrics are updated locally.
    pub fn apply(&mut self, result: &KeystrokeResult, elapsed: Duration) {
        self.streak = result.streak;
        self.score = result.score;
        self.errors = result.errors;
        self.combo = result.combo_multiplier;

        if result.correct {
            self.correct_chars += 1;
            self.session_correct += 1;
            self.max_streak = self.max_streak.max(result.streak);
        }
        self.total_chars += 1;
        self.session_chars += 1;

        self.wpm = wpm(self.session_correct, elapsed);
        self.accuracy = accuracy(self.session_correct, self.session_chars);
    }
}

/// Words per minute over the session so far, five characters to a word.
pub fn wpm(session_correct: u64, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_secs_f64() / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    let words = session_correct as f64 / 5.0;
    (words / minutes).max(0.0).round() as u32
}

pub fn accuracy(session_correct: u64, session_chars: u64) -> u32 {
    if session_chars == 0 {
        return 100;
    }
    (100.0 * session_correct as f64 / session_chars as f64).round() as u32
}

/// Fraction of the text covered by the cursor, clamped to `[0, 1]`.
pub fn progress(position: usize, text_len: usize) -> f64 {
    if text_len == 0 {
        return 0.0;
    }
    (position as f64 / text_len as f64).clamp(0.0, 1.0)
}

/// Display level: never below what the session started at.
pub fn level(session_level: u32, score: i64) -> u32 {
    let from_score = 1 + (score.max(0) / LEVEL_SCORE_STEP) as u32;
    session_level.max(from_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(correct: bool, streak: u32, errors: u32) -> KeystrokeResult {
        KeystrokeResult {
            correct,
            position: 0,
            streak,
            combo_multiplier: 1.0,
            score: 0,
            errors,
            is_complete: false,
            new_text: None,
            hint: None,
        }
    }

    #[test]
    fn test_wpm_guards_zero_elapsed() {
        assert_eq!(wpm(50, Duration::ZERO), 0);
    }

    #[test]
    fn test_wpm_one_minute() {
        // 50 correct chars = 10 words in one minute
        assert_eq!(wpm(50, Duration::from_secs(60)), 10);
        assert_eq!(wpm(50, Duration::from_secs(30)), 20);
    }

    #[test]
    fn test_accuracy_is_100_with_no_chars() {
        assert_eq!(accuracy(0, 0), 100);
    }

    #[test]
    fn test_accuracy_is_100_when_all_correct() {
        assert_eq!(accuracy(7, 7), 100);
        assert_eq!(accuracy(2, 3), 67);
    }

    #[test]
    fn test_progress_clamped() {
        assert_eq!(progress(0, 0), 0.0);
        assert_eq!(progress(2, 4), 0.5);
        assert_eq!(progress(9, 4), 1.0);
    }

    #[test]
    fn test_level_follows_score_steps() {
        assert_eq!(level(1, 0), 1);
        assert_eq!(level(1, 999), 1);
        assert_eq!(level(1, 2500), 3);
        assert_eq!(level(4, 2500), 4);
    }

    #[test]
    fn test_max_streak_survives_streak_reset() {
        let mut stats = StatsSnapshot::default();
        let elapsed = Duration::from_secs(10);
        stats.apply(&result(true, 1, 0), elapsed);
        stats.apply(&result(true, 2, 0), elapsed);
        stats.apply(&result(false, 0, 1), elapsed);
        stats.apply(&result(true, 1, 1), elapsed);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.max_streak, 2);
        assert_eq!(stats.session_chars, 4);
        assert_eq!(stats.session_correct, 3);
        assert_eq!(stats.accuracy, 75);
    }

    #[test]
    fn test_for_session_seeds_score_only() {
        let stats = StatsSnapshot::for_session(4200);
        assert_eq!(stats.score, 4200);
        assert_eq!(stats.session_chars, 0);
        assert_eq!(stats.accuracy, 100);
    }
}
