use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Kind of a focus area reported by the remote analyzer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FocusKind {
    HighErrorKeys,
    SlowTransitions,
    WeakFingers,
    /// A kind this client does not know about yet; kept so it can still be
    /// listed in the insights overlay.
    Other(String),
}

impl From<String> for FocusKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "high_error_keys" => FocusKind::HighErrorKeys,
            "slow_transitions" => FocusKind::SlowTransitions,
            "weak_fingers" => FocusKind::WeakFingers,
            _ => FocusKind::Other(raw),
        }
    }
}

impl From<FocusKind> for String {
    fn from(kind: FocusKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FocusKind {
    pub fn as_str(&self) -> &str {
        match self {
            FocusKind::HighErrorKeys => "high_error_keys",
            FocusKind::SlowTransitions => "slow_transitions",
            FocusKind::WeakFingers => "weak_fingers",
            FocusKind::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FocusKind::HighErrorKeys => "High error keys",
            FocusKind::SlowTransitions => "Slow transitions",
            FocusKind::WeakFingers => "Weak fingers",
            FocusKind::Other(raw) => raw,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unspecified,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusArea {
    #[serde(rename = "type")]
    pub kind: FocusKind,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallMetrics {
    pub total_keystrokes: u64,
    pub accuracy: f64,
    pub error_rate: f64,
    pub avg_speed_ms: f64,
    pub wpm: f64,
    pub max_error_streak: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMetric {
    pub accuracy: f64,
    pub error_rate: f64,
    pub avg_time_ms: f64,
    pub time_consistency: f64,
    pub sample_size: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigramMetric {
    pub avg_transition_time_ms: f64,
    pub slow_transition_threshold: f64,
    pub sample_size: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerMetric {
    pub accuracy: f64,
    pub avg_time_ms: f64,
    pub sample_size: u64,
}

/// Behavioral report produced by the remote analyzer. Read-only on this side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    pub overall: OverallMetrics,
    pub focus_areas: Vec<FocusArea>,
    pub insights: Vec<String>,
    pub key_level: BTreeMap<String, KeyMetric>,
    pub bigram_level: BTreeMap<String, BigramMetric>,
    pub finger_level: BTreeMap<String, FingerMetric>,
    pub hand_level: BTreeMap<String, FingerMetric>,
}

/// Lower-cased characters the learner should attend to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FocusSet {
    chars: BTreeSet<char>,
}

impl FocusSet {
    /// Build the focus set from every `high_error_keys` area of a report.
    pub fn from_report(report: &AnalysisReport) -> Self {
        let mut chars = BTreeSet::new();
        for area in &report.focus_areas {
            match area.kind {
                FocusKind::HighErrorKeys => {
                    for item in &area.items {
                        let mut it = item.chars().flat_map(char::to_lowercase);
                        match (it.next(), it.next()) {
                            (Some(ch), None) => {
                                chars.insert(ch);
                            }
                            _ => tracing::debug!(item = %item, "skipping multi-char focus key"),
                        }
                    }
                }
                FocusKind::SlowTransitions | FocusKind::WeakFingers => {}
                FocusKind::Other(ref raw) => {
                    tracing::debug!(kind = %raw, "unrecognized focus area kind");
                }
            }
        }
        Self { chars }
    }

    pub fn contains(&self, ch: char) -> bool {
        ch.to_lowercase().any(|c| self.chars.contains(&c))
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.chars.iter().copied()
    }
}

impl FromIterator<char> for FocusSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self {
            chars: iter.into_iter().flat_map(char::to_lowercase).collect(),
        }
    }
}
