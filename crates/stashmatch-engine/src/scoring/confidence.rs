use serde::{Deserialize, Serialize};
use stashmatch_core::MatchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Eligible for auto-apply.
    High,
    /// Needs human review.
    Medium,
    /// Unlikely to be the same entity.
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Score cutoffs for the confidence tiers. `high` doubles as the auto-match
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    pub high: u8,
    pub medium: u8,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 95,
            medium: 70,
        }
    }
}

impl ConfidenceThresholds {
    pub fn new(high: u8, medium: u8) -> Self {
        Self {
            high,
            medium: medium.min(high),
        }
    }

    pub fn classify(&self, score: u8) -> ConfidenceLevel {
        if score >= self.high {
            ConfidenceLevel::High
        } else if score >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn is_auto_match_eligible(&self, score: u8) -> bool {
        self.classify(score) == ConfidenceLevel::High
    }
}

impl From<&MatchConfig> for ConfidenceThresholds {
    fn from(config: &MatchConfig) -> Self {
        Self::new(config.auto_match_threshold, config.review_threshold)
    }
}
