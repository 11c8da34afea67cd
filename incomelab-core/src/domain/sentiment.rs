use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Externally supplied news sentiment for one instrument.
///
/// `score` is expected in [-1, 1]; the combiner clamps anything outside that
/// range and notes it in the factor breakdown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentimentScore {
    pub score: f64,
    #[serde(default)]
    pub label: String,
}

impl SentimentScore {
    pub fn new(score: f64, label: impl Into<String>) -> Self {
        Self {
            score,
            label: label.into(),
        }
    }

    /// Score clamped to [-1, 1]. Non-finite scores read as neutral.
    pub fn clamped(&self) -> f64 {
        if self.score.is_finite() {
            self.score.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_in_range(&self) -> bool {
        self.score.is_finite() && (-1.0..=1.0).contains(&self.score)
    }
}

/// Sentiment keyed by ticker. Ordered map so serialization is stable.
pub type SentimentBook = BTreeMap<String, SentimentScore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(SentimentScore::new(1.7, "euphoric").clamped(), 1.0);
        assert_eq!(SentimentScore::new(-3.0, "panic").clamped(), -1.0);
        assert_eq!(SentimentScore::new(f64::NAN, "").clamped(), 0.0);
        assert!(!SentimentScore::new(1.7, "").is_in_range());
        assert!(SentimentScore::new(-0.2, "soft").is_in_range());
    }
}
