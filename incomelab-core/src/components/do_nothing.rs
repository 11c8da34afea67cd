//! Do-nothing day — an advisory against reacting to regime-driven noise.
//!
//! Raised only when the regime is Mixed or Risk-Off *and* the market move
//! strictly exceeds the configured threshold. Never alters any signal.

use serde::{Deserialize, Serialize};

use super::pct;
use super::regime::RegimeState;
use crate::config::DoNothingConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoNothingFlag {
    pub active: bool,
    /// Absolute move used in the decision, if one was available.
    pub move_magnitude: Option<f64>,
    pub rationale: String,
}

/// Decide the flag from the cycle regime and today's aggregate move
/// (signed fraction; only its magnitude matters).
pub fn evaluate_do_nothing(
    regime: RegimeState,
    market_move: Option<f64>,
    config: &DoNothingConfig,
) -> DoNothingFlag {
    let threshold = config.move_threshold;
    let Some(magnitude) = market_move.filter(|m| m.is_finite()).map(f64::abs) else {
        return DoNothingFlag {
            active: false,
            move_magnitude: None,
            rationale: format!("{regime} regime; market move unavailable, no caution raised"),
        };
    };

    let active = regime.is_cautious() && magnitude > threshold;
    let rationale = if active {
        format!(
            "Do Nothing Day: {regime} regime with a {} move (threshold {})",
            pct(magnitude),
            pct(threshold)
        )
    } else if regime.is_cautious() {
        format!(
            "{regime} regime but the {} move does not exceed the {} threshold",
            pct(magnitude),
            pct(threshold)
        )
    } else {
        format!(
            "{regime} regime; a {} move needs no caution",
            pct(magnitude)
        )
    };

    DoNothingFlag {
        active,
        move_magnitude: Some(magnitude),
        rationale,
    }
}
