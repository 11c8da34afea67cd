//! Momentum / trade bias from the 14-day vs 28-day price ratio.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::MomentumBands;
use crate::domain::InstrumentSnapshot;
use crate::error::SignalError;

/// Bias label. Declared weakest to strongest so `Ord` follows rank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MomentumLabel {
    #[serde(rename = "Strong-Down")]
    StrongDown,
    Down,
    Neutral,
    Up,
    #[serde(rename = "Strong-Up")]
    StrongUp,
}

impl MomentumLabel {
    /// Numeric band used by the combiner (-2..=2).
    pub const fn numeric(self) -> f64 {
        match self {
            Self::StrongDown => -2.0,
            Self::Down => -1.0,
            Self::Neutral => 0.0,
            Self::Up => 1.0,
            Self::StrongUp => 2.0,
        }
    }
}

impl fmt::Display for MomentumLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StrongDown => "Strong-Down",
            Self::Down => "Down",
            Self::Neutral => "Neutral",
            Self::Up => "Up",
            Self::StrongUp => "Strong-Up",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MomentumResult {
    pub ticker: String,
    /// price_14d / price_28d
    pub ratio: f64,
    pub label: MomentumLabel,
}

/// Map a ratio onto the configured bands. Total over all finite ratios.
pub fn classify_ratio(ratio: f64, bands: &MomentumBands) -> MomentumLabel {
    if ratio >= bands.strong_up {
        MomentumLabel::StrongUp
    } else if ratio >= bands.up {
        MomentumLabel::Up
    } else if ratio >= bands.neutral {
        MomentumLabel::Neutral
    } else if ratio >= bands.down {
        MomentumLabel::Down
    } else {
        MomentumLabel::StrongDown
    }
}

pub fn classify_momentum(
    snapshot: &InstrumentSnapshot,
    bands: &MomentumBands,
) -> Result<MomentumResult, SignalError> {
    for (field, value) in [
        ("price_14d", snapshot.price_14d),
        ("price_28d", snapshot.price_28d),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(SignalError::invalid_price(field, value));
        }
    }
    let ratio = snapshot.price_14d / snapshot.price_28d;
    Ok(MomentumResult {
        ticker: snapshot.ticker.clone(),
        ratio,
        label: classify_ratio(ratio, bands),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(p14: f64, p28: f64) -> Result<MomentumResult, SignalError> {
        classify_momentum(
            &InstrumentSnapshot::new("XDTE", p14, p28),
            &MomentumBands::default(),
        )
    }

    #[test]
    fn band_edges_are_inclusive_lower_bounds() {
        let b = MomentumBands::default();
        assert_eq!(classify_ratio(1.05, &b), MomentumLabel::StrongUp);
        assert_eq!(classify_ratio(1.0499, &b), MomentumLabel::Up);
        assert_eq!(classify_ratio(1.01, &b), MomentumLabel::Up);
        assert_eq!(classify_ratio(1.0, &b), MomentumLabel::Neutral);
        assert_eq!(classify_ratio(0.99, &b), MomentumLabel::Neutral);
        assert_eq!(classify_ratio(0.95, &b), MomentumLabel::Down);
        assert_eq!(classify_ratio(0.9499, &b), MomentumLabel::StrongDown);
    }

    #[test]
    fn ratio_of_105_over_100_is_strong_up() {
        let r = classify(105.0, 100.0).unwrap();
        assert_eq!(r.label, MomentumLabel::StrongUp);
        assert_eq!(r.label.numeric(), 2.0);
    }

    #[test]
    fn non_positive_prices_are_invalid() {
        assert_eq!(
            classify(0.0, 100.0).unwrap_err(),
            SignalError::invalid_price("price_14d", 0.0)
        );
        assert!(matches!(
            classify(10.0, -5.0),
            Err(SignalError::InvalidPrice { .. })
        ));
        assert!(classify(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn labels_serialize_with_hyphens() {
        let json = serde_json::to_string(&MomentumLabel::StrongDown).unwrap();
        assert_eq!(json, r#""Strong-Down""#);
        assert_eq!(MomentumLabel::StrongUp.to_string(), "Strong-Up");
    }

    #[test]
    fn ordering_follows_rank() {
        assert!(MomentumLabel::StrongDown < MomentumLabel::Down);
        assert!(MomentumLabel::Up < MomentumLabel::StrongUp);
    }
}
