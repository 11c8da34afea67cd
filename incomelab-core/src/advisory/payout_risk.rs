//! Payout risk — drawdown of the latest price from the window high.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::pct;
use crate::config::PayoutRiskConfig;
use crate::domain::InstrumentSnapshot;
use crate::error::SignalError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PayoutRiskLevel {
    Clear,
    Pullback,
    Severe,
}

impl fmt::Display for PayoutRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clear => "Clear",
            Self::Pullback => "Pullback",
            Self::Severe => "Severe",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutRisk {
    pub level: PayoutRiskLevel,
    /// (last - high) / high; zero or negative.
    pub drawdown: f64,
    pub high: f64,
    pub last: f64,
    pub rationale: String,
}

pub fn assess_payout_risk(
    snapshot: &InstrumentSnapshot,
    config: &PayoutRiskConfig,
) -> Result<PayoutRisk, SignalError> {
    let prices = snapshot.sorted_prices();
    if prices.len() < config.min_points {
        return Err(SignalError::insufficient(
            "price history",
            prices.len(),
            config.min_points,
        ));
    }
    if let Some(bad) = prices.iter().find(|p| !(p.value.is_finite() && p.value > 0.0)) {
        return Err(SignalError::invalid_price(
            &format!("price on {}", bad.date),
            bad.value,
        ));
    }

    let high = prices.iter().map(|p| p.value).fold(f64::MIN, f64::max);
    let last = prices[prices.len() - 1].value;
    let drawdown = (last - high) / high;

    let level = if drawdown < -config.severe_drawdown {
        PayoutRiskLevel::Severe
    } else if drawdown < -config.pullback_drawdown {
        PayoutRiskLevel::Pullback
    } else {
        PayoutRiskLevel::Clear
    };
    let rationale = match level {
        PayoutRiskLevel::Clear => format!("{} from the {high:.2} high", pct(drawdown)),
        _ => format!(
            "{level}: {} down {} from the {high:.2} high",
            snapshot.ticker,
            pct(-drawdown).trim_start_matches('+')
        ),
    };

    Ok(PayoutRisk {
        level,
        drawdown,
        high,
        last,
        rationale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DatedValue;
    use chrono::NaiveDate;

    fn snap(values: &[f64]) -> InstrumentSnapshot {
        let base = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        InstrumentSnapshot::new("QDTE", 1.0, 1.0).with_prices(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| DatedValue::new(base + chrono::Duration::days(i as i64), v))
                .collect(),
        )
    }

    fn cfg() -> PayoutRiskConfig {
        PayoutRiskConfig {
            min_points: 3,
            ..PayoutRiskConfig::default()
        }
    }

    #[test]
    fn severe_drawdown() {
        let r = assess_payout_risk(&snap(&[100.0, 95.0, 80.0]), &cfg()).unwrap();
        assert_eq!(r.level, PayoutRiskLevel::Severe);
        assert!((r.drawdown + 0.20).abs() < 1e-12);
        assert!(r.rationale.contains("20.00%"), "{}", r.rationale);
    }

    #[test]
    fn pullback_drawdown() {
        let r = assess_payout_risk(&snap(&[100.0, 98.0, 90.0]), &cfg()).unwrap();
        assert_eq!(r.level, PayoutRiskLevel::Pullback);
    }

    #[test]
    fn near_high_is_clear() {
        let r = assess_payout_risk(&snap(&[100.0, 98.0, 97.0]), &cfg()).unwrap();
        assert_eq!(r.level, PayoutRiskLevel::Clear);
    }

    #[test]
    fn short_history_is_not_assessed() {
        let err = assess_payout_risk(&snap(&[100.0; 14]), &PayoutRiskConfig::default()).unwrap_err();
        assert_eq!(err, SignalError::insufficient("price history", 14, 15));
    }
}
