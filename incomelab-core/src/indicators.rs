//! Market indicator derivation.
//!
//! Used when the input feed does not supply a reading directly. Breadth and
//! aggregate momentum come from the instruments' raw 14d/28d prices, so the
//! regime can be classified before any per-instrument analysis runs.

use crate::components::regime::MarketIndicators;
use crate::config::DerivationConfig;
use crate::domain::{DatedValue, InstrumentSnapshot};
use crate::series::{daily_returns, sample_std, trailing_return};

/// Everything the derivation can draw on.
#[derive(Debug, Clone, Copy)]
pub struct MarketInputs<'a> {
    pub instruments: &'a [InstrumentSnapshot],
    pub benchmark: &'a [DatedValue],
    pub headlines: &'a [String],
}

pub fn derive_indicators(inputs: MarketInputs<'_>, config: &DerivationConfig) -> MarketIndicators {
    let ratios = valid_ratios(inputs.instruments);
    let mut benchmark = inputs.benchmark.to_vec();
    benchmark.sort_by_key(|p| p.date);

    MarketIndicators {
        breadth: breadth(&ratios),
        volatility: sample_std(&daily_returns(&benchmark)),
        aggregate_momentum: mean(&ratios),
        benchmark_return: trailing_return(&benchmark, config.benchmark_lookback),
        headline_risk: headline_risk(inputs.headlines, &config.risk_keywords),
    }
}

/// Latest daily benchmark move, signed.
pub fn last_move(benchmark: &[DatedValue]) -> Option<f64> {
    let mut sorted = benchmark.to_vec();
    sorted.sort_by_key(|p| p.date);
    trailing_return(&sorted, 2)
}

/// Share of headlines that mention any risk keyword (case-insensitive).
pub fn headline_risk(headlines: &[String], keywords: &[String]) -> Option<f64> {
    if headlines.is_empty() {
        return None;
    }
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let risky = headlines
        .iter()
        .filter(|h| {
            let lower = h.to_lowercase();
            keywords.iter().any(|k| !k.is_empty() && lower.contains(k.as_str()))
        })
        .count();
    Some(risky as f64 / headlines.len() as f64)
}

fn valid_ratios(instruments: &[InstrumentSnapshot]) -> Vec<f64> {
    instruments
        .iter()
        .filter(|s| {
            s.price_14d.is_finite()
                && s.price_28d.is_finite()
                && s.price_14d > 0.0
                && s.price_28d > 0.0
        })
        .map(|s| s.price_14d / s.price_28d)
        .collect()
}

fn breadth(ratios: &[f64]) -> Option<f64> {
    if ratios.is_empty() {
        return None;
    }
    let advancing = ratios.iter().filter(|&&r| r > 1.0).count();
    Some(advancing as f64 / ratios.len() as f64)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bench(values: &[f64]) -> Vec<DatedValue> {
        let base = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| DatedValue::new(base + chrono::Duration::days(i as i64), v))
            .collect()
    }

    #[test]
    fn breadth_and_momentum_skip_invalid_prices() {
        let instruments = vec![
            InstrumentSnapshot::new("A", 110.0, 100.0),
            InstrumentSnapshot::new("B", 90.0, 100.0),
            InstrumentSnapshot::new("C", 0.0, 100.0),
        ];
        let ind = derive_indicators(
            MarketInputs {
                instruments: &instruments,
                benchmark: &[],
                headlines: &[],
            },
            &DerivationConfig::default(),
        );
        assert_eq!(ind.breadth, Some(0.5));
        assert!((ind.aggregate_momentum.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(ind.volatility, None);
        assert_eq!(ind.benchmark_return, None);
        assert_eq!(ind.headline_risk, None);
    }

    #[test]
    fn benchmark_return_uses_lookback() {
        let cfg = DerivationConfig {
            benchmark_lookback: 3,
            ..DerivationConfig::default()
        };
        let b = bench(&[200.0, 100.0, 95.0, 92.0]);
        let ind = derive_indicators(
            MarketInputs {
                instruments: &[],
                benchmark: &b,
                headlines: &[],
            },
            &cfg,
        );
        assert!((ind.benchmark_return.unwrap() - -0.08).abs() < 1e-12);
        assert!(ind.volatility.is_some());
    }

    #[test]
    fn headline_keywords_are_case_insensitive() {
        let headlines = vec![
            "Fed signals RATES on hold".to_string(),
            "Tech earnings beat".to_string(),
            "Recession fears spark selloff".to_string(),
            "Dividend ETFs gain".to_string(),
        ];
        let risk = headline_risk(&headlines, &DerivationConfig::default().risk_keywords);
        assert_eq!(risk, Some(0.5));
    }

    #[test]
    fn last_move_is_signed() {
        let b = bench(&[100.0, 102.0, 99.96]);
        assert!((last_move(&b).unwrap() - -0.02).abs() < 1e-12);
        assert_eq!(last_move(&bench(&[100.0])), None);
    }
}
