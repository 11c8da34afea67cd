//! Distribution stability — has income held up while price declined?
//!
//! Compares the percentage price change over the price-history window with
//! the percentage income change across that window. Income is measured from
//! the dividend in force at the window start (the last one paid on or before
//! it) to the dividend in force at the window end. When both resolve to the
//! same payment the full dividend series is used instead.
//!
//! - **Stable**: income flat or up, price decline within the damage threshold
//! - **Damaged**: income down and price down beyond the threshold
//! - **Eroding**: everything in between
//!
//! Scores live in disjoint bands per class so a score alone ranks
//! instruments: Stable [0.75, 1], Eroding [0.35, 0.75], Damaged [0, 0.35].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::pct;
use crate::config::StabilityConfig;
use crate::domain::{DatedValue, Factor, InstrumentSnapshot};
use crate::error::SignalError;

/// Minimum points per series.
pub const MIN_POINTS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StabilityClass {
    Stable,
    Eroding,
    Damaged,
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stable => "Stable",
            Self::Eroding => "Eroding",
            Self::Damaged => "Damaged",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StabilityResult {
    pub ticker: String,
    pub class: StabilityClass,
    /// 1.0 = fully stable, 0.0 = fully damaged.
    pub score: f64,
    /// Price change over the window as a fraction.
    pub price_change: f64,
    /// Income change over the window as a fraction.
    pub income_change: f64,
    pub rationale: String,
    pub factors: Vec<Factor>,
}

/// Score an instrument's distribution stability.
pub fn analyze_stability(
    snapshot: &InstrumentSnapshot,
    config: &StabilityConfig,
) -> Result<StabilityResult, SignalError> {
    let prices = snapshot.sorted_prices();
    if prices.len() < MIN_POINTS {
        return Err(SignalError::insufficient(
            "price history",
            prices.len(),
            MIN_POINTS,
        ));
    }
    let dividends = snapshot.sorted_dividends();
    if dividends.len() < MIN_POINTS {
        return Err(SignalError::insufficient(
            "dividend history",
            dividends.len(),
            MIN_POINTS,
        ));
    }

    let first_price = prices[0];
    let last_price = prices[prices.len() - 1];
    let (income_start, income_end) = income_span(&dividends, first_price.date, last_price.date);

    let price_change = change(first_price, last_price, "price history")?;
    let income_change = change(income_start, income_end, "dividend history")?;

    let threshold = config.price_damage_threshold;
    let income_held = income_change >= -config.income_flat_tolerance;
    let price_decline = (-price_change).max(0.0);
    let income_drop = (-income_change).max(0.0);

    let (class, score) = if income_held && price_change >= -threshold {
        let score = 1.0 - 0.25 * (price_decline / threshold).min(1.0);
        (StabilityClass::Stable, score)
    } else if !income_held && price_change < -threshold {
        let severity = ((income_drop + price_decline) / (4.0 * threshold)).min(1.0);
        (StabilityClass::Damaged, 0.35 * (1.0 - severity))
    } else {
        let severity = ((income_drop + price_decline) / (2.0 * threshold)).min(1.0);
        (StabilityClass::Eroding, 0.75 - 0.40 * severity)
    };

    let rationale = format!(
        "{class}: price {} and income {} from {} to {} (damage threshold {})",
        pct(price_change),
        pct(income_change),
        first_price.date,
        last_price.date,
        pct(-threshold),
    );

    Ok(StabilityResult {
        ticker: snapshot.ticker.clone(),
        class,
        score,
        price_change,
        income_change,
        rationale,
        factors: vec![
            Factor::observed("price_change_pct", price_change * 100.0),
            Factor::observed("income_change_pct", income_change * 100.0),
        ],
    })
}

/// Dividend endpoints for the income comparison. `dividends` is sorted and
/// holds at least two points.
fn income_span(
    dividends: &[DatedValue],
    start: NaiveDate,
    end: NaiveDate,
) -> (DatedValue, DatedValue) {
    let in_force = |date: NaiveDate| dividends.iter().rposition(|d| d.date <= date);
    let from = in_force(start).unwrap_or(0);
    let to = in_force(end).unwrap_or(dividends.len() - 1);
    if from < to {
        (dividends[from], dividends[to])
    } else {
        (dividends[0], dividends[dividends.len() - 1])
    }
}

fn change(first: DatedValue, last: DatedValue, series: &str) -> Result<f64, SignalError> {
    if !(first.value.is_finite() && first.value > 0.0) {
        return Err(SignalError::invalid_price(&format!("{series} start"), first.value));
    }
    if !(last.value.is_finite() && last.value >= 0.0) {
        return Err(SignalError::invalid_price(&format!("{series} end"), last.value));
    }
    Ok(last.value / first.value - 1.0)
}
