use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dated observation: a close price or a dividend amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

impl DatedValue {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Per-instrument inputs for one evaluation cycle.
///
/// Captured once per cycle and never mutated by the engine. Both series are
/// expected in ascending date order; `sorted_prices` / `sorted_dividends`
/// return date-ordered copies for callers that cannot guarantee that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentSnapshot {
    pub ticker: String,
    /// Price 14 trading days ago (or the 14-day average, as supplied).
    pub price_14d: f64,
    /// Price 28 trading days ago (or the 28-day average, as supplied).
    pub price_28d: f64,
    /// Trailing monthly income amount in dollars.
    pub monthly_income: f64,
    #[serde(default)]
    pub dividends: Vec<DatedValue>,
    #[serde(default)]
    pub prices: Vec<DatedValue>,
}

impl InstrumentSnapshot {
    pub fn new(ticker: impl Into<String>, price_14d: f64, price_28d: f64) -> Self {
        Self {
            ticker: ticker.into(),
            price_14d,
            price_28d,
            monthly_income: 0.0,
            dividends: Vec::new(),
            prices: Vec::new(),
        }
    }

    pub fn with_monthly_income(mut self, monthly_income: f64) -> Self {
        self.monthly_income = monthly_income;
        self
    }

    pub fn with_prices(mut self, prices: Vec<DatedValue>) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_dividends(mut self, dividends: Vec<DatedValue>) -> Self {
        self.dividends = dividends;
        self
    }

    /// Price history in ascending date order.
    pub fn sorted_prices(&self) -> Vec<DatedValue> {
        sorted_by_date(&self.prices)
    }

    /// Dividend history in ascending date order.
    pub fn sorted_dividends(&self) -> Vec<DatedValue> {
        sorted_by_date(&self.dividends)
    }

    /// Most recent price in the history, if any.
    pub fn last_price(&self) -> Option<f64> {
        self.prices.iter().max_by_key(|p| p.date).map(|p| p.value)
    }
}

fn sorted_by_date(series: &[DatedValue]) -> Vec<DatedValue> {
    let mut out = series.to_vec();
    // Stable sort keeps supplied order for same-day duplicates.
    out.sort_by_key(|p| p.date);
    out
}
