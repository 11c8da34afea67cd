//! Portfolio valuation — dividend income and position value per holding.
//!
//! Weekly payers: monthly income is `weekly × 52 / 12`, annual is
//! `weekly × 52`. Every dollar figure stays signed; callers render the sign.

use serde::{Deserialize, Serialize};

pub const WEEKS_PER_YEAR: f64 = 52.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub ticker: String,
    pub shares: f64,
    /// Dividend paid per share each week.
    pub weekly_dividend_per_share: f64,
    /// Latest price per share.
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionValuation {
    pub ticker: String,
    pub shares: f64,
    pub price: f64,
    pub weekly_income: f64,
    pub monthly_income: f64,
    pub annual_income: f64,
    pub position_value: f64,
}

impl PositionValuation {
    pub fn from_holding(h: &Holding) -> Self {
        let weekly = h.shares * h.weekly_dividend_per_share;
        Self {
            ticker: h.ticker.clone(),
            shares: h.shares,
            price: h.price,
            weekly_income: weekly,
            monthly_income: weekly * WEEKS_PER_YEAR / MONTHS_PER_YEAR,
            annual_income: weekly * WEEKS_PER_YEAR,
            position_value: h.shares * h.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioValuation {
    pub positions: Vec<PositionValuation>,
    pub total_weekly_income: f64,
    pub total_monthly_income: f64,
    pub total_annual_income: f64,
    pub total_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_invested: Option<f64>,
    /// `total_value - total_invested`; negative is a loss.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrealized_gain: Option<f64>,
}

pub fn value_portfolio(holdings: &[Holding], total_invested: Option<f64>) -> PortfolioValuation {
    let positions: Vec<PositionValuation> =
        holdings.iter().map(PositionValuation::from_holding).collect();
    let sum = |f: fn(&PositionValuation) -> f64| positions.iter().map(f).sum::<f64>();
    let total_value = sum(|p| p.position_value);

    PortfolioValuation {
        total_weekly_income: sum(|p| p.weekly_income),
        total_monthly_income: sum(|p| p.monthly_income),
        total_annual_income: sum(|p| p.annual_income),
        total_value,
        total_invested,
        unrealized_gain: total_invested.map(|inv| total_value - inv),
        positions,
    }
}
