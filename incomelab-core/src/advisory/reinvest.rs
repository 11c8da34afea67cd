//! Weekly reinvestment pick — best trailing return net of volatility.
//!
//! score = return over the last `lookback` points − std of daily returns.

use serde::{Deserialize, Serialize};

use crate::config::ReinvestConfig;
use crate::domain::InstrumentSnapshot;
use crate::series::{daily_returns, sample_std, trailing_return};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReinvestCandidate {
    pub ticker: String,
    pub trailing_return: f64,
    pub volatility: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReinvestPick {
    pub ticker: String,
    pub score: f64,
    /// Every qualifying instrument, in input order.
    pub candidates: Vec<ReinvestCandidate>,
    pub rationale: String,
}

/// Score one instrument; `None` when its history is shorter than the lookback.
pub fn score_candidate(
    snapshot: &InstrumentSnapshot,
    config: &ReinvestConfig,
) -> Option<ReinvestCandidate> {
    let prices = snapshot.sorted_prices();
    let trailing = trailing_return(&prices, config.lookback)?;
    let volatility = sample_std(&daily_returns(&prices))?;
    Some(ReinvestCandidate {
        ticker: snapshot.ticker.clone(),
        trailing_return: trailing,
        volatility,
        score: trailing - volatility,
    })
}

/// Highest-scoring instrument; ties go to the earliest in input order.
pub fn pick_reinvestment(
    instruments: &[InstrumentSnapshot],
    config: &ReinvestConfig,
) -> Option<ReinvestPick> {
    let candidates: Vec<ReinvestCandidate> = instruments
        .iter()
        .filter_map(|s| score_candidate(s, config))
        .collect();

    let mut best: Option<&ReinvestCandidate> = None;
    for c in &candidates {
        if best.map_or(true, |b| c.score > b.score) {
            best = Some(c);
        }
    }
    let best = best?.clone();

    Some(ReinvestPick {
        rationale: format!(
            "{} leads {} candidate(s): {:.4} return over {} points less {:.4} volatility",
            best.ticker,
            candidates.len(),
            best.trailing_return,
            config.lookback,
            best.volatility
        ),
        ticker: best.ticker,
        score: best.score,
        candidates,
    })
}
