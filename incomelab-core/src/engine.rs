//! Evaluation cycle — one stateless pass from inputs to a report.
//!
//! Order within a cycle:
//! 1. validate config (fatal on error, before anything else runs)
//! 2. classify the regime once; degrade to Mixed if indicators are missing
//! 3. fan out per-instrument stability / momentum / payout risk (rayon)
//! 4. do-nothing flag and per-instrument combination against that regime
//!
//! Nothing here holds state between cycles; the same input and config give
//! a byte-identical report.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::advisory::{assess_payout_risk, pick_reinvestment, PayoutRisk, ReinvestPick};
use crate::components::{
    analyze_stability, classify_momentum, classify_regime_or_default, combine,
    evaluate_do_nothing, DoNothingFlag, FinalSignal, MarketIndicators, MomentumResult,
    RegimeAssessment, StabilityResult,
};
use crate::config::EngineConfig;
use crate::domain::{Computed, DatedValue, InstrumentSnapshot, SentimentBook, SentimentScore};
use crate::error::ConfigError;
use crate::indicators::{derive_indicators, last_move, MarketInputs};
use crate::portfolio::{value_portfolio, Holding, PortfolioValuation};

/// Current schema version of [`CycleReport`].
pub const SCHEMA_VERSION: u32 = 1;

/// Everything one cycle consumes. Immutable for the duration of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CycleInput {
    pub as_of: Option<NaiveDate>,
    /// Instruments in user-entered order; rows come out in the same order.
    pub instruments: Vec<InstrumentSnapshot>,
    pub sentiment: SentimentBook,
    /// Supplied readings; any left empty are derived.
    pub indicators: MarketIndicators,
    /// Benchmark closes (e.g. SPY) for volatility, return and move.
    pub benchmark: Vec<DatedValue>,
    pub headlines: Vec<String>,
    /// Today's aggregate market move as a signed fraction.
    pub market_move: Option<f64>,
    pub holdings: Vec<Holding>,
    pub total_invested: Option<f64>,
}

impl CycleInput {
    /// BLAKE3 hash of the canonical JSON form of the input.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

/// One line of the combined signal table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstrumentRow {
    pub ticker: String,
    pub price_14d: f64,
    pub price_28d: f64,
    pub monthly_income: f64,
    pub stability: Computed<StabilityResult>,
    pub momentum: Computed<MomentumResult>,
    pub sentiment: Option<SentimentScore>,
    pub signal: FinalSignal,
    pub payout_risk: Computed<PayoutRisk>,
}

/// Complete output of one cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleReport {
    pub schema_version: u32,
    pub as_of: Option<NaiveDate>,
    pub input_hash: String,
    pub config_fingerprint: String,
    /// Indicators the regime was classified from (supplied + derived).
    pub indicators: MarketIndicators,
    pub regime: RegimeAssessment,
    pub do_nothing: DoNothingFlag,
    pub rows: Vec<InstrumentRow>,
    pub reinvest: Option<ReinvestPick>,
    pub portfolio: Option<PortfolioValuation>,
    /// Every degraded value in the cycle, one line each.
    pub warnings: Vec<String>,
}

impl CycleReport {
    pub fn signals(&self) -> impl Iterator<Item = &FinalSignal> {
        self.rows.iter().map(|r| &r.signal)
    }

    pub fn row(&self, ticker: &str) -> Option<&InstrumentRow> {
        self.rows.iter().find(|r| r.ticker == ticker)
    }
}

/// Effective indicators: supplied readings first, derived ones fill gaps.
pub fn effective_indicators(input: &CycleInput, config: &EngineConfig) -> MarketIndicators {
    let derived = derive_indicators(
        MarketInputs {
            instruments: &input.instruments,
            benchmark: &input.benchmark,
            headlines: &input.headlines,
        },
        &config.derivation,
    );
    input.indicators.or_else(&derived)
}

/// Run a full cycle.
pub fn evaluate_cycle(input: &CycleInput, config: &EngineConfig) -> Result<CycleReport, ConfigError> {
    config.validate()?;
    let indicators = effective_indicators(input, config);
    let regime = classify_regime_or_default(&indicators, &config.regime);
    Ok(run_with_regime(input, config, indicators, regime))
}

/// Run a cycle against a regime supplied by the caller (what-if runs).
pub fn evaluate_with_regime(
    input: &CycleInput,
    config: &EngineConfig,
    regime: RegimeAssessment,
) -> Result<CycleReport, ConfigError> {
    config.validate()?;
    let indicators = effective_indicators(input, config);
    Ok(run_with_regime(input, config, indicators, regime))
}

struct Analysis {
    stability: Computed<StabilityResult>,
    momentum: Computed<MomentumResult>,
    payout_risk: Computed<PayoutRisk>,
}

fn analyze(snapshot: &InstrumentSnapshot, config: &EngineConfig) -> Analysis {
    Analysis {
        stability: analyze_stability(snapshot, &config.stability).into(),
        momentum: classify_momentum(snapshot, &config.momentum).into(),
        payout_risk: assess_payout_risk(snapshot, &config.payout_risk).into(),
    }
}

fn run_with_regime(
    input: &CycleInput,
    config: &EngineConfig,
    indicators: MarketIndicators,
    regime: RegimeAssessment,
) -> CycleReport {
    let mut warnings: Vec<String> = regime.warning.iter().cloned().collect();

    // Indexed collect keeps input order.
    let analyses: Vec<Analysis> = input
        .instruments
        .par_iter()
        .map(|snapshot| analyze(snapshot, config))
        .collect();

    let market_move = input.market_move.or_else(|| last_move(&input.benchmark));
    let do_nothing = evaluate_do_nothing(regime.state, market_move, &config.do_nothing);

    let rows: Vec<InstrumentRow> = input
        .instruments
        .iter()
        .zip(analyses)
        .map(|(snapshot, a)| {
            let sentiment = input.sentiment.get(&snapshot.ticker);
            for (what, err) in [
                ("stability", a.stability.error()),
                ("momentum", a.momentum.error()),
            ] {
                if let Some(err) = err {
                    tracing::debug!(ticker = %snapshot.ticker, what, %err, "input not available");
                    warnings.push(format!("{}: {what} N/A ({err})", snapshot.ticker));
                }
            }
            let signal = combine(
                &snapshot.ticker,
                &a.stability,
                &a.momentum,
                sentiment,
                regime.state,
                &config.combiner,
            );
            InstrumentRow {
                ticker: snapshot.ticker.clone(),
                price_14d: snapshot.price_14d,
                price_28d: snapshot.price_28d,
                monthly_income: snapshot.monthly_income,
                stability: a.stability,
                momentum: a.momentum,
                sentiment: sentiment.cloned(),
                signal,
                payout_risk: a.payout_risk,
            }
        })
        .collect();

    let portfolio = (!input.holdings.is_empty())
        .then(|| value_portfolio(&input.holdings, input.total_invested));

    tracing::info!(
        instruments = rows.len(),
        regime = %regime.state,
        do_nothing = do_nothing.active,
        warnings = warnings.len(),
        "cycle evaluated"
    );

    CycleReport {
        schema_version: SCHEMA_VERSION,
        as_of: input.as_of,
        input_hash: input.fingerprint(),
        config_fingerprint: config.fingerprint(),
        indicators,
        regime,
        do_nothing,
        reinvest: pick_reinvestment(&input.instruments, &config.reinvest),
        portfolio,
        rows,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{RegimeState, SignalLabel};

    fn dated(day: u32, value: f64) -> DatedValue {
        DatedValue::new(NaiveDate::from_ymd_opt(2024, 6, day).unwrap(), value)
    }

    fn healthy(ticker: &str) -> InstrumentSnapshot {
        InstrumentSnapshot::new(ticker, 105.0, 100.0)
            .with_monthly_income(143.0)
            .with_prices(vec![dated(3, 100.0), dated(28, 96.0)])
            .with_dividends(vec![dated(7, 0.5), dated(21, 0.5)])
    }

    #[test]
    fn invalid_config_aborts_before_output() {
        let mut cfg = EngineConfig::default();
        cfg.combiner.cut_points.trim = 5.0;
        let input = CycleInput {
            instruments: vec![healthy("QDTE")],
            ..Default::default()
        };
        assert!(evaluate_cycle(&input, &cfg).is_err());
    }

    #[test]
    fn regime_fallback_is_recorded_as_warning() {
        let input = CycleInput {
            instruments: vec![healthy("QDTE")],
            ..Default::default()
        };
        // Only breadth and aggregate momentum can be derived → 2 < 3
        let report = evaluate_cycle(&input, &EngineConfig::default()).unwrap();
        assert_eq!(report.regime.state, RegimeState::Mixed);
        assert!(report.warnings[0].contains("defaulted to Mixed"));
    }

    #[test]
    fn supplied_regime_drives_combination() {
        let input = CycleInput {
            instruments: vec![healthy("QDTE")],
            ..Default::default()
        };
        let report = evaluate_with_regime(
            &input,
            &EngineConfig::default(),
            RegimeAssessment::fixed(RegimeState::Constructive),
        )
        .unwrap();
        assert_eq!(report.rows[0].signal.label, SignalLabel::Accumulate);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn portfolio_only_when_holdings_supplied() {
        let input = CycleInput {
            holdings: vec![Holding {
                ticker: "QDTE".into(),
                shares: 10.0,
                weekly_dividend_per_share: 0.3,
                price: 40.0,
            }],
            ..Default::default()
        };
        let report = evaluate_cycle(&input, &EngineConfig::default()).unwrap();
        assert!(report.portfolio.is_some());
        assert!(report.rows.is_empty());
        let empty = evaluate_cycle(&CycleInput::default(), &EngineConfig::default()).unwrap();
        assert!(empty.portfolio.is_none());
    }

    #[test]
    fn market_move_falls_back_to_benchmark() {
        let input = CycleInput {
            benchmark: vec![dated(27, 100.0), dated(28, 97.0)],
            ..Default::default()
        };
        let report = evaluate_cycle(&input, &EngineConfig::default()).unwrap();
        assert!((report.do_nothing.move_magnitude.unwrap() - 0.03).abs() < 1e-12);
    }
}
