//! Engine configuration — every threshold, band, weight and cut point.
//!
//! Loaded from TOML; every section and field has a default so a partial
//! file only overrides what it names. `validate()` must pass before a
//! cycle runs: a malformed config means the decision logic itself cannot
//! be trusted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::regime::IndicatorKind;
use crate::error::ConfigError;

/// Tolerance on the combiner weight sum.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Complete configuration for one evaluation cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub stability: StabilityConfig,
    pub momentum: MomentumBands,
    pub regime: RegimeConfig,
    pub do_nothing: DoNothingConfig,
    pub combiner: CombinerConfig,
    pub payout_risk: PayoutRiskConfig,
    pub reinvest: ReinvestConfig,
    pub derivation: DerivationConfig,
}

/// Distribution stability thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StabilityConfig {
    /// Price decline (fraction) beyond which a position counts as damaged.
    pub price_damage_threshold: f64,
    /// Income change within ±tolerance counts as flat.
    pub income_flat_tolerance: f64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            price_damage_threshold: 0.10,
            income_flat_tolerance: 0.01,
        }
    }
}

/// Lower bounds of the momentum bands on r = price_14d / price_28d.
///
/// r ≥ strong_up → Strong-Up, r ≥ up → Up, r ≥ neutral → Neutral,
/// r ≥ down → Down, anything lower → Strong-Down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MomentumBands {
    pub strong_up: f64,
    pub up: f64,
    pub neutral: f64,
    pub down: f64,
}

impl Default for MomentumBands {
    fn default() -> Self {
        Self {
            strong_up: 1.05,
            up: 1.01,
            neutral: 0.99,
            down: 0.95,
        }
    }
}

/// Vote thresholds for one market indicator.
///
/// For higher-is-better indicators a reading ≥ `constructive` votes
/// Constructive and ≤ `risk_off` votes Risk-Off. Lower-is-better indicators
/// flip both comparisons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VoteThresholds {
    pub constructive: f64,
    pub risk_off: f64,
}

impl VoteThresholds {
    pub const fn new(constructive: f64, risk_off: f64) -> Self {
        Self {
            constructive,
            risk_off,
        }
    }
}

/// Regime classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegimeConfig {
    /// Minimum number of reporting indicators needed to classify.
    pub min_indicators: usize,
    /// Share of instruments trending up (0..1).
    pub breadth: VoteThresholds,
    /// Daily return standard deviation of the benchmark.
    pub volatility: VoteThresholds,
    /// Mean 14d/28d price ratio across instruments.
    pub aggregate_momentum: VoteThresholds,
    /// Benchmark return over the derivation lookback.
    pub benchmark_return: VoteThresholds,
    /// Share of headlines containing a risk keyword (0..1).
    pub headline_risk: VoteThresholds,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            min_indicators: 3,
            breadth: VoteThresholds::new(0.60, 0.40),
            volatility: VoteThresholds::new(0.010, 0.020),
            aggregate_momentum: VoteThresholds::new(1.01, 0.99),
            benchmark_return: VoteThresholds::new(0.0, -0.08),
            headline_risk: VoteThresholds::new(0.20, 0.40),
        }
    }
}

impl RegimeConfig {
    pub fn thresholds(&self, kind: IndicatorKind) -> VoteThresholds {
        match kind {
            IndicatorKind::Breadth => self.breadth,
            IndicatorKind::Volatility => self.volatility,
            IndicatorKind::AggregateMomentum => self.aggregate_momentum,
            IndicatorKind::BenchmarkReturn => self.benchmark_return,
            IndicatorKind::HeadlineRisk => self.headline_risk,
        }
    }
}

/// Do-nothing day trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DoNothingConfig {
    /// Absolute market move (fraction, 0.015 = 1.5%) that must be exceeded.
    pub move_threshold: f64,
}

impl Default for DoNothingConfig {
    fn default() -> Self {
        Self {
            move_threshold: 0.015,
        }
    }
}

/// Signal combiner weights, regime adjustments and cut points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CombinerConfig {
    pub stability_weight: f64,
    pub momentum_weight: f64,
    pub sentiment_weight: f64,
    /// Subtracted from the base score in Risk-Off.
    pub risk_off_penalty: f64,
    /// Added to the base score in Constructive.
    pub constructive_bonus: f64,
    pub cut_points: CutPoints,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            stability_weight: 0.40,
            momentum_weight: 0.35,
            sentiment_weight: 0.25,
            risk_off_penalty: 0.50,
            constructive_bonus: 0.25,
            cut_points: CutPoints::default(),
        }
    }
}

/// Inclusive lower bounds of each final signal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CutPoints {
    pub accumulate: f64,
    pub hold: f64,
    pub trim: f64,
}

impl Default for CutPoints {
    fn default() -> Self {
        Self {
            accumulate: 1.0,
            hold: 0.25,
            trim: -0.5,
        }
    }
}

/// Drawdown-from-high advisory thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PayoutRiskConfig {
    pub min_points: usize,
    pub pullback_drawdown: f64,
    pub severe_drawdown: f64,
}

impl Default for PayoutRiskConfig {
    fn default() -> Self {
        Self {
            min_points: 15,
            pullback_drawdown: 0.08,
            severe_drawdown: 0.15,
        }
    }
}

/// Weekly reinvestment pick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReinvestConfig {
    /// Number of trailing price points used for the return leg.
    pub lookback: usize,
}

impl Default for ReinvestConfig {
    fn default() -> Self {
        Self { lookback: 10 }
    }
}

/// How market indicators are derived when the input does not supply them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DerivationConfig {
    /// Benchmark points spanned by the benchmark-return indicator.
    pub benchmark_lookback: usize,
    /// Case-insensitive keywords that mark a headline as risky.
    pub risk_keywords: Vec<String>,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            benchmark_lookback: 20,
            risk_keywords: ["volatility", "recession", "selloff", "inflation", "rates"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Does not validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Render the effective config as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Deterministic BLAKE3 fingerprint of the full configuration.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }

    /// Check every option. The first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_stability()?;
        self.validate_momentum()?;
        self.validate_regime()?;
        positive("do_nothing.move_threshold", self.do_nothing.move_threshold)?;
        self.validate_combiner()?;
        self.validate_payout_risk()?;
        if self.reinvest.lookback < 2 {
            return Err(out_of_range("reinvest.lookback", "must be at least 2"));
        }
        if self.derivation.benchmark_lookback < 2 {
            return Err(out_of_range(
                "derivation.benchmark_lookback",
                "must be at least 2",
            ));
        }
        Ok(())
    }

    fn validate_stability(&self) -> Result<(), ConfigError> {
        positive(
            "stability.price_damage_threshold",
            self.stability.price_damage_threshold,
        )?;
        non_negative(
            "stability.income_flat_tolerance",
            self.stability.income_flat_tolerance,
        )?;
        if self.stability.price_damage_threshold >= 1.0 {
            return Err(out_of_range(
                "stability.price_damage_threshold",
                "must be below 1.0 (a 100% decline)",
            ));
        }
        Ok(())
    }

    fn validate_momentum(&self) -> Result<(), ConfigError> {
        let m = &self.momentum;
        let bands = [m.strong_up, m.up, m.neutral, m.down];
        for (name, v) in ["strong_up", "up", "neutral", "down"].iter().zip(bands) {
            positive(&format!("momentum.{name}"), v)?;
        }
        descending("momentum bands", &bands)
    }

    fn validate_regime(&self) -> Result<(), ConfigError> {
        let r = &self.regime;
        if r.min_indicators == 0 || r.min_indicators > IndicatorKind::ALL.len() {
            return Err(out_of_range(
                "regime.min_indicators",
                &format!(
                    "must be between 1 and {}, got {}",
                    IndicatorKind::ALL.len(),
                    r.min_indicators
                ),
            ));
        }
        for kind in IndicatorKind::ALL {
            let t = r.thresholds(kind);
            let field = format!("regime.{}", kind.key());
            finite(&format!("{field}.constructive"), t.constructive)?;
            finite(&format!("{field}.risk_off"), t.risk_off)?;
            let ordered = if kind.higher_is_better() {
                t.constructive > t.risk_off
            } else {
                t.constructive < t.risk_off
            };
            if !ordered {
                return Err(ConfigError::ThresholdOrder {
                    field,
                    constructive: t.constructive,
                    risk_off: t.risk_off,
                });
            }
        }
        Ok(())
    }

    fn validate_combiner(&self) -> Result<(), ConfigError> {
        let c = &self.combiner;
        non_negative("combiner.stability_weight", c.stability_weight)?;
        non_negative("combiner.momentum_weight", c.momentum_weight)?;
        non_negative("combiner.sentiment_weight", c.sentiment_weight)?;
        let sum = c.stability_weight + c.momentum_weight + c.sentiment_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        non_negative("combiner.risk_off_penalty", c.risk_off_penalty)?;
        non_negative("combiner.constructive_bonus", c.constructive_bonus)?;
        let cuts = [c.cut_points.accumulate, c.cut_points.hold, c.cut_points.trim];
        for (name, v) in ["accumulate", "hold", "trim"].iter().zip(cuts) {
            finite(&format!("combiner.cut_points.{name}"), v)?;
        }
        descending("combiner cut points", &cuts)
    }

    fn validate_payout_risk(&self) -> Result<(), ConfigError> {
        let p = &self.payout_risk;
        positive("payout_risk.pullback_drawdown", p.pullback_drawdown)?;
        positive("payout_risk.severe_drawdown", p.severe_drawdown)?;
        if p.severe_drawdown <= p.pullback_drawdown {
            return Err(ConfigError::NotDescending {
                what: "payout_risk drawdowns (severe, pullback)".into(),
                values: vec![p.severe_drawdown, p.pullback_drawdown],
            });
        }
        if p.min_points < 2 {
            return Err(out_of_range("payout_risk.min_points", "must be at least 2"));
        }
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field: field.to_string(),
            value,
        })
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            field: field.to_string(),
            value,
        })
    }
}

fn descending(what: &str, values: &[f64]) -> Result<(), ConfigError> {
    if values.windows(2).all(|w| w[0] > w[1]) {
        Ok(())
    } else {
        Err(ConfigError::NotDescending {
            what: what.to_string(),
            values: values.to_vec(),
        })
    }
}

fn out_of_range(field: &str, reason: &str) -> ConfigError {
    ConfigError::OutOfRange {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
