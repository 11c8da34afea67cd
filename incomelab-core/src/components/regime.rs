//! Market regime — one Constructive / Mixed / Risk-Off state per cycle.
//!
//! Each reporting indicator casts a vote against its configured thresholds.
//! The regime is the plurality vote; ties lean cautious
//! (Risk-Off > Mixed > Constructive). Too few indicators is not fatal: the
//! cycle falls back to Mixed and records a warning.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{RegimeConfig, VoteThresholds};
use crate::error::SignalError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RegimeState {
    Constructive,
    Mixed,
    #[serde(rename = "Risk-Off")]
    RiskOff,
}

impl RegimeState {
    /// Tie-break order, most cautious first.
    pub const BY_CAUTION: [Self; 3] = [Self::RiskOff, Self::Mixed, Self::Constructive];

    /// True for the regimes in which a large move should give pause.
    pub const fn is_cautious(self) -> bool {
        matches!(self, Self::Mixed | Self::RiskOff)
    }
}

impl fmt::Display for RegimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Constructive => "Constructive",
            Self::Mixed => "Mixed",
            Self::RiskOff => "Risk-Off",
        };
        f.write_str(s)
    }
}

/// Market-wide indicators understood by the classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Breadth,
    Volatility,
    AggregateMomentum,
    BenchmarkReturn,
    HeadlineRisk,
}

impl IndicatorKind {
    pub const ALL: [Self; 5] = [
        Self::Breadth,
        Self::Volatility,
        Self::AggregateMomentum,
        Self::BenchmarkReturn,
        Self::HeadlineRisk,
    ];

    /// Config / serialization key.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Breadth => "breadth",
            Self::Volatility => "volatility",
            Self::AggregateMomentum => "aggregate_momentum",
            Self::BenchmarkReturn => "benchmark_return",
            Self::HeadlineRisk => "headline_risk",
        }
    }

    pub const fn higher_is_better(self) -> bool {
        !matches!(self, Self::Volatility | Self::HeadlineRisk)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Indicator readings for one cycle. `None` (or a non-finite value) means
/// the indicator did not report.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketIndicators {
    pub breadth: Option<f64>,
    pub volatility: Option<f64>,
    pub aggregate_momentum: Option<f64>,
    pub benchmark_return: Option<f64>,
    pub headline_risk: Option<f64>,
}

impl MarketIndicators {
    pub fn get(&self, kind: IndicatorKind) -> Option<f64> {
        let v = match kind {
            IndicatorKind::Breadth => self.breadth,
            IndicatorKind::Volatility => self.volatility,
            IndicatorKind::AggregateMomentum => self.aggregate_momentum,
            IndicatorKind::BenchmarkReturn => self.benchmark_return,
            IndicatorKind::HeadlineRisk => self.headline_risk,
        };
        v.filter(|x| x.is_finite())
    }

    pub fn set(&mut self, kind: IndicatorKind, value: Option<f64>) {
        let slot = match kind {
            IndicatorKind::Breadth => &mut self.breadth,
            IndicatorKind::Volatility => &mut self.volatility,
            IndicatorKind::AggregateMomentum => &mut self.aggregate_momentum,
            IndicatorKind::BenchmarkReturn => &mut self.benchmark_return,
            IndicatorKind::HeadlineRisk => &mut self.headline_risk,
        };
        *slot = value;
    }

    /// Reporting indicators in canonical order.
    pub fn reported(&self) -> Vec<(IndicatorKind, f64)> {
        IndicatorKind::ALL
            .iter()
            .filter_map(|&k| self.get(k).map(|v| (k, v)))
            .collect()
    }

    /// Fill every unreported indicator from `fallback`; reported ones win.
    pub fn or_else(&self, fallback: &Self) -> Self {
        let mut out = self.clone();
        for kind in IndicatorKind::ALL {
            if out.get(kind).is_none() {
                out.set(kind, fallback.get(kind));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndicatorVote {
    pub indicator: IndicatorKind,
    pub value: f64,
    pub vote: RegimeState,
}

/// The cycle's regime with the votes that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimeAssessment {
    pub state: RegimeState,
    pub votes: Vec<IndicatorVote>,
    pub rationale: String,
    /// Set when the classifier could not run and the state is the fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl RegimeAssessment {
    /// A synthetic assessment with no votes, for callers that already know
    /// the regime (tests, what-if runs).
    pub fn fixed(state: RegimeState) -> Self {
        Self {
            state,
            votes: Vec::new(),
            rationale: format!("{state} (supplied)"),
            warning: None,
        }
    }

    pub fn count(&self, state: RegimeState) -> usize {
        self.votes.iter().filter(|v| v.vote == state).count()
    }
}

/// Vote of a single indicator reading.
pub fn vote(kind: IndicatorKind, value: f64, t: VoteThresholds) -> RegimeState {
    let (constructive, risk_off) = if kind.higher_is_better() {
        (value >= t.constructive, value <= t.risk_off)
    } else {
        (value <= t.constructive, value >= t.risk_off)
    };
    if risk_off {
        RegimeState::RiskOff
    } else if constructive {
        RegimeState::Constructive
    } else {
        RegimeState::Mixed
    }
}

/// Classify the regime, failing when too few indicators report.
pub fn classify_regime(
    indicators: &MarketIndicators,
    config: &RegimeConfig,
) -> Result<RegimeAssessment, SignalError> {
    let votes = cast_votes(indicators, config);
    if votes.len() < config.min_indicators {
        return Err(SignalError::IndicatorUnavailable {
            reported: votes.len(),
            required: config.min_indicators,
        });
    }

    let counts = RegimeState::BY_CAUTION.map(|s| votes.iter().filter(|v| v.vote == s).count());
    let top = counts.iter().copied().max().unwrap_or(0);
    // BY_CAUTION is most-cautious first, so the first max wins ties.
    let idx = counts.iter().position(|&c| c == top).unwrap_or(1);
    let state = RegimeState::BY_CAUTION[idx];

    let detail: Vec<String> = votes
        .iter()
        .map(|v| format!("{} {:.4} → {}", v.indicator, v.value, v.vote))
        .collect();
    let rationale = format!(
        "{state} by {top} of {} votes (risk-off {}, mixed {}, constructive {}): {}",
        votes.len(),
        counts[0],
        counts[1],
        counts[2],
        detail.join(", ")
    );

    Ok(RegimeAssessment {
        state,
        votes,
        rationale,
        warning: None,
    })
}

/// Classify the regime, degrading to Mixed with a warning instead of failing.
pub fn classify_regime_or_default(
    indicators: &MarketIndicators,
    config: &RegimeConfig,
) -> RegimeAssessment {
    match classify_regime(indicators, config) {
        Ok(assessment) => assessment,
        Err(err) => {
            let warning = format!("{err}; regime defaulted to Mixed");
            tracing::warn!(%err, "regime classification unavailable, defaulting to Mixed");
            RegimeAssessment {
                state: RegimeState::Mixed,
                votes: cast_votes(indicators, config),
                rationale: warning.clone(),
                warning: Some(warning),
            }
        }
    }
}

fn cast_votes(indicators: &MarketIndicators, config: &RegimeConfig) -> Vec<IndicatorVote> {
    indicators
        .reported()
        .into_iter()
        .map(|(kind, value)| IndicatorVote {
            indicator: kind,
            value,
            vote: vote(kind, value, config.thresholds(kind)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_reporting(
        breadth: f64,
        volatility: f64,
        momentum: f64,
        ret: f64,
        headlines: f64,
    ) -> MarketIndicators {
        MarketIndicators {
            breadth: Some(breadth),
            volatility: Some(volatility),
            aggregate_momentum: Some(momentum),
            benchmark_return: Some(ret),
            headline_risk: Some(headlines),
        }
    }

    #[test]
    fn unanimous_constructive() {
        let ind = all_reporting(0.8, 0.005, 1.03, 0.02, 0.0);
        let a = classify_regime(&ind, &RegimeConfig::default()).unwrap();
        assert_eq!(a.state, RegimeState::Constructive);
        assert_eq!(a.count(RegimeState::Constructive), 5);
        assert!(a.warning.is_none());
    }

    #[test]
    fn majority_risk_off() {
        // breadth R, vol R, momentum R, return C, headlines M
        let ind = all_reporting(0.2, 0.03, 0.97, 0.01, 0.3);
        let a = classify_regime(&ind, &RegimeConfig::default()).unwrap();
        assert_eq!(a.state, RegimeState::RiskOff);
        assert!(a.rationale.starts_with("Risk-Off by 3 of 5"));
    }

    #[test]
    fn ties_lean_cautious() {
        let cfg = RegimeConfig {
            min_indicators: 2,
            ..RegimeConfig::default()
        };
        // One Constructive, one Risk-Off → Risk-Off
        let ind = MarketIndicators {
            breadth: Some(0.9),
            volatility: Some(0.05),
            ..Default::default()
        };
        assert_eq!(classify_regime(&ind, &cfg).unwrap().state, RegimeState::RiskOff);

        // One Constructive, one Mixed → Mixed
        let ind = MarketIndicators {
            breadth: Some(0.9),
            volatility: Some(0.015),
            ..Default::default()
        };
        assert_eq!(classify_regime(&ind, &cfg).unwrap().state, RegimeState::Mixed);
    }

    #[test]
    fn lower_is_better_indicators_flip() {
        let t = VoteThresholds::new(0.010, 0.020);
        assert_eq!(vote(IndicatorKind::Volatility, 0.005, t), RegimeState::Constructive);
        assert_eq!(vote(IndicatorKind::Volatility, 0.015, t), RegimeState::Mixed);
        assert_eq!(vote(IndicatorKind::Volatility, 0.020, t), RegimeState::RiskOff);
    }

    #[test]
    fn too_few_indicators_fails() {
        let cfg = RegimeConfig {
            min_indicators: 5,
            ..RegimeConfig::default()
        };
        let ind = MarketIndicators {
            breadth: Some(0.7),
            benchmark_return: Some(0.01),
            ..Default::default()
        };
        assert_eq!(
            classify_regime(&ind, &cfg).unwrap_err(),
            SignalError::IndicatorUnavailable {
                reported: 2,
                required: 5
            }
        );
        let fallback = classify_regime_or_default(&ind, &cfg);
        assert_eq!(fallback.state, RegimeState::Mixed);
        assert!(fallback.warning.as_deref().unwrap().contains("2 of 5"));
        assert_eq!(fallback.votes.len(), 2);
    }

    #[test]
    fn non_finite_readings_do_not_report() {
        let ind = MarketIndicators {
            breadth: Some(f64::NAN),
            volatility: Some(0.01),
            ..Default::default()
        };
        assert_eq!(ind.reported().len(), 1);
    }

    #[test]
    fn or_else_prefers_reported_values() {
        let supplied = MarketIndicators {
            breadth: Some(0.3),
            ..Default::default()
        };
        let derived = MarketIndicators {
            breadth: Some(0.9),
            volatility: Some(0.01),
            ..Default::default()
        };
        let merged = supplied.or_else(&derived);
        assert_eq!(merged.breadth, Some(0.3));
        assert_eq!(merged.volatility, Some(0.01));
        assert_eq!(merged.headline_risk, None);
    }

    #[test]
    fn state_serializes_with_hyphen() {
        assert_eq!(
            serde_json::to_string(&RegimeState::RiskOff).unwrap(),
            r#""Risk-Off""#
        );
    }
}
