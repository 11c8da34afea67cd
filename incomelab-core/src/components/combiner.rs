//! Signal combiner — stability, momentum, sentiment and regime → one signal.
//!
//! Table-driven and deterministic:
//!
//! 1. `base = w_stab·stability + w_mom·momentum(-2..=2) + w_sent·sentiment`
//! 2. Risk-Off subtracts the penalty, Constructive adds the bonus
//! 3. The adjusted score is cut into Accumulate / Hold / Trim / Avoid
//!
//! Missing stability or momentum yields "Insufficient Data" and no score.
//! Every signal carries exactly four factors, in the order above plus regime.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::momentum::MomentumResult;
use super::regime::RegimeState;
use super::stability::StabilityResult;
use crate::config::{CombinerConfig, CutPoints};
use crate::domain::{Computed, Factor, SentimentScore};

pub const FACTOR_STABILITY: &str = "stability";
pub const FACTOR_MOMENTUM: &str = "momentum";
pub const FACTOR_SENTIMENT: &str = "sentiment";
pub const FACTOR_REGIME: &str = "regime";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SignalLabel {
    Accumulate,
    Hold,
    Trim,
    Avoid,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Accumulate => "Accumulate",
            Self::Hold => "Hold",
            Self::Trim => "Trim",
            Self::Avoid => "Avoid",
            Self::InsufficientData => "Insufficient Data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinalSignal {
    pub ticker: String,
    pub label: SignalLabel,
    /// Score before the regime adjustment.
    pub base_score: Option<f64>,
    /// Score after the regime adjustment; `None` for Insufficient Data.
    pub score: Option<f64>,
    /// stability, momentum, sentiment, regime, in that order.
    pub factors: Vec<Factor>,
    pub rationale: String,
}

impl FinalSignal {
    pub fn factor(&self, name: &str) -> Option<&Factor> {
        self.factors.iter().find(|f| f.name == name)
    }
}

/// Map an adjusted score onto the signal vocabulary.
pub fn label_for_score(score: f64, cuts: &CutPoints) -> SignalLabel {
    if score >= cuts.accumulate {
        SignalLabel::Accumulate
    } else if score >= cuts.hold {
        SignalLabel::Hold
    } else if score >= cuts.trim {
        SignalLabel::Trim
    } else {
        SignalLabel::Avoid
    }
}

/// Regime adjustment added to the base score.
pub fn regime_adjustment(regime: RegimeState, config: &CombinerConfig) -> f64 {
    match regime {
        RegimeState::RiskOff => -config.risk_off_penalty,
        RegimeState::Mixed => 0.0,
        RegimeState::Constructive => config.constructive_bonus,
    }
}

/// Combine one instrument's inputs into its final signal.
pub fn combine(
    ticker: &str,
    stability: &Computed<StabilityResult>,
    momentum: &Computed<MomentumResult>,
    sentiment: Option<&SentimentScore>,
    regime: RegimeState,
    config: &CombinerConfig,
) -> FinalSignal {
    let stability_factor = match stability {
        Computed::Value(s) => Factor::weighted(FACTOR_STABILITY, s.score, config.stability_weight)
            .with_note(s.class.to_string()),
        Computed::NotAvailable(e) => Factor::observed(FACTOR_STABILITY, 0.0)
            .with_note(format!("N/A: {e}")),
    };
    let momentum_factor = match momentum {
        Computed::Value(m) => Factor::weighted(
            FACTOR_MOMENTUM,
            m.label.numeric(),
            config.momentum_weight,
        )
        .with_note(format!("{} (ratio {:.4})", m.label, m.ratio)),
        Computed::NotAvailable(e) => Factor::observed(FACTOR_MOMENTUM, 0.0)
            .with_note(format!("N/A: {e}")),
    };
    let sentiment_factor = sentiment_factor(sentiment, config.sentiment_weight);
    let adjustment = regime_adjustment(regime, config);
    let regime_factor = Factor::weighted(FACTOR_REGIME, adjustment, 1.0).with_note(match regime {
        RegimeState::RiskOff => format!("{regime} penalty"),
        RegimeState::Mixed => format!("{regime}: no adjustment"),
        RegimeState::Constructive => format!("{regime} bonus"),
    });

    let missing: Vec<String> = [
        (FACTOR_STABILITY, stability.error()),
        (FACTOR_MOMENTUM, momentum.error()),
    ]
    .into_iter()
    .filter_map(|(name, err)| err.map(|e| format!("{name} N/A ({e})")))
    .collect();

    let factors = vec![
        stability_factor,
        momentum_factor,
        sentiment_factor,
        regime_factor,
    ];

    if !missing.is_empty() {
        return FinalSignal {
            ticker: ticker.to_string(),
            label: SignalLabel::InsufficientData,
            base_score: None,
            score: None,
            rationale: format!("{}: {}", SignalLabel::InsufficientData, missing.join("; ")),
            factors,
        };
    }

    let base: f64 = factors[..3].iter().map(|f| f.contribution).sum();
    let score = base + adjustment;
    let label = label_for_score(score, &config.cut_points);
    let rationale = format!(
        "{label}: score {score:.3} = base {base:.3} (stability {:.3} + momentum {:.3} + sentiment {:.3}) {} regime {:+.3}",
        factors[0].contribution,
        factors[1].contribution,
        factors[2].contribution,
        regime,
        adjustment,
    );

    FinalSignal {
        ticker: ticker.to_string(),
        label,
        base_score: Some(base),
        score: Some(score),
        factors,
        rationale,
    }
}

fn sentiment_factor(sentiment: Option<&SentimentScore>, weight: f64) -> Factor {
    let Some(s) = sentiment else {
        return Factor::weighted(FACTOR_SENTIMENT, 0.0, weight)
            .with_note("no sentiment supplied; treated as neutral 0.0");
    };
    let value = s.clamped();
    let mut note = if s.label.is_empty() {
        String::from("unlabelled")
    } else {
        s.label.clone()
    };
    if !s.is_in_range() {
        note.push_str(&format!("; clamped from {} to {value}", s.score));
    }
    Factor::weighted(FACTOR_SENTIMENT, value, weight).with_note(note)
}

/// Printable view of the combination policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinerPolicy {
    pub rows: Vec<PolicyRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyRow {
    pub step: String,
    pub rule: String,
    pub value: String,
}

impl CombinerPolicy {
    pub fn from_config(config: &CombinerConfig) -> Self {
        let cuts = &config.cut_points;
        let row = |step: &str, rule: &str, value: String| PolicyRow {
            step: step.to_string(),
            rule: rule.to_string(),
            value,
        };
        Self {
            rows: vec![
                row("1 base", "stability score × weight", format!("{:.2}", config.stability_weight)),
                row("1 base", "momentum band (-2..+2) × weight", format!("{:.2}", config.momentum_weight)),
                row("1 base", "sentiment (-1..+1) × weight", format!("{:.2}", config.sentiment_weight)),
                row("2 regime", "Risk-Off", format!("{:+.2}", -config.risk_off_penalty)),
                row("2 regime", "Mixed", format!("{:+.2}", 0.0)),
                row("2 regime", "Constructive", format!("{:+.2}", config.constructive_bonus)),
                row("3 signal", "Accumulate", format!("score >= {:.2}", cuts.accumulate)),
                row("3 signal", "Hold", format!("{:.2} <= score < {:.2}", cuts.hold, cuts.accumulate)),
                row("3 signal", "Trim", format!("{:.2} <= score < {:.2}", cuts.trim, cuts.hold)),
                row("3 signal", "Avoid", format!("score < {:.2}", cuts.trim)),
                row("-", "Insufficient Data", "stability or momentum N/A".to_string()),
            ],
        }
    }
}

impl fmt::Display for CombinerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w_step = self.rows.iter().map(|r| r.step.len()).max().unwrap_or(0);
        let w_rule = self.rows.iter().map(|r| r.rule.chars().count()).max().unwrap_or(0);
        for r in &self.rows {
            writeln!(f, "{:<w_step$}  {:<w_rule$}  {}", r.step, r.rule, r.value)?;
        }
        Ok(())
    }
}
