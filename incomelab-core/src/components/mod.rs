//! The five decision components of an evaluation cycle.
//!
//! Leaf-first: stability and momentum are per-instrument and independent;
//! regime is market-wide and feeds both the do-nothing evaluator and the
//! combiner. All of them are pure functions of their inputs and a read-only
//! config section.

pub mod combiner;
pub mod do_nothing;
pub mod momentum;
pub mod regime;
pub mod stability;

pub use combiner::{combine, CombinerPolicy, FinalSignal, SignalLabel};
pub use do_nothing::{evaluate_do_nothing, DoNothingFlag};
pub use momentum::{classify_momentum, classify_ratio, MomentumLabel, MomentumResult};
pub use regime::{
    classify_regime, classify_regime_or_default, IndicatorKind, IndicatorVote, MarketIndicators,
    RegimeAssessment, RegimeState,
};
pub use stability::{analyze_stability, StabilityClass, StabilityResult};

/// Format a fraction as a signed percentage, e.g. `-0.04` → `-4.00%`.
pub fn pct(fraction: f64) -> String {
    format!("{:+.2}%", fraction * 100.0)
}
