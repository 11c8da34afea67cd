//! Error kinds for the signal engine.
//!
//! [`SignalError`] covers recoverable per-instrument and regime-level
//! failures: the affected value is shown as N/A with the error text as its
//! rationale. [`ConfigError`] is fatal and stops a cycle before any output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recoverable evaluation failures.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalError {
    #[error("insufficient data: {series} has {found} point(s), need at least {required}")]
    InsufficientData {
        series: String,
        found: usize,
        required: usize,
    },
    #[error("invalid price: {field} = {value} (must be positive and finite)")]
    InvalidPrice { field: String, value: f64 },
    #[error("indicator unavailable: {reported} of {required} required market indicators reported")]
    IndicatorUnavailable { reported: usize, required: usize },
}

impl SignalError {
    pub fn insufficient(series: &str, found: usize, required: usize) -> Self {
        Self::InsufficientData {
            series: series.to_string(),
            found,
            required,
        }
    }

    pub fn invalid_price(field: &str, value: f64) -> Self {
        Self::InvalidPrice {
            field: field.to_string(),
            value,
        }
    }
}

/// Malformed configuration. Aborts the cycle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: String, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: String, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: String, value: f64 },
    #[error("{what} must be strictly descending, got {values:?}")]
    NotDescending { what: String, values: Vec<f64> },
    #[error("{field}: constructive threshold {constructive} and risk-off threshold {risk_off} are in the wrong order")]
    ThresholdOrder {
        field: String,
        constructive: f64,
        risk_off: f64,
    },
    #[error("combiner weights must sum to 1.0 (±{tolerance}), got {sum}")]
    WeightSum { sum: f64, tolerance: f64 },
    #[error("{field} out of range: {reason}")]
    OutOfRange { field: String, reason: String },
    #[error("parse config: {0}")]
    Parse(String),
    #[error("read config: {0}")]
    Io(String),
}
