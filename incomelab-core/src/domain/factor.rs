//! Explainability records.
//!
//! Every derived result carries a list of [`Factor`]s naming the inputs that
//! produced it, so reports and tests can inspect a decision without parsing
//! rationale text.

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// One contributing input to a derived result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Factor {
    pub name: String,
    /// Raw input value (already mapped to numeric where needed).
    pub value: f64,
    /// Weight applied to `value`. 1.0 for additive adjustments.
    pub weight: f64,
    /// Contribution to the final score (`value * weight`).
    pub contribution: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Factor {
    pub fn weighted(name: &str, value: f64, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            weight,
            contribution: value * weight,
            note: None,
        }
    }

    /// A factor that is reported for traceability but adds nothing to a score.
    pub fn observed(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            weight: 0.0,
            contribution: 0.0,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A per-instrument result that is either present or explicitly N/A.
///
/// `NotAvailable` keeps the error so the row can show why the value is
/// missing instead of silently dropping it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Computed<T> {
    Value(T),
    NotAvailable(SignalError),
}

impl<T> Computed<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::NotAvailable(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SignalError> {
        match self {
            Self::Value(_) => None,
            Self::NotAvailable(e) => Some(e),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl<T> From<Result<T, SignalError>> for Computed<T> {
    fn from(result: Result<T, SignalError>) -> Self {
        match result {
            Ok(v) => Self::Value(v),
            Err(e) => Self::NotAvailable(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_factor_contribution() {
        let f = Factor::weighted("stability", 0.9, 0.4);
        assert!((f.contribution - 0.36).abs() < 1e-12);
        assert!(f.note.is_none());
    }

    #[test]
    fn computed_from_result() {
        let ok: Computed<u8> = Ok(3).into();
        assert_eq!(ok.value(), Some(&3));
        let err: Computed<u8> = Err(SignalError::InvalidPrice {
            field: "price_14d".into(),
            value: -1.0,
        })
        .into();
        assert!(!err.is_available());
        assert!(err.error().unwrap().to_string().contains("price_14d"));
    }
}
