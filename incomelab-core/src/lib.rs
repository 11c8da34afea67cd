//! IncomeLab Core — the strategy signal engine.
//!
//! Turns per-instrument prices, dividend history and sentiment plus
//! market-wide indicators into:
//! - a distribution stability score per instrument
//! - a momentum / trade-bias label per instrument
//! - one market regime per cycle (Constructive / Mixed / Risk-Off)
//! - a "do nothing day" advisory flag
//! - one explainable final signal per instrument
//!
//! Every cycle is a pure function of its inputs and an [`EngineConfig`].

pub mod advisory;
pub mod components;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod portfolio;
pub mod series;

pub use config::EngineConfig;
pub use engine::{evaluate_cycle, evaluate_with_regime, CycleInput, CycleReport, InstrumentRow};
pub use error::{ConfigError, SignalError};
