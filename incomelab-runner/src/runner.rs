//! Cycle runner — wires input, config, engine and snapshot store.
//!
//! Two entry points:
//! - `run_cycle_from_files()`: loads input + optional TOML config. Used by CLI.
//! - `run_cycle()`: takes pre-loaded input and config.

use std::io;
use std::path::Path;

use incomelab_core::{evaluate_cycle, ConfigError, CycleInput, CycleReport, EngineConfig};
use thiserror::Error;

use crate::input::{load_input, InputError};
use crate::snapshot::{SnapshotEntry, SnapshotStore};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("snapshot store error: {0}")]
    Store(#[from] io::Error),
}

/// Result of one cycle run.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub report: CycleReport,
    /// `Some(true)` if a snapshot was appended, `Some(false)` if an identical
    /// cycle was already recorded, `None` if no store was given.
    pub stored: Option<bool>,
}

/// Load a config file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    match path {
        Some(p) => EngineConfig::from_file(p),
        None => Ok(EngineConfig::default()),
    }
}

pub fn run_cycle(
    input: &CycleInput,
    config: &EngineConfig,
    store: Option<&SnapshotStore>,
) -> Result<CycleOutcome, RunError> {
    let report = evaluate_cycle(input, config)?;
    let stored = match store {
        Some(store) => {
            let written = store.append(&SnapshotEntry::from_report(&report))?;
            if !written {
                tracing::info!(input_hash = %report.input_hash, "cycle already recorded, snapshot skipped");
            }
            Some(written)
        }
        None => None,
    };
    Ok(CycleOutcome { report, stored })
}

pub fn run_cycle_from_files(
    input_path: &Path,
    config_path: Option<&Path>,
    store: Option<&SnapshotStore>,
) -> Result<CycleOutcome, RunError> {
    let config = load_config(config_path)?;
    let input = load_input(input_path)?;
    tracing::debug!(
        path = %input_path.display(),
        instruments = input.instruments.len(),
        "cycle input loaded"
    );
    run_cycle(&input, &config, store)
}
