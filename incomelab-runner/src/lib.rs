//! IncomeLab Runner — cycle orchestration around `incomelab-core`.
//!
//! This crate provides:
//! - Cycle input loading from JSON files
//! - Single-cycle runner with optional snapshot persistence
//! - JSONL snapshot history for later charting
//! - JSON, CSV and Markdown exports of the combined signal table
//! - Deterministic synthetic demo input

pub mod export;
pub mod input;
pub mod runner;
pub mod snapshot;
pub mod synthetic;

pub use export::{
    export_json, export_signal_table_csv, import_json, load_artifacts, render_markdown,
    render_policy_markdown, save_artifacts, signed_dollars,
};
pub use input::{load_input, parse_input, save_input, InputError};
pub use runner::{load_config, run_cycle, run_cycle_from_files, CycleOutcome, RunError};
pub use snapshot::{regime_counts, signal_history, SignalSummary, SnapshotEntry, SnapshotStore};
pub use synthetic::{generate_demo_input, DemoOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn snapshot_entry_is_send_sync() {
        assert_send::<SnapshotEntry>();
        assert_sync::<SnapshotEntry>();
    }

    #[test]
    fn snapshot_store_is_send_sync() {
        assert_send::<SnapshotStore>();
        assert_sync::<SnapshotStore>();
    }

    #[test]
    fn cycle_outcome_is_send_sync() {
        assert_send::<CycleOutcome>();
        assert_sync::<CycleOutcome>();
    }

    #[test]
    fn demo_options_is_send_sync() {
        assert_send::<DemoOptions>();
        assert_sync::<DemoOptions>();
    }
}
