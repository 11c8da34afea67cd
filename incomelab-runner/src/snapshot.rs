//! Snapshot history — JSONL append-only persistence of cycle results.
//!
//! One compact JSON object per evaluated cycle: regime, do-nothing flag,
//! per-instrument labels and scores, portfolio totals. Kept for charting
//! signal history over time; the engine itself never reads it back.
//!
//! Re-recording the same cycle (same input hash under the same config) is a
//! no-op, so re-running an evaluation does not duplicate history.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use incomelab_core::components::{RegimeState, SignalLabel};
use incomelab_core::CycleReport;
use serde::{Deserialize, Serialize};

/// Per-instrument line of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalSummary {
    pub ticker: String,
    pub label: SignalLabel,
    pub score: Option<f64>,
}

/// A single history entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotEntry {
    pub as_of: Option<NaiveDate>,
    pub input_hash: String,
    pub config_fingerprint: String,
    pub regime: RegimeState,
    pub do_nothing: bool,
    pub signals: Vec<SignalSummary>,
    #[serde(default)]
    pub portfolio_value: Option<f64>,
    #[serde(default)]
    pub monthly_income: Option<f64>,
}

impl SnapshotEntry {
    pub fn from_report(report: &CycleReport) -> Self {
        Self {
            as_of: report.as_of,
            input_hash: report.input_hash.clone(),
            config_fingerprint: report.config_fingerprint.clone(),
            regime: report.regime.state,
            do_nothing: report.do_nothing.active,
            signals: report
                .signals()
                .map(|s| SignalSummary {
                    ticker: s.ticker.clone(),
                    label: s.label,
                    score: s.score,
                })
                .collect(),
            portfolio_value: report.portfolio.as_ref().map(|p| p.total_value),
            monthly_income: report.portfolio.as_ref().map(|p| p.total_monthly_income),
        }
    }

    fn same_cycle(&self, other: &Self) -> bool {
        self.input_hash == other.input_hash && self.config_fingerprint == other.config_fingerprint
    }
}

/// JSONL snapshot file manager.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append an entry unless the same cycle is already recorded.
    ///
    /// Returns `Ok(true)` if the entry was written, `Ok(false)` if skipped.
    pub fn append(&self, entry: &SnapshotEntry) -> io::Result<bool> {
        if self.read_all()?.iter().any(|e| e.same_cycle(entry)) {
            return Ok(false);
        }

        let json = serde_json::to_string(entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(file, "{json}")?;
        file.flush()?;

        Ok(true)
    }

    pub fn file_size_bytes(&self) -> io::Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Read all entries in file order. Malformed lines are skipped.
    pub fn read_all(&self) -> io::Result<Vec<SnapshotEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let reader = io::BufReader::new(file);
        let mut entries = Vec::new();

        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SnapshotEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(line = n + 1, error = %e, "skipping malformed snapshot"),
            }
        }

        Ok(entries)
    }

    pub fn latest(&self) -> io::Result<Option<SnapshotEntry>> {
        Ok(self.read_all()?.pop())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Label / score series per ticker, in recording order.
pub fn signal_history(
    entries: &[SnapshotEntry],
) -> BTreeMap<String, Vec<(Option<NaiveDate>, SignalLabel, Option<f64>)>> {
    let mut out: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for entry in entries {
        for s in &entry.signals {
            out.entry(s.ticker.clone())
                .or_default()
                .push((entry.as_of, s.label, s.score));
        }
    }
    out
}

/// How many recorded cycles ended in each regime.
pub fn regime_counts(entries: &[SnapshotEntry]) -> [(RegimeState, usize); 3] {
    RegimeState::BY_CAUTION.map(|state| (state, entries.iter().filter(|e| e.regime == state).count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str, regime: RegimeState) -> SnapshotEntry {
        SnapshotEntry {
            as_of: NaiveDate::from_ymd_opt(2026, 3, 2),
            input_hash: hash.into(),
            config_fingerprint: "cfg".into(),
            regime,
            do_nothing: false,
            signals: vec![SignalSummary {
                ticker: "QDTE".into(),
                label: SignalLabel::Hold,
                score: Some(0.4),
            }],
            portfolio_value: None,
            monthly_income: None,
        }
    }

    #[test]
    fn signal_history_groups_by_ticker() {
        let entries = vec![entry("a", RegimeState::Mixed), entry("b", RegimeState::RiskOff)];
        let history = signal_history(&entries);
        assert_eq!(history.len(), 1);
        assert_eq!(history["QDTE"].len(), 2);
        assert_eq!(history["QDTE"][0].1, SignalLabel::Hold);
    }

    #[test]
    fn regime_counts_cover_every_state() {
        let entries = vec![
            entry("a", RegimeState::Mixed),
            entry("b", RegimeState::Mixed),
            entry("c", RegimeState::Constructive),
        ];
        let counts = regime_counts(&entries);
        assert_eq!(counts[0], (RegimeState::RiskOff, 0));
        assert_eq!(counts[1], (RegimeState::Mixed, 2));
        assert_eq!(counts[2], (RegimeState::Constructive, 1));
    }

    #[test]
    fn missing_file_reads_empty() {
        let store = SnapshotStore::new("/nonexistent/dir/history.jsonl");
        assert!(store.read_all().unwrap().is_empty());
        assert_eq!(store.file_size_bytes().unwrap(), 0);
    }
}
