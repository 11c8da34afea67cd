use incomelab_core::domain::{InstrumentSnapshot, SentimentScore};
use incomelab_core::{CycleInput, EngineConfig};
use incomelab_runner::export::{load_artifacts, save_artifacts};
use incomelab_runner::{
    export_json, export_signal_table_csv, generate_demo_input, import_json, render_markdown,
    run_cycle, run_cycle_from_files, save_input, DemoOptions, RunError,
};

/// Two instruments: one fully described, one with only 14d/28d prices so its
/// stability is unavailable.
fn mixed_input() -> CycleInput {
    let mut input = generate_demo_input(&DemoOptions {
        tickers: vec!["QDTE".into()],
        ..Default::default()
    });
    input
        .instruments
        .push(InstrumentSnapshot::new("BARE", 20.0, 21.0).with_monthly_income(50.0));
    input
        .sentiment
        .insert("BARE".into(), SentimentScore::new(-0.2, "negative"));
    input
}

// ── JSON ──

#[test]
fn json_export_roundtrips() {
    let report = run_cycle(&mixed_input(), &EngineConfig::default(), None)
        .unwrap()
        .report;
    let restored = import_json(&export_json(&report).unwrap()).unwrap();
    assert_same_cycle(&restored, &report);
}

fn assert_same_cycle(a: &incomelab_core::CycleReport, b: &incomelab_core::CycleReport) {
    assert_eq!(a.input_hash, b.input_hash);
    assert_eq!(a.config_fingerprint, b.config_fingerprint);
    assert_eq!(a.regime.state, b.regime.state);
    assert_eq!(a.do_nothing.active, b.do_nothing.active);
    assert_eq!(a.warnings, b.warnings);
    let labels = |r: &incomelab_core::CycleReport| {
        r.signals()
            .map(|s| (s.ticker.clone(), s.label, s.rationale.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(a), labels(b));
}

// ── CSV ──

#[test]
fn csv_has_one_row_per_instrument_and_marks_gaps() {
    let report = run_cycle(&mixed_input(), &EngineConfig::default(), None)
        .unwrap()
        .report;
    let csv = export_signal_table_csv(&report).unwrap();

    let mut rdr = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
    let headers = rdr.headers().unwrap().clone();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "QDTE");
    assert_eq!(&rows[1][0], "BARE");

    let stability = headers.iter().position(|h| h == "stability").unwrap();
    let rationale = headers.iter().position(|h| h == "stability_rationale").unwrap();
    assert_eq!(&rows[1][stability], "N/A");
    assert!(rows[1][rationale].contains("insufficient data"));
    assert_ne!(&rows[0][stability], "N/A");

    let payout = headers.iter().position(|h| h == "payout_risk").unwrap();
    let payout_rationale = headers.iter().position(|h| h == "payout_risk_rationale").unwrap();
    assert_eq!(&rows[1][payout], "N/A");
    assert!(rows[1][payout_rationale].contains("insufficient data"));
}

#[test]
fn csv_gives_reason_for_unavailable_momentum() {
    let mut input = mixed_input();
    input
        .instruments
        .push(InstrumentSnapshot::new("ZERO", 0.0, 21.0));
    let report = run_cycle(&input, &EngineConfig::default(), None)
        .unwrap()
        .report;
    let csv = export_signal_table_csv(&report).unwrap();

    let mut rdr = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
    let headers = rdr.headers().unwrap().clone();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(headers.len(), rows[2].len());

    let momentum = headers.iter().position(|h| h == "momentum").unwrap();
    let rationale = headers.iter().position(|h| h == "momentum_rationale").unwrap();
    assert_eq!(&rows[2][0], "ZERO");
    assert_eq!(&rows[2][momentum], "N/A");
    assert!(rows[2][rationale].contains("invalid price"), "{}", &rows[2][rationale]);
    assert!(rows[1][rationale].contains("price ratio"));
}

// ── Markdown ──

#[test]
fn markdown_explains_every_signal() {
    let report = run_cycle(&mixed_input(), &EngineConfig::default(), None)
        .unwrap()
        .report;
    let md = render_markdown(&report);

    assert!(md.contains("# Signal Report"));
    assert!(md.contains("## Market Regime"));
    assert!(md.contains("### QDTE:"));
    assert!(md.contains("### BARE:"));
    assert!(md.contains("| stability |"));
    assert!(md.contains("| regime |"));
    assert!(md.contains("## Portfolio"));
    assert!(md.contains("## Data Quality"));
}

// ── Files ──

#[test]
fn artifacts_roundtrip_through_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    let report = run_cycle(&mixed_input(), &EngineConfig::default(), None)
        .unwrap()
        .report;

    let run_dir = save_artifacts(&report, dir.path()).unwrap();
    assert!(run_dir.join("report.json").exists());
    assert!(run_dir.join("signals.csv").exists());
    assert!(run_dir.join("report.md").exists());

    assert_same_cycle(&load_artifacts(&run_dir).unwrap(), &report);
}

#[test]
fn run_from_files_with_config_override() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("cycle.json");
    let config_path = dir.path().join("engine.toml");
    save_input(&input_path, &mixed_input()).unwrap();
    std::fs::write(&config_path, "[do_nothing]\nmove_threshold = 0.5\n").unwrap();

    let outcome = run_cycle_from_files(&input_path, Some(&config_path), None).unwrap();

    // A 50% threshold cannot trip on a demo benchmark.
    assert!(!outcome.report.do_nothing.active);
    assert_eq!(outcome.report.rows.len(), 2);
    assert_ne!(
        outcome.report.config_fingerprint,
        EngineConfig::default().fingerprint()
    );
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("cycle.json");
    let config_path = dir.path().join("engine.toml");
    save_input(&input_path, &mixed_input()).unwrap();
    std::fs::write(&config_path, "[combiner]\nstability_weight = 0.9\n").unwrap();

    let err = run_cycle_from_files(&input_path, Some(&config_path), None).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));
}

#[test]
fn missing_input_file_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_cycle_from_files(&dir.path().join("missing.json"), None, None).unwrap_err();
    assert!(matches!(err, RunError::Input(_)));
}
