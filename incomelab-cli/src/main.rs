//! IncomeLab CLI — evaluate a cycle, inspect the policy, generate demo input,
//! and read signal history.
//!
//! Commands:
//! - `evaluate` — run one cycle from a JSON input file and print the signal table
//! - `policy` — print the combination policy and the effective TOML config
//! - `demo` — write a deterministic synthetic input file
//! - `history` — list recorded snapshots from a JSONL store
//!
//! Logs go to stderr; set `RUST_LOG` (e.g. `RUST_LOG=debug`) to see more.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use incomelab_core::components::CombinerPolicy;
use incomelab_core::domain::Computed;
use incomelab_core::CycleReport;
use incomelab_runner::{
    export_json, export_signal_table_csv, generate_demo_input, load_config, regime_counts,
    render_markdown, render_policy_markdown, run_cycle_from_files, save_input, signed_dollars,
    DemoOptions, SnapshotStore,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "incomelab",
    about = "IncomeLab CLI — strategy signals for income ETFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one cycle from a JSON input file.
    Evaluate {
        /// Path to the cycle input JSON.
        #[arg(long)]
        input: PathBuf,

        /// Path to a TOML engine config. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSONL snapshot store to append this cycle to.
        #[arg(long)]
        store: Option<PathBuf>,

        /// Write the signal table as CSV.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the full report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print the Markdown report instead of the summary table.
        #[arg(long, default_value_t = false)]
        markdown: bool,
    },
    /// Print the combination policy and the effective config.
    Policy {
        /// Path to a TOML engine config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the policy as a Markdown table.
        #[arg(long, default_value_t = false)]
        markdown: bool,
    },
    /// Write a deterministic synthetic cycle input.
    Demo {
        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Tickers to generate (e.g., QDTE XDTE). Defaults to a small set.
        #[arg(long, num_args = 1..)]
        tickers: Vec<String>,

        /// Cycle date (YYYY-MM-DD).
        #[arg(long)]
        as_of: Option<String>,

        /// Trading days of history per series.
        #[arg(long, default_value_t = 60)]
        days: usize,

        /// Output path for the input JSON.
        #[arg(long)]
        out: PathBuf,
    },
    /// List recorded snapshots.
    History {
        /// JSONL snapshot store.
        #[arg(long)]
        store: PathBuf,

        /// Only show this ticker's label history.
        #[arg(long)]
        ticker: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            input,
            config,
            store,
            csv,
            json,
            markdown,
        } => run_evaluate(&input, config.as_deref(), store, csv, json, markdown),
        Commands::Policy { config, markdown } => run_policy(config.as_deref(), markdown),
        Commands::Demo {
            seed,
            tickers,
            as_of,
            days,
            out,
        } => run_demo(seed, tickers, as_of, days, &out),
        Commands::History { store, ticker } => run_history(store, ticker.as_deref()),
    }
}

fn run_evaluate(
    input: &Path,
    config: Option<&Path>,
    store: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    json_path: Option<PathBuf>,
    markdown: bool,
) -> Result<()> {
    let store = store.map(SnapshotStore::new);
    let outcome = run_cycle_from_files(input, config, store.as_ref())?;
    let report = &outcome.report;

    if markdown {
        print!("{}", render_markdown(report));
    } else {
        print_summary(report);
    }

    if let Some(path) = csv_path {
        std::fs::write(&path, export_signal_table_csv(report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Signal table written to: {}", path.display());
    }
    if let Some(path) = json_path {
        std::fs::write(&path, export_json(report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("Report written to: {}", path.display());
    }
    match (outcome.stored, &store) {
        (Some(true), Some(s)) => eprintln!("Snapshot appended to: {}", s.path().display()),
        (Some(false), Some(_)) => eprintln!("Snapshot already recorded for this cycle"),
        _ => {}
    }

    Ok(())
}

fn print_summary(report: &CycleReport) {
    println!();
    println!("=== Signals{} ===", report.as_of.map(|d| format!(" {d}")).unwrap_or_default());
    println!("Regime:         {}", report.regime.state);
    println!("                {}", report.regime.rationale);
    if report.do_nothing.active {
        println!("DO NOTHING DAY: {}", report.do_nothing.rationale);
    }
    println!();
    println!(
        "{:<8} {:<10} {:<12} {:>9} {:<18} {:>8}  {}",
        "Ticker", "Stability", "Momentum", "Sentiment", "Signal", "Score", "Payout"
    );
    for row in &report.rows {
        let stability = match &row.stability {
            Computed::Value(s) => s.class.to_string(),
            Computed::NotAvailable(_) => "N/A".into(),
        };
        let momentum = match &row.momentum {
            Computed::Value(m) => m.label.to_string(),
            Computed::NotAvailable(_) => "N/A".into(),
        };
        let sentiment = row
            .sentiment
            .as_ref()
            .map_or_else(|| "N/A".to_string(), |s| format!("{:+.2}", s.score));
        let score = row
            .signal
            .score
            .map_or_else(|| "N/A".to_string(), |s| format!("{s:+.3}"));
        let payout = match &row.payout_risk {
            Computed::Value(p) => p.level.to_string(),
            Computed::NotAvailable(_) => "N/A".into(),
        };
        println!(
            "{:<8} {:<10} {:<12} {:>9} {:<18} {:>8}  {}",
            row.ticker,
            stability,
            momentum,
            sentiment,
            row.signal.label.to_string(),
            score,
            payout
        );
    }

    if let Some(pick) = &report.reinvest {
        println!();
        println!("Reinvest:       {}", pick.rationale);
    }
    if let Some(p) = &report.portfolio {
        println!(
            "Portfolio:      ${:.2} value, ${:.2}/month income",
            p.total_value, p.total_monthly_income
        );
        if let Some(gain) = p.unrealized_gain {
            println!("Unrealized:     {}", signed_dollars(gain));
        }
    }
    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for w in &report.warnings {
            println!("  - {w}");
        }
    }
    println!();
}

fn run_policy(config: Option<&Path>, markdown: bool) -> Result<()> {
    let config = load_config(config)?;
    config.validate()?;
    let policy = CombinerPolicy::from_config(&config.combiner);

    if markdown {
        print!("{}", render_policy_markdown(&policy));
    } else {
        println!("{policy}");
    }
    println!();
    println!("# Effective config (fingerprint {})", config.fingerprint());
    println!("{}", config.to_toml()?);
    Ok(())
}

fn run_demo(
    seed: u64,
    tickers: Vec<String>,
    as_of: Option<String>,
    days: usize,
    out: &Path,
) -> Result<()> {
    let mut opts = DemoOptions {
        seed,
        days,
        ..Default::default()
    };
    if !tickers.is_empty() {
        opts.tickers = tickers;
    }
    if let Some(s) = as_of.as_deref() {
        opts.as_of = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --as-of date '{s}'"))?;
    }

    let input = generate_demo_input(&opts);
    save_input(out, &input)?;
    println!(
        "Demo input ({} instruments, seed {}) written to: {}",
        input.instruments.len(),
        seed,
        out.display()
    );
    Ok(())
}

fn run_history(store: PathBuf, ticker: Option<&str>) -> Result<()> {
    let store = SnapshotStore::new(store);
    let entries = store
        .read_all()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    if entries.is_empty() {
        println!("No snapshots in {}", store.path().display());
        return Ok(());
    }

    if let Some(ticker) = ticker {
        println!("{:<12} {:<18} {:>8}", "Date", "Signal", "Score");
        for e in &entries {
            if let Some(s) = e.signals.iter().find(|s| s.ticker == ticker) {
                println!(
                    "{:<12} {:<18} {:>8}",
                    e.as_of.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                    s.label.to_string(),
                    s.score.map_or_else(|| "N/A".to_string(), |v| format!("{v:+.3}"))
                );
            }
        }
        return Ok(());
    }

    println!(
        "{:<12} {:<13} {:<11} {:>12}  {}",
        "Date", "Regime", "DoNothing", "Value", "Signals"
    );
    for e in &entries {
        let signals: Vec<String> = e
            .signals
            .iter()
            .map(|s| format!("{}={}", s.ticker, s.label))
            .collect();
        println!(
            "{:<12} {:<13} {:<11} {:>12}  {}",
            e.as_of.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
            e.regime.to_string(),
            if e.do_nothing { "yes" } else { "no" },
            e.portfolio_value
                .map_or_else(|| "-".to_string(), |v| format!("${v:.2}")),
            signals.join(" ")
        );
    }

    println!();
    let counts: Vec<String> = regime_counts(&entries)
        .iter()
        .map(|(state, n)| format!("{state}: {n}"))
        .collect();
    println!("{} snapshots ({})", entries.len(), counts.join(", "));
    tracing::debug!(bytes = store.file_size_bytes()?, "snapshot store size");
    Ok(())
}
