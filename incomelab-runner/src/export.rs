//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full cycle report with schema versioning
//! - **CSV**: the combined signal table, one row per instrument
//! - **Markdown**: human-readable cycle report with per-signal factor breakdowns
//!
//! Persisted reports carry `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use incomelab_core::components::{pct, CombinerPolicy};
use incomelab_core::domain::Computed;
use incomelab_core::engine::SCHEMA_VERSION;
use incomelab_core::CycleReport;

const NOT_AVAILABLE: &str = "N/A";

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &CycleReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize CycleReport to JSON")
}

/// Deserialize a `CycleReport`, rejecting schema versions newer than ours.
pub fn import_json(json: &str) -> Result<CycleReport> {
    let report: CycleReport =
        serde_json::from_str(json).context("failed to deserialize CycleReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the combined signal table as CSV.
///
/// Unavailable values are written as `N/A` with the reason in the matching
/// rationale column.
pub fn export_signal_table_csv(report: &CycleReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "price_14d",
        "price_28d",
        "monthly_income",
        "stability",
        "stability_score",
        "stability_rationale",
        "momentum",
        "momentum_ratio",
        "momentum_rationale",
        "sentiment",
        "sentiment_label",
        "regime",
        "signal",
        "signal_score",
        "signal_rationale",
        "payout_risk",
        "payout_risk_rationale",
    ])?;

    let regime = report.regime.state.to_string();
    for row in &report.rows {
        let (stability, stability_score, stability_rationale) = match &row.stability {
            Computed::Value(s) => (s.class.to_string(), format!("{:.4}", s.score), s.rationale.clone()),
            Computed::NotAvailable(e) => (NOT_AVAILABLE.into(), NOT_AVAILABLE.into(), e.to_string()),
        };
        let (momentum, momentum_ratio, momentum_rationale) = match &row.momentum {
            Computed::Value(m) => (
                m.label.to_string(),
                format!("{:.4}", m.ratio),
                format!("price ratio {:.4} reads {}", m.ratio, m.label),
            ),
            Computed::NotAvailable(e) => (NOT_AVAILABLE.into(), NOT_AVAILABLE.into(), e.to_string()),
        };
        let (sentiment, sentiment_label) = match &row.sentiment {
            Some(s) => (format!("{:.2}", s.score), s.label.clone()),
            None => (NOT_AVAILABLE.into(), String::new()),
        };
        let (payout, payout_rationale) = match &row.payout_risk {
            Computed::Value(p) => (p.level.to_string(), p.rationale.clone()),
            Computed::NotAvailable(e) => (NOT_AVAILABLE.into(), e.to_string()),
        };

        wtr.write_record([
            &row.ticker,
            &format!("{:.4}", row.price_14d),
            &format!("{:.4}", row.price_28d),
            &format!("{:.2}", row.monthly_income),
            &stability,
            &stability_score,
            &stability_rationale,
            &momentum,
            &momentum_ratio,
            &momentum_rationale,
            &sentiment,
            &sentiment_label,
            &regime,
            &row.signal.label.to_string(),
            &row.signal.score.map_or_else(|| NOT_AVAILABLE.into(), |s| format!("{s:.4}")),
            &row.signal.rationale,
            &payout,
            &payout_rationale,
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact directories ───────────────────────────────────────────

/// Write `report.json`, `signals.csv` and `report.md` into a new directory
/// under `output_dir`, named after the cycle date.
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &CycleReport, output_dir: &Path) -> Result<PathBuf> {
    let stamp = match report.as_of {
        Some(d) => d.format("%Y%m%d").to_string(),
        None => chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
    };
    let short_hash: String = report.input_hash.chars().take(8).collect();
    let run_dir = output_dir.join(format!("cycle_{stamp}_{short_hash}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("signals.csv"), export_signal_table_csv(report)?)?;
    std::fs::write(run_dir.join("report.md"), render_markdown(report))?;

    Ok(run_dir)
}

pub fn load_artifacts(dir: &Path) -> Result<CycleReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Render a signed dollar amount: `+$1,234.56`, `-$3,015.00`, `$0.00`.
pub fn signed_dollars(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    let sign = if cents > 0.0 {
        "+"
    } else if cents < 0.0 {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(cents.abs() / 100.0))
}

fn dollars(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    let sign = if cents < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(cents.abs() / 100.0))
}

/// Group the integer digits of `amount` in threes. The sign is dropped;
/// callers place it themselves.
fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 && ch.is_ascii_digit() {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped}.{frac}")
}

fn or_na<T>(value: &Computed<T>, f: impl Fn(&T) -> String) -> String {
    value.value().map_or_else(|| NOT_AVAILABLE.to_string(), f)
}

/// Markdown report for one cycle.
pub fn render_markdown(report: &CycleReport) -> String {
    let mut md = String::new();

    md.push_str("# Signal Report\n\n");

    md.push_str("## Cycle\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| As of | {} |\n",
        report.as_of.map_or_else(|| "unspecified".to_string(), |d| d.to_string())
    ));
    md.push_str(&format!("| Regime | **{}** |\n", report.regime.state));
    md.push_str(&format!(
        "| Do nothing day | {} |\n",
        if report.do_nothing.active { "**YES**" } else { "no" }
    ));
    md.push_str(&format!("| Instruments | {} |\n", report.rows.len()));
    md.push_str(&format!("| Input Hash | {} |\n", report.input_hash));
    md.push_str(&format!("| Config Fingerprint | {} |\n", report.config_fingerprint));
    md.push('\n');

    md.push_str("## Market Regime\n\n");
    md.push_str(&format!("{}\n\n", report.regime.rationale));
    if !report.regime.votes.is_empty() {
        md.push_str("| Indicator | Value | Vote |\n");
        md.push_str("| --- | --- | --- |\n");
        for v in &report.regime.votes {
            md.push_str(&format!("| {} | {:.4} | {} |\n", v.indicator, v.value, v.vote));
        }
        md.push('\n');
    }
    md.push_str(&format!("{}\n\n", report.do_nothing.rationale));

    md.push_str("## Signals\n\n");
    md.push_str("| Ticker | Stability | Momentum | Sentiment | Signal | Score | Payout Risk |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    for row in &report.rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} | **{}** | {} | {} |\n",
            row.ticker,
            or_na(&row.stability, |s| format!("{} ({:.2})", s.class, s.score)),
            or_na(&row.momentum, |m| format!("{} ({:.3})", m.label, m.ratio)),
            row.sentiment
                .as_ref()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{:+.2}", s.score)),
            row.signal.label,
            row.signal
                .score
                .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s:+.3}")),
            or_na(&row.payout_risk, |p| p.level.to_string()),
        ));
    }
    md.push('\n');

    md.push_str("## Why\n\n");
    for row in &report.rows {
        md.push_str(&format!("### {}: {}\n\n", row.ticker, row.signal.label));
        md.push_str(&format!("{}\n\n", row.signal.rationale));
        md.push_str("| Factor | Value | Weight | Contribution | Note |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        for f in &row.signal.factors {
            md.push_str(&format!(
                "| {} | {:+.3} | {:.2} | {:+.3} | {} |\n",
                f.name,
                f.value,
                f.weight,
                f.contribution,
                f.note.as_deref().unwrap_or("")
            ));
        }
        md.push('\n');
        if let Some(s) = row.stability.value() {
            md.push_str(&format!("- Stability: {}\n", s.rationale));
        }
        if let Computed::Value(p) = &row.payout_risk {
            md.push_str(&format!("- Payout risk: {}\n", p.rationale));
        }
        md.push('\n');
    }

    if let Some(pick) = &report.reinvest {
        md.push_str("## Reinvestment\n\n");
        md.push_str(&format!("{}\n\n", pick.rationale));
        md.push_str("| Ticker | Trailing Return | Volatility | Score |\n");
        md.push_str("| --- | --- | --- | --- |\n");
        for c in &pick.candidates {
            md.push_str(&format!(
                "| {} | {} | {:.4} | {:.3} |\n",
                c.ticker,
                pct(c.trailing_return),
                c.volatility,
                c.score
            ));
        }
        md.push('\n');
    }

    if let Some(p) = &report.portfolio {
        md.push_str("## Portfolio\n\n");
        md.push_str("| Ticker | Shares | Price | Value | Monthly Income |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        for pos in &p.positions {
            md.push_str(&format!(
                "| {} | {:.2} | {} | {} | {} |\n",
                pos.ticker,
                pos.shares,
                dollars(pos.price),
                dollars(pos.position_value),
                dollars(pos.monthly_income)
            ));
        }
        md.push('\n');
        md.push_str(&format!("- Total value: {}\n", dollars(p.total_value)));
        md.push_str(&format!("- Weekly income: {}\n", dollars(p.total_weekly_income)));
        md.push_str(&format!("- Monthly income: {}\n", dollars(p.total_monthly_income)));
        md.push_str(&format!("- Annual income: {}\n", dollars(p.total_annual_income)));
        if let Some(gain) = p.unrealized_gain {
            md.push_str(&format!("- Unrealized gain: {}\n", signed_dollars(gain)));
        }
        md.push('\n');
    }

    if !report.warnings.is_empty() {
        md.push_str("## Data Quality\n\n");
        for warn in &report.warnings {
            md.push_str(&format!("- {warn}\n"));
        }
        md.push('\n');
    }

    md
}

/// Markdown table of the combination policy.
pub fn render_policy_markdown(policy: &CombinerPolicy) -> String {
    let mut md = String::new();
    md.push_str("# Combination Policy\n\n");
    md.push_str("| Step | Rule | Value |\n");
    md.push_str("| --- | --- | --- |\n");
    for row in &policy.rows {
        md.push_str(&format!("| {} | {} | {} |\n", row.step, row.rule, row.value));
    }
    md
}
