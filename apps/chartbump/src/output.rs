//! Output rendering for the single-chart and batch workflows.
//!
//! Supports `human` (default) and `json` outputs. The JSON form serializes
//! the report as-is; errors become `{"error": ..., "lintOutput": ...}`.

use crate::error::Error;
use crate::models::{BatchReport, BumpStatus, ChartReport, DepUpdate, Outcome};
use crate::utils;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value as JsonVal;

const COMMON_LINT_FAILURES: [&str; 3] = [
    "Missing required tools (yamllint, yamale)",
    "Chart validation errors",
    "YAML syntax issues",
];

fn use_colors(output: &str) -> bool {
    output != "json" && utils::colors_enabled()
}

fn ok_mark(color: bool) -> String {
    if color {
        "✓".green().bold().to_string()
    } else {
        "✓".to_string()
    }
}

fn fail_mark(color: bool) -> String {
    if color {
        "✗".red().bold().to_string()
    } else {
        "✗".to_string()
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} failed to render JSON: {}", utils::error_prefix(), e),
    }
}

/// Announce the chart being processed before external tools run.
pub fn print_start(chart: Option<&str>, target_branch: Option<&str>, output: &str) {
    if output == "json" {
        return;
    }
    match chart {
        Some(c) => println!("Running chartbump on: {}", c),
        None => println!("Running chartbump in auto-detect mode"),
    }
    if let Some(b) = target_branch {
        println!("Target branch: {}", b);
    }
    println!();
}

/// Print the single-chart report in the requested format.
pub fn print_single(report: &ChartReport, output: &str) {
    if output == "json" {
        print_json(&compose_single_json(report));
        return;
    }
    let color = use_colors(output);
    match &report.dep_update {
        DepUpdate::Updated => println!("{} Dependencies updated", ok_mark(color)),
        DepUpdate::Failed { reason } => println!("{} {}", utils::warn_prefix(), reason),
        DepUpdate::Skipped => {}
    }

    let (from, to) = match &report.outcome {
        Outcome::Clean => {
            println!("{} ct lint passed - no version bump needed", ok_mark(color));
            return;
        }
        Outcome::DryRun { from, to }
        | Outcome::Bumped { from, to, .. }
        | Outcome::Unverified { from, to, .. } => (from, to),
    };

    if let Some(out) = &report.lint_output {
        println!("ct lint output:\n{}", out);
    }
    println!(
        "{} Version bump required - proceeding with patch version bump",
        ok_mark(color)
    );
    println!("Current version: {}", from);
    println!("New version: {}", to);

    match &report.outcome {
        Outcome::DryRun { .. } => {
            let tag = if color {
                "[DRY RUN]".yellow().bold().to_string()
            } else {
                "[DRY RUN]".to_string()
            };
            println!("\n{} Would update Chart.yaml with new version", tag);
        }
        Outcome::Bumped { verified, .. } => {
            println!("{} Chart.yaml updated successfully", ok_mark(color));
            if *verified {
                println!(
                    "{} Verification successful - chart now passes ct lint",
                    ok_mark(color)
                );
            } else {
                println!("{} verification skipped", utils::note_prefix());
            }
            let line = format!("Successfully bumped version from {} to {}", from, to);
            if color {
                println!("\n✨ {}", line.bold());
            } else {
                println!("\n✨ {}", line);
            }
        }
        Outcome::Unverified { lint_output, .. } => {
            println!("{} Chart.yaml updated successfully", ok_mark(color));
            println!(
                "{} Lint still shows issues:\n{}",
                utils::warn_prefix(),
                lint_output
            );
            println!(
                "{} version bump completed but lint still fails",
                fail_mark(color)
            );
        }
        Outcome::Clean => {}
    }
}

/// Print the batch report in the requested format.
pub fn print_batch(report: &BatchReport, output: &str) {
    if output == "json" {
        print_json(&compose_batch_json(report));
        return;
    }
    let color = use_colors(output);
    if report.clean {
        println!(
            "{} All charts passed ct lint - no version bumps needed",
            ok_mark(color)
        );
        return;
    }
    if let Some(out) = &report.lint_output {
        println!("ct lint output:\n{}", out);
    }
    println!(
        "Found {} chart(s) requiring version bumps:",
        report.charts.len()
    );
    for c in &report.charts {
        println!("  - {}", c.chart);
    }

    let bar = "=".repeat(20);
    for c in &report.charts {
        println!("\n{} Processing {} {}", bar, c.chart, bar);
        match &c.status {
            BumpStatus::Succeeded { from, to, dry_run } => {
                println!("  Current version: {}", from);
                println!("  New version: {}", to);
                if *dry_run {
                    println!("  [DRY RUN] Would update Chart.yaml with new version");
                }
                println!("{} Successfully bumped {}", ok_mark(color), c.chart);
            }
            BumpStatus::Failed { reason } => {
                println!("{} Failed to bump {}: {}", fail_mark(color), c.chart, reason);
            }
        }
    }

    let bar = "=".repeat(30);
    let title = format!("{} Summary {}", bar, bar);
    if color {
        println!("\n{}", title.bold());
    } else {
        println!("\n{}", title);
    }
    println!("Successfully bumped: {}", report.summary.succeeded);
    println!("Failed: {}", report.summary.failed);
}

/// Whether `err` is a lint problem the common-causes list may explain.
fn lint_trouble(err: &Error) -> bool {
    matches!(err, Error::ClassificationMismatch { .. } | Error::Spawn { .. })
}

fn print_common_causes() {
    println!("\nCommon reasons for lint failure:");
    for reason in COMMON_LINT_FAILURES {
        println!("  - {}", reason);
    }
}

/// Print a workflow error. Errors raised on a lint result come with the
/// lint output; lint failures that are not version related, and a `ct`
/// that cannot be started, also get a short list of likely causes.
pub fn print_error(err: &Error, output: &str) {
    if output == "json" {
        print_json(&compose_error_json(err));
        return;
    }
    let color = use_colors(output);
    if let Some(lint) = err.lint_output() {
        println!("ct lint output:\n{}", lint);
    }
    match err {
        Error::ClassificationMismatch { .. } => {
            println!(
                "{} ct lint failed, but no version bump is required",
                fail_mark(color)
            );
            print_common_causes();
            println!("\nNo version bump will be performed.");
        }
        Error::Spawn { .. } => {
            println!("{} ct lint could not be run", fail_mark(color));
            print_common_causes();
        }
        _ => {}
    }
    eprintln!("{} {}", utils::error_prefix(), err);
}

/// Compose single-chart JSON object (pure) for testing/snapshot purposes.
pub fn compose_single_json(report: &ChartReport) -> JsonVal {
    serde_json::to_value(report).unwrap_or(JsonVal::Null)
}

/// Compose batch JSON object (pure) for testing/snapshot purposes.
pub fn compose_batch_json(report: &BatchReport) -> JsonVal {
    serde_json::to_value(report).unwrap_or(JsonVal::Null)
}

/// Compose error JSON object (pure) for testing/snapshot purposes.
pub fn compose_error_json(err: &Error) -> JsonVal {
    let mut out = json!({ "error": err.to_string() });
    if let Some(lint) = err.lint_output() {
        out["lintOutput"] = json!(lint);
    }
    if lint_trouble(err) {
        out["commonCauses"] = json!(COMMON_LINT_FAILURES);
    }
    out
}
