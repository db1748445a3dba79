//! CLI output formatting.
//!
//! This module contains all output formatting functions for the CLI.
//! Extracted to enable testing of output generation.

use std::f64::consts::PI;

use super::commands::{RunReport, VerifyResult};
use crate::error::PiError;

/// History points shown by a non-verbose run.
const HISTORY_TAIL: usize = 5;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// One-line description of a failed command.
///
/// Rejected input is labelled separately from configuration and I/O failures.
#[must_use]
pub fn format_error(err: &PiError) -> String {
    if err.is_input_error() {
        format!("Invalid input: {err}")
    } else {
        format!("Error: {err}")
    }
}

/// Print an error to stderr.
pub fn print_error(err: &PiError) {
    eprintln!("{}", format_error(err));
}

/// Print version information.
pub fn print_version() {
    match option_env!("PIDROP_GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            println!("pidrop {} ({hash})", env!("CARGO_PKG_VERSION"));
        }
        _ => println!("pidrop {}", env!("CARGO_PKG_VERSION")),
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"pidrop - Monte Carlo π from balls dropped into a disc

USAGE:
    pidrop <COMMAND> [OPTIONS]

COMMANDS:
    run [config.yaml]           Drop balls and report the estimate
        --balls <N>             Balls to drop (default: 10000)
        --batches <K>           Split the balls into K drops (default: 10)
        --seed <N>              Override the configured seed
        --json                  Print a JSON report
        --commentary            Ask for commentary on the result
        -v, --verbose           Show the full history

    verify [config.yaml]        Check that repeated runs are identical
        --balls <N>             Balls per run (default: 10000)
        --runs <N>              Number of runs (default: 3)

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    pidrop run --balls 100000
    pidrop run experiments/ball_drop.yaml --seed 7 --json
    pidrop verify --runs 5

ESTIMATOR:
    Balls land uniformly over a disc of radius R. The inscribed square
    covers 2R² of the disc's πR², so π ≈ 2 · n_circle / n_square.

ENVIRONMENT:
    RUST_LOG                    Log filter (default: warn)
    GEMINI_API_KEY              Credential for commentary
"
    );
}

/// Print a run report.
///
/// # Arguments
///
/// * `report` - The report to display
/// * `verbose` - Whether to show the full history
pub fn print_run_report(report: &RunReport, verbose: bool) {
    let stats = &report.stats;

    println!("{RULE}");
    println!("Balls:    {} in {} drop(s)", report.balls, report.batches);
    println!("Seed:     {}", report.seed);
    println!("Ticks:    {}", report.ticks);
    println!("{RULE}\n");

    println!("Statistics:");
    println!("  Total in circle: {}", stats.total_in_circle);
    println!("  Total in square: {}", stats.total_in_square);
    println!("  Estimated π:     {:.6}", stats.estimated_pi);
    println!("  True π:          {PI:.6}");
    println!("  Error:           {:.4}%", stats.error * 100.0);
    if report.expected_error.is_finite() {
        println!("  Expected error:  {:.4}%", report.expected_error * 100.0);
    }

    if !report.history.is_empty() {
        let shown = if verbose {
            report.history.len()
        } else {
            report.history.len().min(HISTORY_TAIL)
        };
        println!(
            "\nHistory (last {shown} of {} points):",
            report.history.len()
        );
        for point in &report.history[report.history.len() - shown..] {
            println!("  n={:>8}  π̂={:.6}", point.index, point.value);
        }
    }

    println!("\nFalsification Criteria:");
    for criterion in &report.falsification.criteria {
        let symbol = if criterion.passed { "✓" } else { "✗" };
        println!(
            "  {symbol} {} ({}): {:.6} vs {:.6}",
            criterion.id, criterion.name, criterion.value, criterion.threshold
        );
    }

    if let Some(commentary) = &report.commentary {
        println!("\nCommentary:\n  {commentary}");
    }

    let status = if report.falsification.verified {
        "✓ VERIFIED"
    } else {
        "✗ NOT VERIFIED"
    };
    println!("\n{RULE}");
    println!("{status}: {}", report.falsification.message);
    println!("{RULE}");
}

/// Print a reproducibility check result.
pub fn print_verify_result(result: &VerifyResult) {
    let stats = &result.reference.stats;

    println!("{RULE}");
    println!("Reproducibility check: {} runs, seed {}", result.runs, result.seed);
    println!("{RULE}\n");

    println!("Reference run:");
    println!("  Balls:       {}", result.reference.balls);
    println!("  Ticks:       {}", result.reference.ticks);
    println!("  Estimated π: {:.15}", stats.estimated_pi);
    println!("  History:     {} points", result.reference.history.len());

    let mark = |ok: bool| if ok { "✓" } else { "✗" };
    println!("\n  {} All runs identical", mark(result.identical));
    println!("  {} Reset replays the run", mark(result.reset_replays));

    println!("\n{RULE}");
    if result.passed() {
        println!("✓ REPRODUCIBLE");
    } else {
        println!("✗ NOT REPRODUCIBLE");
    }
    println!("{RULE}");
}
