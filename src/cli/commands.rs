//! CLI command handlers.
//!
//! This module contains the execution logic for each CLI command.
//! Extracted to enable comprehensive testing of command behavior.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use super::args::DEFAULT_BATCHES;
use super::output::{
    print_error, print_help, print_run_report, print_verify_result, print_version,
};
use super::{Args, Command};
use crate::commentary::Commentator;
use crate::config::DropConfig;
use crate::demos::{BallDropDemo, EddDemo, FalsificationStatus};
use crate::domains::tracker::{expected_relative_error, HistoryPoint, Stats};
use crate::engine::{DropEngine, EngineSnapshot};
use crate::error::PiResult;

/// Options for the `run` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Configuration file; the embedded default when absent.
    pub config_path: Option<PathBuf>,
    /// Total balls to drop.
    pub balls: u64,
    /// Number of drops the balls are split into.
    pub batches: u64,
    /// Optional seed override.
    pub seed_override: Option<u64>,
    /// Print JSON instead of text.
    pub json: bool,
    /// Fetch commentary on the final statistics.
    pub commentary: bool,
    /// Enable verbose output.
    pub verbose: bool,
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Seed the run used.
    pub seed: u64,
    /// Balls requested.
    pub balls: u64,
    /// Drops the balls were split into.
    pub batches: u64,
    /// Ticks until every ball landed.
    pub ticks: u64,
    /// Final statistics.
    pub stats: Stats,
    /// Expected relative standard error at the final count.
    pub expected_error: f64,
    /// Retained convergence history, oldest first.
    pub history: Vec<HistoryPoint>,
    /// Falsification criteria at the end of the run.
    pub falsification: FalsificationStatus,
    /// Commentary on the final statistics, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
}

/// Result of a reproducibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResult {
    /// Seed every run used.
    pub seed: u64,
    /// Number of runs compared.
    pub runs: usize,
    /// Final state of the first run.
    pub reference: EngineSnapshot,
    /// Whether every run matched the first.
    pub identical: bool,
    /// Whether a reset engine replayed the first run.
    pub reset_replays: bool,
}

impl VerifyResult {
    /// Whether the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.identical && self.reset_replays
    }
}

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run {
            config_path,
            balls,
            batches,
            seed_override,
            json,
            commentary,
            verbose,
        } => run_drop(&RunOptions {
            config_path,
            balls,
            batches,
            seed_override,
            json,
            commentary,
            verbose,
        }),
        Command::Verify {
            config_path,
            balls,
            runs,
        } => verify_reproducibility(config_path.as_deref(), balls, runs),
        Command::Invalid(reason) => {
            eprintln!("Error: {reason}\n");
            print_help();
            ExitCode::from(1)
        }
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

/// Load the configuration from `path`, or the embedded default.
///
/// # Errors
///
/// Returns error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>, seed_override: Option<u64>) -> PiResult<DropConfig> {
    let mut config = match path {
        Some(path) => DropConfig::load(path)?,
        None => DropConfig::embedded()?,
    };
    if let Some(seed) = seed_override {
        config.seed = seed;
    }
    Ok(config)
}

/// Drop `balls` balls in `batches` near-equal drops, ticking once after
/// each drop, then tick until every ball has landed.
///
/// # Errors
///
/// Returns error if the configuration is invalid or a drop exceeds the
/// batch limit.
pub fn simulate(config: &DropConfig, balls: u64, batches: u64) -> PiResult<DropEngine> {
    let mut engine = DropEngine::new(config)?;
    drop_in_batches(&mut engine, balls, batches)?;
    debug!(
        balls,
        batches,
        ticks = engine.clock().tick_count(),
        "simulation settled"
    );
    Ok(engine)
}

fn drop_in_batches(engine: &mut DropEngine, balls: u64, batches: u64) -> PiResult<()> {
    let batches = batches.max(1);
    let base = balls / batches;
    let extra = balls % batches;

    for batch in 0..batches {
        engine.drop_balls(base + u64::from(batch < extra))?;
        engine.tick();
    }
    let limit = engine.animator().ticks_to_land();
    engine.run_until_settled(limit);
    Ok(())
}

/// Run the simulation and assemble its report.
///
/// # Errors
///
/// Returns error if the configuration is invalid or a drop exceeds the
/// batch limit.
pub fn build_report(
    config: &DropConfig,
    balls: u64,
    batches: u64,
    commentary: bool,
) -> PiResult<RunReport> {
    let engine = simulate(config, balls, batches)?;
    let stats = *engine.stats();
    let history = engine.history().iter().copied().collect();
    let ticks = engine.clock().tick_count();
    let seed = engine.seed();
    let falsification = BallDropDemo::from_engine(engine).get_falsification_status();

    let commentary = commentary.then(|| {
        let mut settings = config.commentary.clone();
        settings.enabled = true;
        Commentator::from_config(&settings).spawn(stats).wait()
    });

    Ok(RunReport {
        seed,
        balls,
        batches: batches.max(1),
        ticks,
        stats,
        expected_error: expected_relative_error(stats.total_in_circle),
        history,
        falsification,
        commentary,
    })
}

/// Run the `run` command.
#[must_use]
pub fn run_drop(options: &RunOptions) -> ExitCode {
    let report = load_config(options.config_path.as_deref(), options.seed_override).and_then(
        |config| build_report(&config, options.balls, options.batches, options.commentary),
    );

    match report {
        Ok(report) => {
            if options.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_run_report(&report, options.verbose);
            }
            if report.falsification.verified {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            print_error(&e);
            ExitCode::from(1)
        }
    }
}

/// Run the same configuration `runs` times and compare final states.
///
/// Also resets the first engine and runs it again, which must replay the
/// same sequence.
///
/// # Errors
///
/// Returns error if the configuration is invalid or a drop exceeds the
/// batch limit.
pub fn check_reproducibility(
    config: &DropConfig,
    balls: u64,
    runs: usize,
) -> PiResult<VerifyResult> {
    let mut first = simulate(config, balls, DEFAULT_BATCHES)?;
    let reference = first.snapshot();

    let mut identical = true;
    for run in 1..runs {
        let snapshot = simulate(config, balls, DEFAULT_BATCHES)?.snapshot();
        if snapshot != reference {
            debug!(run, "run diverged from reference");
            identical = false;
        }
    }

    first.reset();
    drop_in_batches(&mut first, balls, DEFAULT_BATCHES)?;
    let reset_replays = first.snapshot() == reference;

    Ok(VerifyResult {
        seed: config.seed,
        runs,
        reference,
        identical,
        reset_replays,
    })
}

/// Run the `verify` command.
#[must_use]
pub fn verify_reproducibility(path: Option<&Path>, balls: u64, runs: usize) -> ExitCode {
    let result =
        load_config(path, None).and_then(|config| check_reproducibility(&config, balls, runs));

    match result {
        Ok(result) => {
            print_verify_result(&result);
            if result.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            print_error(&e);
            ExitCode::from(1)
        }
    }
}
