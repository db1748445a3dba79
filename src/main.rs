//! pidrop CLI - Monte Carlo π from dropped balls
//!
//! Command-line interface for headless runs and reproducibility checks.

use pidrop::cli::{run_cli, Args, Command};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    let verbose = matches!(args.command, Command::Run { verbose: true, .. });
    pidrop::logging::init_stderr(verbose);
    run_cli(args)
}
