//! CLI module for pidrop.
//!
//! This module contains all CLI logic extracted from main.rs to enable
//! full test coverage. The entry point `run_cli` can be called from main.rs
//! with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command, DEFAULT_BALLS, DEFAULT_BATCHES, DEFAULT_RUNS};
pub use commands::{
    build_report, check_reproducibility, load_config, run_cli, run_drop, simulate,
    verify_reproducibility, RunOptions, RunReport, VerifyResult,
};
pub use output::{
    format_error, print_error, print_help, print_run_report, print_verify_result, print_version,
};
