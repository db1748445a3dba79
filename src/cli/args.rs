//! CLI argument parsing.
//!
//! Hand-rolled so that parsing is testable over any iterator of strings.

use std::path::PathBuf;

/// Balls dropped by `run` and `verify` when `--balls` is absent.
pub const DEFAULT_BALLS: u64 = 10_000;

/// Batches used by `run` when `--batches` is absent.
pub const DEFAULT_BATCHES: u64 = 10;

/// Runs compared by `verify` when `--runs` is absent.
pub const DEFAULT_RUNS: usize = 3;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop balls and report the estimate
    Run {
        /// Configuration file; the embedded default when absent.
        config_path: Option<PathBuf>,
        /// Total balls to drop.
        balls: u64,
        /// Number of equal drops the balls are split into.
        batches: u64,
        /// Optional seed override.
        seed_override: Option<u64>,
        /// Print a JSON report instead of text.
        json: bool,
        /// Ask for commentary on the final statistics.
        commentary: bool,
        /// Enable verbose output.
        verbose: bool,
    },
    /// Check that repeated runs are bitwise identical
    Verify {
        /// Configuration file; the embedded default when absent.
        config_path: Option<PathBuf>,
        /// Balls dropped per run.
        balls: u64,
        /// Number of runs to compare.
        runs: usize,
    },
    /// Arguments could not be parsed; carries the reason
    Invalid(String),
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    ///
    /// This method is testable as it accepts any iterator of strings,
    /// not just `std::env::args()`.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(&args[2..]),
            "verify" => Self::parse_verify_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            unknown => Command::Invalid(format!("unknown command: {unknown}")),
        };

        Self { command }
    }

    /// Parse the 'run' command arguments.
    fn parse_run_command(rest: &[String]) -> Command {
        let mut config_path = None;
        let mut balls = DEFAULT_BALLS;
        let mut batches = DEFAULT_BATCHES;
        let mut seed_override = None;
        let mut json = false;
        let mut commentary = false;
        let mut verbose = false;

        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--balls" => {
                    let n = match value_of(rest, i, "--balls") {
                        Ok(n) => n,
                        Err(reason) => return Command::Invalid(reason),
                    };
                    balls = n;
                    i += 2;
                }
                "--batches" => {
                    let n = match value_of::<u64>(rest, i, "--batches") {
                        Ok(n) => n,
                        Err(reason) => return Command::Invalid(reason),
                    };
                    batches = n.max(1);
                    i += 2;
                }
                "--seed" => {
                    let n = match value_of(rest, i, "--seed") {
                        Ok(n) => n,
                        Err(reason) => return Command::Invalid(reason),
                    };
                    seed_override = Some(n);
                    i += 2;
                }
                "--json" => {
                    json = true;
                    i += 1;
                }
                "--commentary" => {
                    commentary = true;
                    i += 1;
                }
                "-v" | "--verbose" => {
                    verbose = true;
                    i += 1;
                }
                flag if flag.starts_with('-') => {
                    return Command::Invalid(format!("unknown option for 'run': {flag}"));
                }
                path => {
                    if config_path.is_some() {
                        return Command::Invalid(
                            "'run' takes at most one config path".to_string(),
                        );
                    }
                    config_path = Some(PathBuf::from(path));
                    i += 1;
                }
            }
        }

        Command::Run {
            config_path,
            balls,
            batches,
            seed_override,
            json,
            commentary,
            verbose,
        }
    }

    /// Parse the 'verify' command arguments.
    fn parse_verify_command(rest: &[String]) -> Command {
        let mut config_path = None;
        let mut balls = DEFAULT_BALLS;
        let mut runs = DEFAULT_RUNS;

        let mut i = 0;
        while i < rest.len() {
            match rest[i].as_str() {
                "--balls" => {
                    let n = match value_of(rest, i, "--balls") {
                        Ok(n) => n,
                        Err(reason) => return Command::Invalid(reason),
                    };
                    balls = n;
                    i += 2;
                }
                "--runs" => {
                    let n = match value_of::<usize>(rest, i, "--runs") {
                        Ok(n) => n,
                        Err(reason) => return Command::Invalid(reason),
                    };
                    runs = n.max(2);
                    i += 2;
                }
                flag if flag.starts_with('-') => {
                    return Command::Invalid(format!("unknown option for 'verify': {flag}"));
                }
                path => {
                    if config_path.is_some() {
                        return Command::Invalid(
                            "'verify' takes at most one config path".to_string(),
                        );
                    }
                    config_path = Some(PathBuf::from(path));
                    i += 1;
                }
            }
        }

        Command::Verify {
            config_path,
            balls,
            runs,
        }
    }
}

/// Value following the flag at `rest[i]`.
fn value_of<T: std::str::FromStr>(rest: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = rest
        .get(i + 1)
        .ok_or_else(|| format!("{flag} requires a value"))?;
    raw.parse().map_err(|_| format!("invalid value for {flag}: {raw}"))
}
