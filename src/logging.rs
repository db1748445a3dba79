//! Tracing subscriber setup for the binaries.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to each binary. Filtering follows `RUST_LOG`, defaulting to `warn`.

use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::error::PiResult;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "pidrop=debug" } else { DEFAULT_FILTER })
    })
}

/// Log to stderr. `verbose` raises the default level to `debug` for this crate.
///
/// A second call is a no-op.
pub fn init_stderr(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log to a file, for interfaces that own the terminal.
///
/// # Errors
///
/// Returns error if the file cannot be created.
pub fn init_file(path: &Path) -> PiResult<()> {
    let file = std::fs::File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(false))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_stderr_twice_is_noop() {
        init_stderr(false);
        init_stderr(true);
        tracing::warn!("logging smoke test");
    }

    #[test]
    fn test_init_file_bad_path() {
        let result = init_file(Path::new("/nonexistent-dir/pidrop.log"));
        assert!(result.is_err());
    }
}
