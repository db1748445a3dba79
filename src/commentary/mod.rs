//! Natural-language commentary on the running estimate.
//!
//! The commentary call is the only blocking I/O in the system. It runs on a
//! worker thread with a timeout, never touches simulation state, and every
//! failure resolves to the configured fallback string.
//!
//! ```text
//! Stats ──► CommentarySource::commentary ──► Ok(text)  ──► text
//!                                         └► Err(e)    ──► warn!, fallback
//! ```

mod gemini;

pub use gemini::GeminiCommentary;

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::CommentaryConfig;
use crate::domains::tracker::Stats;

/// Why a commentary request produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentaryError {
    /// Commentary is switched off in configuration.
    #[error("commentary disabled")]
    Disabled,
    /// The API key environment variable is unset or empty.
    #[error("API key variable '{var}' is not set")]
    MissingApiKey {
        /// Environment variable name.
        var: String,
    },
    /// Connection, DNS, TLS or I/O failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx response (auth, quota, server errors).
    #[error("service returned HTTP {code}")]
    Status {
        /// HTTP status code.
        code: u16,
    },
    /// Response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Response parsed but contained no text.
    #[error("response contained no text")]
    EmptyText,
    /// No answer before the deadline.
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    /// Worker thread ended without answering.
    #[error("commentary worker stopped")]
    WorkerStopped,
}

/// Something that can turn statistics into a sentence.
pub trait CommentarySource: Send + Sync {
    /// Produce commentary for `stats`.
    ///
    /// # Errors
    ///
    /// Returns error on any failure; callers substitute the fallback.
    fn commentary(&self, stats: &Stats) -> Result<String, CommentaryError>;
}

/// Source used when commentary is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCommentary;

impl CommentarySource for DisabledCommentary {
    fn commentary(&self, _stats: &Stats) -> Result<String, CommentaryError> {
        Err(CommentaryError::Disabled)
    }
}

/// Prompt sent to the text-generation service.
#[must_use]
pub fn prompt_for(stats: &Stats) -> String {
    format!(
        "A Monte Carlo demo drops balls uniformly into a circle. Because the inscribed \
         square covers 2/π of the circle, π ≈ 2 × (balls in circle) / (balls in square). \
         So far {} balls have landed, {} of them inside the square, giving an estimate of \
         {:.6} with a relative error of {:.4}%. In one or two short, upbeat sentences, \
         comment on how the estimate is converging.",
        stats.total_in_circle,
        stats.total_in_square,
        stats.estimated_pi,
        stats.error * 100.0
    )
}

/// Runs commentary requests and guarantees a string comes back.
#[derive(Clone)]
pub struct Commentator {
    source: Arc<dyn CommentarySource>,
    fallback: String,
    timeout: Duration,
}

impl std::fmt::Debug for Commentator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commentator")
            .field("fallback", &self.fallback)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Commentator {
    /// Create a commentator over any source.
    #[must_use]
    pub fn new(
        source: Arc<dyn CommentarySource>,
        fallback: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            fallback: fallback.into(),
            timeout,
        }
    }

    /// Build from configuration: the HTTP source when enabled, otherwise a
    /// source that always falls back.
    #[must_use]
    pub fn from_config(config: &CommentaryConfig) -> Self {
        let source: Arc<dyn CommentarySource> = if config.enabled {
            Arc::new(GeminiCommentary::from_config(config))
        } else {
            Arc::new(DisabledCommentary)
        };
        Self::new(
            source,
            config.fallback.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Fallback text.
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Call the source on this thread.
    #[must_use]
    pub fn fetch(&self, stats: &Stats) -> String {
        resolve(self.source.commentary(stats), &self.fallback)
    }

    /// Start a request on a worker thread.
    #[must_use]
    pub fn spawn(&self, stats: Stats) -> CommentaryTask {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let spawned = std::thread::Builder::new()
            .name("pidrop-commentary".to_string())
            .spawn(move || {
                // Receiver may be gone after a reset; nothing to do then.
                let _ = tx.send(source.commentary(&stats));
            });
        if let Err(e) = spawned {
            warn!(error = %e, "could not start commentary worker");
        }
        CommentaryTask {
            rx,
            deadline: Instant::now() + self.timeout,
            timeout: self.timeout,
            fallback: self.fallback.clone(),
        }
    }
}

/// A commentary request in flight.
///
/// Dropping the task abandons the request; the worker finishes on its own.
#[derive(Debug)]
pub struct CommentaryTask {
    rx: Receiver<Result<String, CommentaryError>>,
    deadline: Instant,
    timeout: Duration,
    fallback: String,
}

impl CommentaryTask {
    /// Check for a result without blocking.
    ///
    /// Returns `Some` exactly when the request is finished: with the text, or
    /// with the fallback after a failure or the deadline.
    #[must_use]
    pub fn poll(&self) -> Option<String> {
        match self.rx.try_recv() {
            Ok(result) => Some(resolve(result, &self.fallback)),
            Err(TryRecvError::Disconnected) => Some(resolve(
                Err(CommentaryError::WorkerStopped),
                &self.fallback,
            )),
            Err(TryRecvError::Empty) if Instant::now() >= self.deadline => Some(resolve(
                Err(CommentaryError::Timeout(self.timeout)),
                &self.fallback,
            )),
            Err(TryRecvError::Empty) => None,
        }
    }

    /// Block until the result arrives or the deadline passes.
    #[must_use]
    pub fn wait(self) -> String {
        let remaining = self.deadline.saturating_duration_since(Instant::now());
        let result = match self.rx.recv_timeout(remaining) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(CommentaryError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(CommentaryError::WorkerStopped),
        };
        resolve(result, &self.fallback)
    }
}

fn resolve(result: Result<String, CommentaryError>, fallback: &str) -> String {
    match result {
        Ok(text) => {
            info!(chars = text.len(), "commentary received");
            text
        }
        Err(CommentaryError::Disabled) => fallback.to_string(),
        Err(e) => {
            warn!(error = %e, "commentary unavailable, using fallback");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const FALLBACK: &str = "fallback text";

    struct Fixed(Result<String, CommentaryError>);

    impl CommentarySource for Fixed {
        fn commentary(&self, _stats: &Stats) -> Result<String, CommentaryError> {
            self.0.clone()
        }
    }

    struct Slow(Duration);

    impl CommentarySource for Slow {
        fn commentary(&self, _stats: &Stats) -> Result<String, CommentaryError> {
            std::thread::sleep(self.0);
            Ok("late".to_string())
        }
    }

    struct Recording(Mutex<Vec<u64>>);

    impl CommentarySource for Recording {
        fn commentary(&self, stats: &Stats) -> Result<String, CommentaryError> {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(stats.total_in_circle);
            }
            Ok(format!("seen {}", stats.total_in_circle))
        }
    }

    struct Panicking;

    impl CommentarySource for Panicking {
        #[allow(clippy::panic)]
        fn commentary(&self, _stats: &Stats) -> Result<String, CommentaryError> {
            panic!("source exploded");
        }
    }

    fn commentator(source: impl CommentarySource + 'static, timeout_ms: u64) -> Commentator {
        Commentator::new(Arc::new(source), FALLBACK, Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_fetch_success() {
        let c = commentator(Fixed(Ok("Nice convergence!".to_string())), 1_000);
        assert_eq!(c.fetch(&Stats::ZERO), "Nice convergence!");
    }

    #[test]
    fn test_fetch_every_failure_falls_back() {
        let failures = [
            CommentaryError::Disabled,
            CommentaryError::MissingApiKey {
                var: "KEY".to_string(),
            },
            CommentaryError::Transport("dns".to_string()),
            CommentaryError::Status { code: 401 },
            CommentaryError::Status { code: 429 },
            CommentaryError::Malformed("not json".to_string()),
            CommentaryError::EmptyText,
        ];
        for failure in failures {
            let c = commentator(Fixed(Err(failure.clone())), 1_000);
            assert_eq!(c.fetch(&Stats::ZERO), FALLBACK, "{failure}");
        }
    }

    #[test]
    fn test_spawn_wait_success() {
        let c = commentator(Fixed(Ok("async text".to_string())), 2_000);
        assert_eq!(c.spawn(Stats::ZERO).wait(), "async text");
    }

    #[test]
    fn test_spawn_passes_stats() {
        let source = Arc::new(Recording(Mutex::new(Vec::new())));
        let c = Commentator::new(source.clone(), FALLBACK, Duration::from_secs(2));
        let text = c.spawn(Stats::from_counts(10, 7)).wait();

        assert_eq!(text, "seen 10");
        assert_eq!(*source.0.lock().unwrap_or_else(|e| e.into_inner()), vec![10]);
    }

    #[test]
    fn test_spawn_timeout_falls_back() {
        let c = commentator(Slow(Duration::from_millis(500)), 20);
        assert_eq!(c.spawn(Stats::ZERO).wait(), FALLBACK);
    }

    #[test]
    fn test_poll_pending_then_timeout() {
        let c = commentator(Slow(Duration::from_millis(500)), 30);
        let task = c.spawn(Stats::ZERO);
        assert_eq!(task.poll(), None);

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(task.poll().as_deref(), Some(FALLBACK));
    }

    #[test]
    fn test_poll_eventually_returns_text() {
        let c = commentator(Fixed(Ok("done".to_string())), 2_000);
        let task = c.spawn(Stats::ZERO);
        let mut result = None;
        for _ in 0..200 {
            result = task.poll();
            if result.is_some() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result.as_deref(), Some("done"));
    }

    #[test]
    fn test_worker_panic_falls_back() {
        let c = commentator(Panicking, 2_000);
        assert_eq!(c.spawn(Stats::ZERO).wait(), FALLBACK);
    }

    #[test]
    fn test_from_config_disabled_falls_back() {
        let config = CommentaryConfig::default();
        let c = Commentator::from_config(&config);
        assert_eq!(c.fetch(&Stats::from_counts(5, 3)), config.fallback);
        assert_eq!(c.timeout(), Duration::from_millis(config.timeout_ms));
        assert_eq!(c.fallback(), config.fallback);
    }

    #[test]
    fn test_prompt_mentions_stats() {
        let prompt = prompt_for(&Stats::from_counts(1000, 637));
        assert!(prompt.contains("1000 balls"));
        assert!(prompt.contains("637"));
        assert!(prompt.contains("3.139"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CommentaryError::Status { code: 403 }.to_string(),
            "service returned HTTP 403"
        );
        assert!(CommentaryError::MissingApiKey {
            var: "GEMINI_API_KEY".to_string()
        }
        .to_string()
        .contains("GEMINI_API_KEY"));
    }
}
