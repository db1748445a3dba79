//! Error types for pidrop.
//!
//! Every boundary check returns `Result<T, PiError>` instead of panicking.
//! A rejected operation never leaves a partial state change behind.

use thiserror::Error;

/// Result type alias for pidrop operations.
pub type PiResult<T> = Result<T, PiError>;

/// Unified error type for pidrop operations.
///
/// Commentary failures are not represented here: they are recovered locally
/// and replaced by a fallback string (see [`crate::commentary`]).
#[derive(Debug, Error)]
pub enum PiError {
    // ===== Input Errors =====
    /// Disc radius is zero, negative, or not finite.
    #[error("Invalid radius {radius}: radius must be positive and finite")]
    InvalidRadius {
        /// The rejected radius.
        radius: f64,
    },

    /// A non-finite value reached a boundary that requires finite input.
    #[error("Non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    /// Explicit landing point lies outside the disc.
    #[error("Point ({x}, {y}) lies outside the disc")]
    PointOutsideDisc {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// Drop count exceeds the configured batch limit.
    #[error("Invalid drop count {count}: at most {max} balls per drop")]
    InvalidDropCount {
        /// Requested count.
        count: u64,
        /// Configured maximum batch.
        max: u64,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PiError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a non-finite value error for the given location.
    #[must_use]
    pub fn non_finite(location: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            location: location.into(),
        }
    }

    /// Check if this error was caused by caller input rather than configuration or I/O.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRadius { .. }
                | Self::NonFiniteValue { .. }
                | Self::PointOutsideDisc { .. }
                | Self::InvalidDropCount { .. }
        )
    }
}

impl From<serde_json::Error> for PiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
