//! Configuration system with YAML schema and validation.
//!
//! Mistake-proofing happens in three layers:
//! - Type-safe configuration structs with `deny_unknown_fields`
//! - Declarative range rules via `validator`
//! - Semantic checks that need more than one field or a strict bound

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::domains::animator::{DEFAULT_DROP_HEIGHT, DEFAULT_FALL_INCREMENT, MIN_FALL_INCREMENT};
use crate::domains::tracker::{DEFAULT_HISTORY_CADENCE, DEFAULT_HISTORY_CAPACITY};
use crate::engine::state::{Disc, Point};
use crate::error::{PiError, PiResult};

/// Embedded default configuration.
pub const DEFAULT_CONFIG_YAML: &str = include_str!("../../experiments/ball_drop.yaml");

/// Fallback commentary shown whenever the text service cannot answer.
pub const DEFAULT_FALLBACK_COMMENTARY: &str =
    "Every ball is a tiny vote for π: keep dropping and watch the estimate settle.";

/// Default text-generation endpoint; `{model}` is substituted at call time.
pub const DEFAULT_COMMENTARY_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

/// Top-level ball-drop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DropConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Master seed for the sampling RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Disc geometry.
    #[validate(nested)]
    #[serde(default)]
    pub disc: DiscConfig,

    /// Fall animation.
    #[validate(nested)]
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Convergence history.
    #[validate(nested)]
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Input limits.
    #[validate(nested)]
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Optional commentary service.
    #[validate(nested)]
    #[serde(default)]
    pub commentary: CommentaryConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

const fn default_seed() -> u64 {
    42
}

impl DropConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> PiResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> PiResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate_all()?;
        Ok(config)
    }

    /// The embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the embedded YAML is invalid.
    pub fn embedded() -> PiResult<Self> {
        Self::from_yaml(DEFAULT_CONFIG_YAML)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> DropConfigBuilder {
        DropConfigBuilder::default()
    }

    /// Run declarative and semantic validation.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate_all(&self) -> PiResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Validate constraints the derive rules cannot express.
    fn validate_semantic(&self) -> PiResult<()> {
        if !self.disc.radius.is_finite() || self.disc.radius <= 0.0 {
            return Err(PiError::InvalidRadius {
                radius: self.disc.radius,
            });
        }
        if !self.disc.center_x.is_finite() || !self.disc.center_y.is_finite() {
            return Err(PiError::non_finite("disc.center"));
        }

        let inc = self.animation.fall_increment;
        if !inc.is_finite() || !(MIN_FALL_INCREMENT..=1.0).contains(&inc) {
            return Err(PiError::config(format!(
                "animation.fall_increment must lie in [{MIN_FALL_INCREMENT}, 1], got {inc}"
            )));
        }
        if !self.animation.drop_height.is_finite() {
            return Err(PiError::non_finite("animation.drop_height"));
        }

        if self.commentary.enabled && !self.commentary.endpoint.starts_with("http") {
            return Err(PiError::config(format!(
                "commentary.endpoint must be an http(s) URL, got '{}'",
                self.commentary.endpoint
            )));
        }

        Ok(())
    }

    /// Build the disc described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the radius or center is invalid.
    pub fn disc(&self) -> PiResult<Disc> {
        Disc::new(
            Point::new(self.disc.center_x, self.disc.center_y),
            self.disc.radius,
        )
    }
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            seed: default_seed(),
            disc: DiscConfig::default(),
            animation: AnimationConfig::default(),
            tracking: TrackingConfig::default(),
            limits: LimitsConfig::default(),
            commentary: CommentaryConfig::default(),
        }
    }
}

/// Builder for [`DropConfig`].
#[derive(Debug, Default)]
pub struct DropConfigBuilder {
    seed: Option<u64>,
    radius: Option<f64>,
    fall_increment: Option<f64>,
    history_cadence: Option<u64>,
    history_capacity: Option<usize>,
    max_batch: Option<u64>,
    commentary: Option<CommentaryConfig>,
}

impl DropConfigBuilder {
    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the disc radius.
    #[must_use]
    pub const fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set the progress added per tick.
    #[must_use]
    pub const fn fall_increment(mut self, increment: f64) -> Self {
        self.fall_increment = Some(increment);
        self
    }

    /// Set the landed-count cadence between history points.
    #[must_use]
    pub const fn history_cadence(mut self, cadence: u64) -> Self {
        self.history_cadence = Some(cadence);
        self
    }

    /// Set the number of retained history points.
    #[must_use]
    pub const fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Set the largest accepted drop.
    #[must_use]
    pub const fn max_batch(mut self, max: u64) -> Self {
        self.max_batch = Some(max);
        self
    }

    /// Set the commentary configuration.
    #[must_use]
    pub fn commentary(mut self, commentary: CommentaryConfig) -> Self {
        self.commentary = Some(commentary);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> DropConfig {
        let mut config = DropConfig::default();

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(radius) = self.radius {
            config.disc.radius = radius;
        }
        if let Some(increment) = self.fall_increment {
            config.animation.fall_increment = increment;
        }
        if let Some(cadence) = self.history_cadence {
            config.tracking.history_cadence = cadence;
        }
        if let Some(capacity) = self.history_capacity {
            config.tracking.history_capacity = capacity;
        }
        if let Some(max) = self.max_batch {
            config.limits.max_batch = max;
        }
        if let Some(commentary) = self.commentary {
            config.commentary = commentary;
        }

        config
    }
}

/// Disc geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DiscConfig {
    /// Circle radius in drawing units.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Center x coordinate.
    #[serde(default)]
    pub center_x: f64,
    /// Center y coordinate.
    #[serde(default)]
    pub center_y: f64,
}

const fn default_radius() -> f64 {
    300.0
}

impl Default for DiscConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            center_x: 0.0,
            center_y: 0.0,
        }
    }
}

/// Fall animation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    /// Progress added per tick, in (0, 1].
    #[serde(default = "default_fall_increment")]
    pub fall_increment: f64,
    /// Tick duration in milliseconds.
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Release height above the top of the disc.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_drop_height")]
    pub drop_height: f64,
}

const fn default_fall_increment() -> f64 {
    DEFAULT_FALL_INCREMENT
}

const fn default_tick_ms() -> u64 {
    16
}

const fn default_drop_height() -> f64 {
    DEFAULT_DROP_HEIGHT
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fall_increment: default_fall_increment(),
            tick_ms: default_tick_ms(),
            drop_height: default_drop_height(),
        }
    }
}

/// Convergence history parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TrackingConfig {
    /// Record a history point every `history_cadence` landings.
    #[validate(range(min = 1))]
    #[serde(default = "default_history_cadence")]
    pub history_cadence: u64,
    /// Maximum retained history points.
    #[validate(range(min = 1))]
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

const fn default_history_cadence() -> u64 {
    DEFAULT_HISTORY_CADENCE
}

const fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            history_cadence: default_history_cadence(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// Input limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Largest number of balls a single drop may add.
    #[validate(range(min = 1))]
    #[serde(default = "default_max_batch")]
    pub max_batch: u64,
}

const fn default_max_batch() -> u64 {
    100_000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_batch: default_max_batch(),
        }
    }
}

/// Commentary service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CommentaryConfig {
    /// Whether commentary may be requested at all.
    #[serde(default)]
    pub enabled: bool,
    /// Endpoint URL; `{model}` is replaced by `model`.
    #[validate(length(min = 1))]
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model name.
    #[validate(length(min = 1))]
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[validate(length(min = 1))]
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds.
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Text shown when the service cannot answer.
    #[validate(length(min = 1))]
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_endpoint() -> String {
    DEFAULT_COMMENTARY_ENDPOINT.to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

const fn default_timeout_ms() -> u64 {
    8_000
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK_COMMENTARY.to_string()
}

impl CommentaryConfig {
    /// Endpoint with the model substituted.
    #[must_use]
    pub fn resolved_endpoint(&self) -> String {
        self.endpoint.replace("{model}", &self.model)
    }
}

impl Default for CommentaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout_ms(),
            fallback: default_fallback(),
        }
    }
}
