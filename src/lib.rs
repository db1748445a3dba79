//! # pidrop
//!
//! Reproducible Monte Carlo estimate of π by dropping balls into a disc.
//!
//! Balls land uniformly over the disc's area. The inscribed square covers a
//! `2/π` share of that area, so `π ≈ 2 · n_circle / n_square`.
//!
//! - Deterministic: one master seed drives every sample
//! - Incremental: statistics update once per landing, history at a fixed cadence
//! - Falsifiable: the estimate is checked against its expected standard error
//!
//! ## Example
//!
//! ```rust
//! use pidrop::prelude::*;
//!
//! let config = DropConfig::builder().seed(7).build();
//! let mut engine = DropEngine::new(&config)?;
//! engine.drop_balls(1_000)?;
//! engine.run_until_settled(100);
//!
//! let stats = engine.stats();
//! assert_eq!(stats.total_in_circle, 1_000);
//! assert!(stats.total_in_square <= stats.total_in_circle);
//! # Ok::<(), pidrop::PiError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
)]

pub mod cli;
pub mod commentary;
pub mod config;
pub mod demos;
pub mod domains;
pub mod engine;
pub mod error;
pub mod logging;
pub mod tui;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::commentary::{Commentator, CommentarySource, CommentaryTask};
    pub use crate::config::{DropConfig, DropConfigBuilder};
    pub use crate::domains::tracker::{ConvergenceTracker, History, HistoryPoint, Stats};
    pub use crate::engine::rng::SimRng;
    pub use crate::engine::{Ball, BallId, BallStatus, Disc, DropEngine, Point, TickReport};
    pub use crate::error::{PiError, PiResult};
}

/// Re-export for public API
pub use error::{PiError, PiResult};
