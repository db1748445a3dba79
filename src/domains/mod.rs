//! Ball-drop domain logic.
//!
//! Near-pure functions over the engine state:
//! - Sampler: area-uniform landing points and batch generation
//! - Tracker: incremental π estimate and bounded convergence history
//! - Animator: fall progress and the falling→landed transition

pub mod animator;
pub mod sampler;
pub mod tracker;

pub use animator::{Animator, Landing};
pub use sampler::{BatchGenerator, DiscSampler};
pub use tracker::{
    estimate_pi, expected_relative_error, ConvergenceTracker, History, HistoryPoint, Stats,
};
