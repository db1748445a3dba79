//! Equation-driven demos.
//!
//! A demo couples a running simulation with the equation it is meant to
//! reproduce, and reports falsification criteria that would fail if the
//! implementation drifted from that equation.
//!
//! # Demos
//!
//! - [`ball_drop_pi`] - π̂ = 2·n_circle/n_square with O(n^{-1/2}) relative error

pub mod ball_drop_pi;

pub use ball_drop_pi::BallDropDemo;

use serde::{Deserialize, Serialize};

/// Common trait for equation-driven demos.
pub trait EddDemo {
    /// Demo name for display.
    fn name(&self) -> &'static str;

    /// Governing equation in plain text.
    fn equation(&self) -> &'static str;

    /// Advance the demo by one step.
    fn step(&mut self, dt: f64);

    /// Check if the governing equation is currently verified.
    fn verify_equation(&self) -> bool;

    /// Get the current falsification status.
    fn get_falsification_status(&self) -> FalsificationStatus;

    /// Reset the demo to initial conditions.
    fn reset(&mut self);
}

/// Falsification status for a demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalsificationStatus {
    /// Whether every criterion passed.
    pub verified: bool,
    /// Individual criteria.
    pub criteria: Vec<CriterionStatus>,
    /// Overall message.
    pub message: String,
}

/// Status of a single falsification criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionStatus {
    /// Criterion ID (e.g., "PI-BOUND").
    pub id: String,
    /// Criterion name.
    pub name: String,
    /// Whether it passed.
    pub passed: bool,
    /// Current value.
    pub value: f64,
    /// Threshold for passing.
    pub threshold: f64,
}
