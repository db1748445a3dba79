//! Ball-drop π convergence.
//!
//! # Governing Equations
//!
//! ```text
//! Estimator:        π̂ = 2 · n_circle / n_square
//! Relative error:   ε = |π̂ − π| / π
//! Standard error:   SE(ε) ≈ √((1 − 2/π) / ((2/π)·n)) ≈ 0.756/√n
//! ```
//!
//! # Criteria
//!
//! - **PI-BOUND**: `n_square ≤ n_circle`
//! - **PI-ERROR**: `ε ≤ k·SE(ε)` once balls have landed
//! - **PI-HISTORY**: history indices strictly increase and stay within capacity
//! - **PI-RECOMPUTE**: incremental statistics equal a full recompute

use super::{CriterionStatus, EddDemo, FalsificationStatus};
use crate::config::DropConfig;
use crate::domains::tracker::{expected_relative_error, Stats};
use crate::engine::DropEngine;
use crate::error::PiResult;
use tracing::warn;

/// Default number of balls dropped per demo step.
pub const DEFAULT_STEP_BATCH: u64 = 100;

/// Default error envelope in standard errors.
pub const DEFAULT_SIGMA_TOLERANCE: f64 = 4.0;

/// Ball-drop π demo: a [`DropEngine`] plus its falsification criteria.
#[derive(Debug, Clone)]
pub struct BallDropDemo {
    /// The running simulation.
    pub engine: DropEngine,
    /// Balls dropped per step.
    pub batch_size: u64,
    /// Error envelope in standard errors.
    pub sigma_tolerance: f64,
}

impl BallDropDemo {
    /// Create a demo from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid.
    pub fn new(config: &DropConfig) -> PiResult<Self> {
        Ok(Self::from_engine(DropEngine::new(config)?))
    }

    /// Wrap an existing engine.
    #[must_use]
    pub const fn from_engine(engine: DropEngine) -> Self {
        Self {
            engine,
            batch_size: DEFAULT_STEP_BATCH,
            sigma_tolerance: DEFAULT_SIGMA_TOLERANCE,
        }
    }

    /// Error threshold for the current landed count.
    #[must_use]
    pub fn error_threshold(&self) -> f64 {
        self.sigma_tolerance * expected_relative_error(self.engine.stats().total_in_circle)
    }

    fn bound_criterion(&self) -> CriterionStatus {
        let stats = self.engine.stats();
        CriterionStatus {
            id: "PI-BOUND".to_string(),
            name: "Square hits within landings".to_string(),
            passed: stats.total_in_square <= stats.total_in_circle,
            value: stats.total_in_square as f64,
            threshold: stats.total_in_circle as f64,
        }
    }

    fn error_criterion(&self) -> CriterionStatus {
        let stats = self.engine.stats();
        let threshold = self.error_threshold();
        CriterionStatus {
            id: "PI-ERROR".to_string(),
            name: "Relative error envelope".to_string(),
            passed: stats.total_in_circle > 0 && stats.error <= threshold,
            value: stats.error,
            threshold,
        }
    }

    fn history_criterion(&self) -> CriterionStatus {
        let history = self.engine.history();
        let ordered = history
            .iter()
            .zip(history.iter().skip(1))
            .all(|(a, b)| a.index < b.index);
        CriterionStatus {
            id: "PI-HISTORY".to_string(),
            name: "History ordered and bounded".to_string(),
            passed: ordered && history.len() <= history.capacity(),
            value: history.len() as f64,
            threshold: history.capacity() as f64,
        }
    }

    fn recompute_criterion(&self) -> CriterionStatus {
        let recomputed = Stats::from_balls(self.engine.balls());
        let incremental = self.engine.stats();
        let drift = (recomputed.total_in_circle.abs_diff(incremental.total_in_circle)
            + recomputed.total_in_square.abs_diff(incremental.total_in_square))
            as f64;
        CriterionStatus {
            id: "PI-RECOMPUTE".to_string(),
            name: "Incremental matches recompute".to_string(),
            passed: recomputed == *incremental,
            value: drift,
            threshold: 0.0,
        }
    }
}

impl EddDemo for BallDropDemo {
    fn name(&self) -> &'static str {
        "Ball-Drop π Convergence"
    }

    fn equation(&self) -> &'static str {
        "π̂ = 2 · n_circle / n_square"
    }

    fn step(&mut self, _dt: f64) {
        let batch = self.batch_size.min(self.engine.max_batch());
        if let Err(e) = self.engine.drop_balls(batch) {
            warn!(error = %e, batch, "demo drop rejected");
        }
        self.engine.tick();
    }

    fn verify_equation(&self) -> bool {
        self.get_falsification_status().verified
    }

    fn get_falsification_status(&self) -> FalsificationStatus {
        let criteria = vec![
            self.bound_criterion(),
            self.error_criterion(),
            self.history_criterion(),
            self.recompute_criterion(),
        ];
        let verified = criteria.iter().all(|c| c.passed);
        let stats = self.engine.stats();

        let message = if verified {
            format!(
                "π̂={:.6} from n={} (ε={:.4}%)",
                stats.estimated_pi,
                stats.total_in_circle,
                stats.error * 100.0
            )
        } else {
            let failed: Vec<&str> = criteria
                .iter()
                .filter(|c| !c.passed)
                .map(|c| c.id.as_str())
                .collect();
            format!(
                "Not verified at n={}: {}",
                stats.total_in_circle,
                failed.join(", ")
            )
        };

        FalsificationStatus {
            verified,
            criteria,
            message,
        }
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn demo() -> BallDropDemo {
        BallDropDemo::new(&DropConfig::default()).unwrap()
    }

    #[test]
    fn test_initial_not_verified() {
        let demo = demo();
        let status = demo.get_falsification_status();
        assert!(!status.verified);
        assert!(status.message.contains("PI-ERROR"));
        assert_eq!(status.criteria.len(), 4);
        assert_eq!(status.criteria[0].id, "PI-BOUND");
        assert_eq!(status.criteria[1].id, "PI-ERROR");
        assert_eq!(status.criteria[2].id, "PI-HISTORY");
        assert_eq!(status.criteria[3].id, "PI-RECOMPUTE");
    }

    #[test]
    fn test_verifies_after_many_landings() {
        let mut demo = demo();
        for _ in 0..200 {
            demo.step(0.0);
        }
        demo.engine.run_until_settled(1_000);

        assert_eq!(demo.engine.stats().total_in_circle, 20_000);
        let status = demo.get_falsification_status();
        assert!(status.verified, "{}", status.message);
        assert!(demo.verify_equation());
    }

    #[test]
    fn test_tight_envelope_is_falsified() {
        let mut demo = demo();
        demo.sigma_tolerance = 1e-9;
        for _ in 0..50 {
            demo.step(0.0);
        }
        demo.engine.run_until_settled(1_000);

        let status = demo.get_falsification_status();
        assert!(!status.criteria[1].passed);
        assert!(!status.verified);
    }

    #[test]
    fn test_step_clamps_to_engine_limit() {
        let config = DropConfig::builder().max_batch(7).build();
        let mut demo = BallDropDemo::new(&config).unwrap();
        demo.step(0.0);
        assert_eq!(demo.engine.balls().len(), 7);
    }

    #[test]
    fn test_reset() {
        let mut demo = demo();
        demo.step(0.0);
        assert!(!demo.engine.balls().is_empty());

        demo.reset();
        assert!(demo.engine.balls().is_empty());
        assert_eq!(*demo.engine.stats(), Stats::ZERO);
    }

    #[test]
    fn test_demo_trait_metadata() {
        let demo = demo();
        assert_eq!(demo.name(), "Ball-Drop π Convergence");
        assert!(demo.equation().contains("n_square"));
    }
}
