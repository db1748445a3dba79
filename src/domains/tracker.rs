//! Convergence tracking for the ball-drop π estimator.
//!
//! # Governing Equations
//!
//! ```text
//! circle area / square area = πR² / 2R² = π/2
//! π̂ = 2 · n_circle / n_square          (π̂ = 0 while n_square = 0)
//! ε = |π − π̂| / π
//! ```
//!
//! Every sample lands inside the disc, so `n_circle` is simply the number of
//! landed balls. The square-hit fraction p = 2/π gives, by the delta method,
//! a relative standard error of `√((1 − p)/(p·n))` ≈ 0.756/√n.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f64::consts::PI;

use crate::engine::state::Ball;

/// Default landed-count cadence between history points.
pub const DEFAULT_HISTORY_CADENCE: u64 = 10;

/// Default number of history points retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Estimate π from landed counts. Zero while no ball has hit the square.
#[must_use]
pub fn estimate_pi(total_in_circle: u64, total_in_square: u64) -> f64 {
    if total_in_square == 0 {
        0.0
    } else {
        2.0 * total_in_circle as f64 / total_in_square as f64
    }
}

/// Relative standard error of the estimator after `n` landings.
///
/// Returns infinity for `n = 0`.
#[must_use]
pub fn expected_relative_error(n: u64) -> f64 {
    if n == 0 {
        return f64::INFINITY;
    }
    let p = 2.0 / PI;
    ((1.0 - p) / (p * n as f64)).sqrt()
}

/// Aggregate statistics over landed balls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Number of landed balls.
    pub total_in_circle: u64,
    /// Number of landed balls inside the inscribed square.
    pub total_in_square: u64,
    /// Current π estimate (0 while no square hits).
    pub estimated_pi: f64,
    /// Relative error against π (0 while nothing has landed).
    pub error: f64,
}

impl Stats {
    /// Zero state.
    pub const ZERO: Self = Self {
        total_in_circle: 0,
        total_in_square: 0,
        estimated_pi: 0.0,
        error: 0.0,
    };

    /// Derive statistics from landed counts.
    #[must_use]
    pub fn from_counts(total_in_circle: u64, total_in_square: u64) -> Self {
        if total_in_circle == 0 {
            return Self::ZERO;
        }
        let estimated_pi = estimate_pi(total_in_circle, total_in_square);
        Self {
            total_in_circle,
            total_in_square,
            estimated_pi,
            error: (PI - estimated_pi).abs() / PI,
        }
    }

    /// Full recompute over the landed subset of `balls`.
    #[must_use]
    pub fn from_balls(balls: &[Ball]) -> Self {
        let (circle, square) = balls
            .iter()
            .filter(|b| b.is_landed())
            .fold((0u64, 0u64), |(c, s), b| (c + 1, s + u64::from(b.in_square())));
        Self::from_counts(circle, square)
    }

    /// Fraction of landed balls inside the square (0 when nothing landed).
    #[must_use]
    pub fn square_fraction(&self) -> f64 {
        if self.total_in_circle == 0 {
            0.0
        } else {
            self.total_in_square as f64 / self.total_in_circle as f64
        }
    }
}

/// One point of the convergence chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Landed count when the point was recorded.
    pub index: u64,
    /// π estimate at that count.
    pub value: f64,
}

/// Bounded FIFO of history points with strictly increasing indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl History {
    /// Create an empty history retaining at most `capacity` points.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a point, evicting the oldest once over capacity.
    ///
    /// Points whose index does not exceed the latest index are ignored.
    /// Returns whether the point was stored.
    pub fn push(&mut self, point: HistoryPoint) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.latest().is_some_and(|last| point.index <= last.index) {
            return false;
        }
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
        true
    }

    /// Most recent point.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    /// Points in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    /// Number of retained points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Maximum number of retained points.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(index, value)` pairs for chart rendering.
    #[must_use]
    pub fn chart_data(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.index as f64, p.value))
            .collect()
    }

    /// Drop all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// Incremental convergence tracker.
///
/// Fed one landing at a time, so every cadence multiple of the landed count
/// is visited even when many balls land in a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceTracker {
    stats: Stats,
    cadence: u64,
    history: History,
}

impl ConvergenceTracker {
    /// Create a tracker.
    ///
    /// A `cadence` of zero is treated as one.
    #[must_use]
    pub fn new(cadence: u64, capacity: usize) -> Self {
        Self {
            stats: Stats::ZERO,
            cadence: cadence.max(1),
            history: History::new(capacity),
        }
    }

    /// Current statistics.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Convergence history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Landed-count cadence between history points.
    #[must_use]
    pub const fn cadence(&self) -> u64 {
        self.cadence
    }

    /// Record one ball that just landed.
    ///
    /// Returns the history point recorded for this landing, if any.
    pub fn record_landing(&mut self, in_square: bool) -> Option<HistoryPoint> {
        let circle = self.stats.total_in_circle + 1;
        let square = self.stats.total_in_square + u64::from(in_square);
        self.stats = Stats::from_counts(circle, square);

        if circle == 1 || circle % self.cadence == 0 {
            let point = HistoryPoint {
                index: circle,
                value: self.stats.estimated_pi,
            };
            if self.history.push(point) {
                return Some(point);
            }
        }
        None
    }

    /// Record a sequence of landings in order. Returns the number recorded.
    pub fn record_landings<I>(&mut self, landings: I) -> usize
    where
        I: IntoIterator<Item = bool>,
    {
        let mut recorded = 0;
        for in_square in landings {
            self.record_landing(in_square);
            recorded += 1;
        }
        recorded
    }

    /// Return to the zero state, keeping cadence and capacity.
    pub fn reset(&mut self) {
        self.stats = Stats::ZERO;
        self.history.clear();
    }
}

impl Default for ConvergenceTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CADENCE, DEFAULT_HISTORY_CAPACITY)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Square hits never exceed landings; history stays unique, ordered and bounded.
        #[test]
        fn prop_tracker_invariants(
            landings in proptest::collection::vec(any::<bool>(), 0..2000),
            cadence in 1u64..50,
            capacity in 1usize..64,
        ) {
            let mut tracker = ConvergenceTracker::new(cadence, capacity);
            for in_square in landings {
                tracker.record_landing(in_square);
                let stats = tracker.stats();
                prop_assert!(stats.total_in_square <= stats.total_in_circle);
                prop_assert!(tracker.history().len() <= capacity);
            }
            let indices: Vec<u64> = tracker.history().iter().map(|p| p.index).collect();
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
