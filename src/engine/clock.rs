//! Fixed-cadence tick clock.
//!
//! Counts animation ticks and converts them to elapsed simulated time.
//! The clock drives nothing by itself: the owner calls [`TickClock::tick`]
//! once per frame.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tick clock for the animation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickClock {
    /// Tick duration in milliseconds.
    tick_ms: u64,
    /// Number of ticks taken.
    tick_count: u64,
}

impl TickClock {
    /// Create a new clock with the given tick duration in milliseconds.
    ///
    /// A zero duration is raised to 1 ms.
    #[must_use]
    pub fn new(tick_ms: u64) -> Self {
        Self {
            tick_ms: tick_ms.max(1),
            tick_count: 0,
        }
    }

    /// Tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Tick duration in milliseconds.
    #[must_use]
    pub const fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Number of ticks taken.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Simulated time elapsed since the last reset.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.tick_ms.saturating_mul(self.tick_count))
    }

    /// Advance by one tick. Returns the new tick index.
    #[allow(clippy::missing_const_for_fn)]
    pub fn tick(&mut self) -> u64 {
        self.tick_count += 1;
        self.tick_count
    }

    /// Reset the tick counter.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset(&mut self) {
        self.tick_count = 0;
    }
}

impl Default for TickClock {
    fn default() -> Self {
        // ~60 FPS
        Self::new(16)
    }
}
