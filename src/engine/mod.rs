//! Core simulation engine.
//!
//! One explicit, mutable simulation state owned by a single update loop:
//! - Deterministic RNG (PCG64 from a master seed)
//! - Fixed-cadence tick clock
//! - Append-only ball collection, cleared only by reset
//! - Incremental convergence tracking driven by landings

pub mod clock;
pub mod rng;
pub mod state;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use clock::TickClock;
pub use rng::SimRng;
pub use state::{Ball, BallId, BallStatus, Disc, Point};

use crate::config::DropConfig;
use crate::domains::animator::Animator;
use crate::domains::sampler::{BatchGenerator, DiscSampler};
use crate::domains::tracker::{ConvergenceTracker, History, Stats};
use crate::error::{PiError, PiResult};

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick index after advancing.
    pub tick: u64,
    /// Balls that landed during this tick.
    pub landed: usize,
    /// Balls still falling after this tick.
    pub falling: usize,
}

/// Serializable snapshot of the observable engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Master seed.
    pub seed: u64,
    /// Ticks taken since the last reset.
    pub ticks: u64,
    /// Total balls dropped since the last reset.
    pub balls: usize,
    /// Balls still falling.
    pub falling: usize,
    /// Aggregate statistics.
    pub stats: Stats,
    /// Convergence history.
    pub history: History,
}

/// Ball-drop simulation engine.
///
/// All mutation goes through [`DropEngine::drop_balls`],
/// [`DropEngine::tick`] and [`DropEngine::reset`], which the caller
/// serializes on one thread.
#[derive(Debug, Clone)]
pub struct DropEngine {
    sampler: DiscSampler,
    batches: BatchGenerator,
    animator: Animator,
    tracker: ConvergenceTracker,
    clock: TickClock,
    rng: SimRng,
    balls: Vec<Ball>,
    falling: usize,
    max_batch: u64,
}

impl DropEngine {
    /// Create a new engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration validation fails.
    pub fn new(config: &DropConfig) -> PiResult<Self> {
        config.validate_all()?;
        let disc = config.disc()?;

        Ok(Self {
            sampler: DiscSampler::new(disc),
            batches: BatchGenerator::new(),
            animator: Animator::new(
                config.animation.fall_increment,
                config.animation.drop_height,
            ),
            tracker: ConvergenceTracker::new(
                config.tracking.history_cadence,
                config.tracking.history_capacity,
            ),
            clock: TickClock::new(config.animation.tick_ms),
            rng: SimRng::new(config.seed),
            balls: Vec::new(),
            falling: 0,
            max_batch: config.limits.max_batch,
        })
    }

    /// Drop `count` new balls.
    ///
    /// `count = 0` is a no-op. Returns the number of balls added.
    ///
    /// # Errors
    ///
    /// Returns [`PiError::InvalidDropCount`] without changing anything if
    /// `count` exceeds the configured batch limit.
    pub fn drop_balls(&mut self, count: u64) -> PiResult<usize> {
        if count > self.max_batch {
            return Err(PiError::InvalidDropCount {
                count,
                max: self.max_batch,
            });
        }
        let added = self
            .batches
            .generate(&self.sampler, &mut self.rng, count, &mut self.balls);
        self.falling += added;
        if added > 0 {
            debug!(added, total = self.balls.len(), "dropped balls");
        }
        Ok(added)
    }

    /// Drop one ball that will land at `landing`.
    ///
    /// # Errors
    ///
    /// Returns error if `landing` is not finite or lies outside the disc.
    pub fn drop_ball_at(&mut self, landing: Point) -> PiResult<BallId> {
        let ball = Ball::at(self.sampler.disc(), BallId::new(self.batches.issued()), landing)?;
        let id = self.batches.allocate_id();
        debug_assert_eq!(id, ball.id());
        self.balls.push(ball);
        self.falling += 1;
        Ok(id)
    }

    /// Advance every falling ball by one tick and count the landings.
    pub fn tick(&mut self) -> TickReport {
        let tick = self.clock.tick();
        let landings = self.animator.tick(&mut self.balls);
        for landing in &landings {
            self.tracker.record_landing(landing.in_square);
        }
        self.falling -= landings.len();

        trace!(tick, landed = landings.len(), falling = self.falling, "tick");
        TickReport {
            tick,
            landed: landings.len(),
            falling: self.falling,
        }
    }

    /// Tick until no ball is falling or `max_ticks` ticks have run.
    ///
    /// Returns the number of ticks taken.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> u64 {
        let mut ticks = 0;
        while self.falling > 0 && ticks < max_ticks {
            self.tick();
            ticks += 1;
        }
        debug!(ticks, settled = self.is_settled(), "run until settled");
        ticks
    }

    /// Clear balls, statistics, history and clock; rewind the RNG to its seed.
    pub fn reset(&mut self) {
        self.balls.clear();
        self.falling = 0;
        self.tracker.reset();
        self.clock.reset();
        self.batches.reset();
        self.rng.reseed();
        debug!(seed = self.rng.master_seed(), "engine reset");
    }

    /// All balls in drop order.
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Number of balls still falling.
    #[must_use]
    pub const fn falling(&self) -> usize {
        self.falling
    }

    /// Whether every dropped ball has landed.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.falling == 0
    }

    /// Current statistics.
    #[must_use]
    pub const fn stats(&self) -> &Stats {
        self.tracker.stats()
    }

    /// Convergence history.
    #[must_use]
    pub const fn history(&self) -> &History {
        self.tracker.history()
    }

    /// The tracker.
    #[must_use]
    pub const fn tracker(&self) -> &ConvergenceTracker {
        &self.tracker
    }

    /// The disc balls land in.
    #[must_use]
    pub const fn disc(&self) -> &Disc {
        self.sampler.disc()
    }

    /// The animator.
    #[must_use]
    pub const fn animator(&self) -> &Animator {
        &self.animator
    }

    /// The tick clock.
    #[must_use]
    pub const fn clock(&self) -> &TickClock {
        &self.clock
    }

    /// Master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.master_seed()
    }

    /// Largest accepted drop.
    #[must_use]
    pub const fn max_batch(&self) -> u64 {
        self.max_batch
    }

    /// Where to draw `ball` on this frame.
    #[must_use]
    pub fn visual_position(&self, ball: &Ball) -> Point {
        self.animator.visual_position(self.sampler.disc(), ball)
    }

    /// Snapshot of the observable state.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            seed: self.seed(),
            ticks: self.clock.tick_count(),
            balls: self.balls.len(),
            falling: self.falling,
            stats: *self.stats(),
            history: self.history().clone(),
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Action {
        Drop(u64),
        Tick,
        Reset,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            3 => (0u64..40).prop_map(Action::Drop),
            6 => Just(Action::Tick),
            1 => Just(Action::Reset),
        ]
    }

    proptest! {
        /// Square hits never exceed landings, and the incremental stats always
        /// agree with a full recompute, for any interleaving of actions.
        #[test]
        fn prop_engine_invariants(
            seed in 0u64..u64::MAX,
            actions in proptest::collection::vec(action(), 0..80),
        ) {
            let config = DropConfig::builder().seed(seed).fall_increment(0.3).build();
            let mut engine = DropEngine::new(&config).unwrap();

            for action in actions {
                match action {
                    Action::Drop(n) => {
                        engine.drop_balls(n).unwrap();
                    }
                    Action::Tick => {
                        engine.tick();
                    }
                    Action::Reset => engine.reset(),
                }
                let stats = engine.stats();
                prop_assert!(stats.total_in_square <= stats.total_in_circle);
                prop_assert_eq!(*stats, Stats::from_balls(engine.balls()));
                let history = engine.history();
                prop_assert!(history.len() <= history.capacity());
            }
        }
    }
}
