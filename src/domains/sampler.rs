//! Area-uniform disc sampling.
//!
//! # Governing Equations
//!
//! ```text
//! θ ~ U[0, 2π)      u ~ U[0, 1)
//! r = R·√u                      (inverse CDF of the radial density 2r/R²)
//! p = C + (r·cos θ, r·sin θ)
//! ```
//!
//! Drawing `r ~ U[0, R)` directly would put half of all samples inside
//! radius R/2, which covers only a quarter of the area.

use crate::engine::rng::SimRng;
use crate::engine::state::{Ball, BallId, Disc, Point};

/// Samples landing points uniformly over a disc's area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscSampler {
    disc: Disc,
}

impl DiscSampler {
    /// Create a sampler for `disc`.
    #[must_use]
    pub const fn new(disc: Disc) -> Self {
        Self { disc }
    }

    /// The disc being sampled.
    #[must_use]
    pub const fn disc(&self) -> &Disc {
        &self.disc
    }

    /// Draw one area-uniform point inside the disc.
    pub fn sample_point(&self, rng: &mut SimRng) -> Point {
        let theta = rng.gen_angle();
        let u = rng.gen_f64();
        let r = self.disc.radius() * u.sqrt();
        let center = self.disc.center();
        Point::new(center.x + r * theta.cos(), center.y + r * theta.sin())
    }

    /// Draw one falling ball with a fresh landing point and its square membership.
    pub fn sample(&self, id: BallId, rng: &mut SimRng) -> Ball {
        let landing = self.sample_point(rng);
        Ball::falling(id, landing, self.disc.in_square(&landing))
    }
}

/// Appends batches of independently sampled balls to a collection.
///
/// Owns the identity counter, so ids keep increasing across batches until
/// [`BatchGenerator::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchGenerator {
    next_id: u64,
}

impl BatchGenerator {
    /// Create a generator whose first ball gets id 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Allocate the next ball identity.
    pub fn allocate_id(&mut self) -> BallId {
        let id = BallId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Number of identities handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next_id
    }

    /// Sample `count` balls and append them to `balls` in insertion order.
    ///
    /// `count = 0` leaves `balls` untouched. Returns the number appended.
    pub fn generate(
        &mut self,
        sampler: &DiscSampler,
        rng: &mut SimRng,
        count: u64,
        balls: &mut Vec<Ball>,
    ) -> usize {
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        balls.reserve(count);
        for _ in 0..count {
            let id = self.allocate_id();
            balls.push(sampler.sample(id, rng));
        }
        count
    }

    /// Restart identities from zero.
    #[allow(clippy::missing_const_for_fn)]
    pub fn reset(&mut self) {
        self.next_id = 0;
    }
}
