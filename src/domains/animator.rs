//! Fall animation.
//!
//! The animator is the only code that moves a ball from `Falling` to
//! `Landed`. Tick rate and increment change how smooth the fall looks, never
//! which balls are counted or in what totals.

use serde::{Deserialize, Serialize};

use crate::engine::state::{Ball, Disc, Point};

/// Default progress added per tick.
pub const DEFAULT_FALL_INCREMENT: f64 = 0.06;

/// Smallest accepted progress per tick. Below this, float accumulation can
/// stall short of 1 and a ball never lands.
pub const MIN_FALL_INCREMENT: f64 = 1e-3;

/// Default height of the release point above the top of the disc.
pub const DEFAULT_DROP_HEIGHT: f64 = 150.0;

/// A ball that landed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landing {
    /// Position of the ball in the collection.
    pub index: usize,
    /// Square membership of the landing point.
    pub in_square: bool,
}

/// Advances falling balls on a fixed cadence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Animator {
    increment: f64,
    drop_height: f64,
}

impl Animator {
    /// Create an animator.
    ///
    /// `increment` is clamped between [`MIN_FALL_INCREMENT`] and 1; a
    /// non-finite or non-positive increment falls back to [`DEFAULT_FALL_INCREMENT`]. A negative or
    /// non-finite drop height becomes zero.
    #[must_use]
    pub fn new(increment: f64, drop_height: f64) -> Self {
        let increment = if increment.is_finite() && increment > 0.0 {
            increment.clamp(MIN_FALL_INCREMENT, 1.0)
        } else {
            DEFAULT_FALL_INCREMENT
        };
        let drop_height = if drop_height.is_finite() {
            drop_height.max(0.0)
        } else {
            0.0
        };
        Self {
            increment,
            drop_height,
        }
    }

    /// Progress added per tick.
    #[must_use]
    pub const fn increment(&self) -> f64 {
        self.increment
    }

    /// Height of the release point above the top of the disc.
    #[must_use]
    pub const fn drop_height(&self) -> f64 {
        self.drop_height
    }

    /// Ticks a freshly dropped ball needs to land.
    #[must_use]
    pub fn ticks_to_land(&self) -> u64 {
        // Mirrors the accumulation in `Ball::advance` so float rounding agrees.
        let bound = (1.0 / self.increment).ceil() as u64 + 1;
        let mut progress = 0.0;
        for tick in 1..=bound {
            progress += self.increment;
            if progress >= 1.0 {
                return tick;
            }
        }
        bound
    }

    /// Advance every falling ball by one tick.
    ///
    /// Returns the balls that landed on this tick, in collection order.
    pub fn tick(&self, balls: &mut [Ball]) -> Vec<Landing> {
        balls
            .iter_mut()
            .enumerate()
            .filter_map(|(index, ball)| {
                ball.advance(self.increment).then(|| Landing {
                    index,
                    in_square: ball.in_square(),
                })
            })
            .collect()
    }

    /// Release point of a ball: above the disc, in line with its landing point.
    #[must_use]
    pub fn start_position(&self, disc: &Disc, ball: &Ball) -> Point {
        Point::new(ball.landing().x, disc.top().y + self.drop_height)
    }

    /// Where to draw `ball` now.
    ///
    /// Falling balls interpolate from the release point to the landing point;
    /// landed balls sit at their landing point.
    #[must_use]
    pub fn visual_position(&self, disc: &Disc, ball: &Ball) -> Point {
        if ball.is_landed() {
            return ball.landing();
        }
        self.start_position(disc, ball)
            .lerp(&ball.landing(), ball.progress())
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_FALL_INCREMENT, DEFAULT_DROP_HEIGHT)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::state::{BallId, BallStatus};

    fn disc() -> Disc {
        Disc::new(Point::ORIGIN, 300.0).unwrap()
    }

    fn ball(id: u64, landing: Point) -> Ball {
        Ball::at(&disc(), BallId::new(id), landing).unwrap()
    }

    #[test]
    fn test_new_sanitizes_parameters() {
        let a = Animator::new(2.0, -5.0);
        assert!((a.increment() - 1.0).abs() < f64::EPSILON);
        assert!(a.drop_height().abs() < f64::EPSILON);

        let b = Animator::new(f64::NAN, f64::INFINITY);
        assert!((b.increment() - DEFAULT_FALL_INCREMENT).abs() < f64::EPSILON);
        assert!(b.drop_height().abs() < f64::EPSILON);

        let c = Animator::new(-0.1, 10.0);
        assert!((c.increment() - DEFAULT_FALL_INCREMENT).abs() < f64::EPSILON);

        let d = Animator::new(1e-17, 0.0);
        assert!((d.increment() - MIN_FALL_INCREMENT).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tiny_increment_still_lands() {
        let animator = Animator::new(1e-17, 0.0);
        let ticks = animator.ticks_to_land();
        assert!(ticks <= 1_001, "ticks_to_land = {ticks}");

        let mut balls = vec![ball(0, Point::ORIGIN)];
        let mut landed = 0;
        for _ in 0..ticks {
            landed += animator.tick(&mut balls).len();
        }
        assert_eq!(landed, 1);
        assert_eq!(balls[0].status(), BallStatus::Landed);
    }

    #[test]
    fn test_ticks_to_land() {
        assert_eq!(Animator::new(0.25, 0.0).ticks_to_land(), 4);
        assert_eq!(Animator::new(1.0, 0.0).ticks_to_land(), 1);
        assert_eq!(Animator::new(0.06, 0.0).ticks_to_land(), 17);
    }

    #[test]
    fn test_tick_lands_each_ball_once() {
        let animator = Animator::new(0.25, 0.0);
        let mut balls = vec![ball(0, Point::ORIGIN), ball(1, Point::new(0.0, 250.0))];

        for _ in 0..3 {
            assert!(animator.tick(&mut balls).is_empty());
        }
        let landings = animator.tick(&mut balls);
        assert_eq!(
            landings,
            vec![
                Landing {
                    index: 0,
                    in_square: true
                },
                Landing {
                    index: 1,
                    in_square: false
                },
            ]
        );
        assert!(balls.iter().all(|b| b.status() == BallStatus::Landed));

        // Landed balls never report again.
        for _ in 0..10 {
            assert!(animator.tick(&mut balls).is_empty());
        }
    }

    #[test]
    fn test_progress_monotone_and_clamped() {
        let animator = Animator::new(0.3, 0.0);
        let mut balls = vec![ball(0, Point::ORIGIN)];
        let mut last = 0.0;
        for _ in 0..10 {
            animator.tick(&mut balls);
            let p = balls[0].progress();
            assert!(p >= last);
            assert!(p <= 1.0);
            last = p;
        }
        assert!((last - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_staggered_batches_land_separately() {
        let animator = Animator::new(0.5, 0.0);
        let mut balls = vec![ball(0, Point::ORIGIN)];
        animator.tick(&mut balls);
        balls.push(ball(1, Point::ORIGIN));

        let landings = animator.tick(&mut balls);
        assert_eq!(landings.len(), 1);
        assert_eq!(landings[0].index, 0);

        let landings = animator.tick(&mut balls);
        assert_eq!(landings.len(), 1);
        assert_eq!(landings[0].index, 1);
    }

    #[test]
    fn test_visual_position_interpolates() {
        let d = disc();
        let animator = Animator::new(0.5, 100.0);
        let mut balls = vec![ball(0, Point::new(10.0, -20.0))];

        let start = animator.visual_position(&d, &balls[0]);
        assert_eq!(start, Point::new(10.0, 400.0));

        animator.tick(&mut balls);
        let mid = animator.visual_position(&d, &balls[0]);
        assert!((mid.x - 10.0).abs() < 1e-12);
        assert!((mid.y - 190.0).abs() < 1e-12);

        animator.tick(&mut balls);
        assert_eq!(animator.visual_position(&d, &balls[0]), balls[0].landing());
    }
}
