//! Simulation state types.
//!
//! - Points in the drawing plane
//! - The disc balls are sampled from, and its inscribed square
//! - Balls with immutable landing data and mutable fall progress

use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;

use crate::error::{PiError, PiResult};

/// 2D point in the drawing plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Check if both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Circle region balls land in, with its axis-aligned inscribed square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    center: Point,
    radius: f64,
}

impl Disc {
    /// Create a disc.
    ///
    /// # Errors
    ///
    /// Returns error if the radius is not strictly positive and finite, or
    /// the center is not finite.
    pub fn new(center: Point, radius: f64) -> PiResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PiError::InvalidRadius { radius });
        }
        if !center.is_finite() {
            return Err(PiError::non_finite("disc.center"));
        }
        Ok(Self { center, radius })
    }

    /// Disc center.
    #[must_use]
    pub const fn center(&self) -> Point {
        self.center
    }

    /// Disc radius.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Half the side length of the inscribed square (R/√2).
    #[must_use]
    pub fn square_half_side(&self) -> f64 {
        self.radius / SQRT_2
    }

    /// Area of the disc (πR²).
    #[must_use]
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.radius * self.radius
    }

    /// Area of the inscribed square (2R²).
    #[must_use]
    pub fn square_area(&self) -> f64 {
        2.0 * self.radius * self.radius
    }

    /// Whether `point` lies inside the disc (boundary inclusive).
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        self.center.distance(point) <= self.radius
    }

    /// Whether `point` lies inside the inscribed square (boundary inclusive).
    #[must_use]
    pub fn in_square(&self, point: &Point) -> bool {
        let half = self.square_half_side();
        (point.x - self.center.x).abs() <= half && (point.y - self.center.y).abs() <= half
    }

    /// Highest point of the circle.
    #[must_use]
    pub fn top(&self) -> Point {
        Point::new(self.center.x, self.center.y + self.radius)
    }
}

/// Opaque ball identity, unique within one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BallId(u64);

impl BallId {
    /// Create an identity from a raw token.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ball-{}", self.0)
    }
}

/// Ball animation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallStatus {
    /// Still falling; not counted in statistics.
    #[default]
    Falling,
    /// Terminal state; counted in statistics.
    Landed,
}

/// A dropped ball.
///
/// Landing point and square membership are fixed at creation. Only the
/// animator mutates progress and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    id: BallId,
    landing: Point,
    in_square: bool,
    progress: f64,
    status: BallStatus,
}

impl Ball {
    /// Create a falling ball at `landing`, classifying it against `disc`.
    ///
    /// # Errors
    ///
    /// Returns error if `landing` is not finite or lies outside the disc.
    pub fn at(disc: &Disc, id: BallId, landing: Point) -> PiResult<Self> {
        if !landing.is_finite() {
            return Err(PiError::non_finite("ball.landing"));
        }
        if !disc.contains(&landing) {
            return Err(PiError::PointOutsideDisc {
                x: landing.x,
                y: landing.y,
            });
        }
        Ok(Self::falling(id, landing, disc.in_square(&landing)))
    }

    /// Internal constructor for points already known to be inside the disc.
    pub(crate) const fn falling(id: BallId, landing: Point, in_square: bool) -> Self {
        Self {
            id,
            landing,
            in_square,
            progress: 0.0,
            status: BallStatus::Falling,
        }
    }

    /// Ball identity.
    #[must_use]
    pub const fn id(&self) -> BallId {
        self.id
    }

    /// Landing coordinates.
    #[must_use]
    pub const fn landing(&self) -> Point {
        self.landing
    }

    /// Whether the landing point is inside the inscribed square.
    #[must_use]
    pub const fn in_square(&self) -> bool {
        self.in_square
    }

    /// Fall progress in [0, 1].
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Animation status.
    #[must_use]
    pub const fn status(&self) -> BallStatus {
        self.status
    }

    /// Whether the ball has landed.
    #[must_use]
    pub fn is_landed(&self) -> bool {
        self.status == BallStatus::Landed
    }

    /// Advance fall progress by `increment`.
    ///
    /// Returns `true` only on the tick the ball lands. Landed balls are left
    /// untouched.
    pub(crate) fn advance(&mut self, increment: f64) -> bool {
        if self.status == BallStatus::Landed {
            return false;
        }
        let next = self.progress + increment;
        if next >= 1.0 {
            self.progress = 1.0;
            self.status = BallStatus::Landed;
            true
        } else {
            self.progress = next;
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn disc() -> Disc {
        Disc::new(Point::ORIGIN, 300.0).unwrap()
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_lerp() {
        let a = Point::new(0.0, 10.0);
        let b = Point::new(4.0, 0.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 2.0).abs() < 1e-12);
        assert!((mid.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_disc_rejects_bad_radius() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = Disc::new(Point::ORIGIN, radius);
            assert!(
                matches!(result, Err(PiError::InvalidRadius { .. })),
                "radius {radius} should be rejected"
            );
        }
    }

    #[test]
    fn test_disc_rejects_non_finite_center() {
        let result = Disc::new(Point::new(f64::NAN, 0.0), 1.0);
        assert!(matches!(result, Err(PiError::NonFiniteValue { .. })));
    }

    #[test]
    fn test_disc_area_ratio_is_half_pi() {
        let d = disc();
        let ratio = d.area() / d.square_area();
        assert!((ratio - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_square_geometry() {
        let d = disc();
        // Square corners touch the circle.
        let h = d.square_half_side();
        let corner = Point::new(h, h);
        assert!((corner.distance(&Point::ORIGIN) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_membership() {
        let d = disc();
        assert!(d.in_square(&Point::ORIGIN));
        assert!(d.in_square(&Point::new(200.0, -200.0)));
        assert!(!d.in_square(&Point::new(0.0, 250.0)));
        assert!(!d.in_square(&Point::new(-250.0, 0.0)));
    }

    #[test]
    fn test_square_membership_offset_center() {
        let d = Disc::new(Point::new(100.0, 50.0), 10.0).unwrap();
        assert!(d.in_square(&Point::new(100.0, 50.0)));
        assert!(!d.in_square(&Point::new(0.0, 0.0)));
        assert!(!d.in_square(&Point::new(100.0, 59.0)));
    }

    #[test]
    fn test_ball_at_center_is_in_square() {
        let ball = Ball::at(&disc(), BallId::new(1), Point::ORIGIN).unwrap();
        assert!(ball.in_square());
        assert_eq!(ball.status(), BallStatus::Falling);
        assert!(ball.progress().abs() < f64::EPSILON);
    }

    #[test]
    fn test_ball_at_rejects_outside_point() {
        let result = Ball::at(&disc(), BallId::new(1), Point::new(301.0, 0.0));
        assert!(matches!(result, Err(PiError::PointOutsideDisc { .. })));
    }

    #[test]
    fn test_ball_advance_lands_once() {
        let mut ball = Ball::at(&disc(), BallId::new(1), Point::ORIGIN).unwrap();

        assert!(!ball.advance(0.4));
        assert!(!ball.advance(0.4));
        assert!((ball.progress() - 0.8).abs() < 1e-12);

        assert!(ball.advance(0.4));
        assert!(ball.is_landed());
        assert!((ball.progress() - 1.0).abs() < f64::EPSILON);

        // Terminal: further ticks are no-ops.
        assert!(!ball.advance(0.4));
        assert_eq!(ball.status(), BallStatus::Landed);
        assert!((ball.progress() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ball_id_display() {
        assert_eq!(BallId::new(7).to_string(), "ball-7");
        assert_eq!(BallId::new(7).raw(), 7);
    }

    #[test]
    fn test_ball_status_default() {
        assert_eq!(BallStatus::default(), BallStatus::Falling);
    }
}
