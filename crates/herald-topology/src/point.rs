//! Planar coordinates for device placement.
//!
//! Devices live in a flat, axis-aligned arena. Connectivity is decided by
//! Euclidean distance, so the only operations we need are vector arithmetic,
//! distance and clamping into the arena.

use std::ops::{Add, Mul, Neg, Sub};

/// A position (or displacement) in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Origin of the coordinate system.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean length of this point seen as a vector.
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points.
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// Move toward `target` by at most `step`, stopping on the target.
    pub fn step_toward(&self, target: &Self, step: f64) -> Self {
        let delta = *target - *self;
        let len = delta.norm();
        if len <= step || len == 0.0 {
            *target
        } else {
            *self + delta * (step / len)
        }
    }

    /// Clamp into the rectangle `[low, high]`.
    pub fn clamp(&self, low: &Self, high: &Self) -> Self {
        Self {
            x: self.x.clamp(low.x, high.x),
            y: self.y.clamp(low.y, high.y),
        }
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
