//! Rectangle-walk mobility.
//!
//! Each device picks a uniformly random target inside the arena and travels
//! toward it in a straight line at its own constant speed. On arrival it
//! picks the next target. A speed of zero keeps the device where it was
//! placed.

use herald_topology::Point;
use rand::Rng;

/// Uniform point inside `[low, high]`.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, low: &Point, high: &Point) -> Point {
    Point::new(
        uniform(rng, low.x, high.x),
        uniform(rng, low.y, high.y),
    )
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Targets visited on the way before giving up on a single advance.
const MAX_LEGS: usize = 64;

/// Movement state of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleWalk {
    low: Point,
    high: Point,
    speed: f64,
    target: Point,
}

impl RectangleWalk {
    /// Draw a speed in `[0, max_speed]` and a first target.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, low: Point, high: Point, max_speed: f64) -> Self {
        let speed = if max_speed > 0.0 {
            rng.gen_range(0.0..=max_speed)
        } else {
            0.0
        };
        let target = random_point(rng, &low, &high);
        Self {
            low,
            high,
            speed,
            target,
        }
    }

    /// A walk that never moves.
    pub fn still(at: Point) -> Self {
        Self {
            low: at,
            high: at,
            speed: 0.0,
            target: at,
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn target(&self) -> Point {
        self.target
    }

    /// Position after travelling for `dt` from `from`.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, from: Point, dt: f64) -> Point {
        if self.speed <= 0.0 || dt <= 0.0 {
            return from;
        }
        let mut position = from;
        let mut budget = self.speed * dt;
        for _ in 0..MAX_LEGS {
            let leg = position.distance(&self.target);
            if leg > budget {
                return position.step_toward(&self.target, budget);
            }
            budget -= leg;
            position = self.target;
            self.target = random_point(rng, &self.low, &self.high);
            if budget <= 0.0 {
                break;
            }
        }
        position.clamp(&self.low, &self.high)
    }
}
