//! Ball velocity in cartesian and angle/speed form
//!
//! Angles are in degrees, measured clockwise from "up". Screen y grows
//! downward, so angle 0 has a negative dy.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Point;
use crate::normalize_degrees;

/// Displacement per unit of time
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn from_angle_and_speed(angle_degrees: f64, speed: f64) -> Self {
        let angle = angle_degrees.to_radians();
        Self {
            dx: speed * angle.sin(),
            dy: -speed * angle.cos(),
        }
    }

    #[inline]
    pub fn as_dvec2(&self) -> DVec2 {
        DVec2::new(self.dx, self.dy)
    }

    /// Magnitude of the vector
    pub fn speed(&self) -> f64 {
        self.as_dvec2().length()
    }

    /// Heading in [0, 360); 0 for the zero vector
    pub fn angle(&self) -> f64 {
        if self.dx == 0.0 && self.dy == 0.0 {
            return 0.0;
        }
        normalize_degrees(self.dx.atan2(-self.dy).to_degrees())
    }

    /// Displacement covered over `dt`
    pub fn scaled(&self, dt: f64) -> Self {
        Self::new(self.dx * dt, self.dy * dt)
    }

    pub fn apply_to_point(&self, p: Point) -> Point {
        p + self.as_dvec2()
    }

    pub fn with_dx(&self, dx: f64) -> Self {
        Self { dx, ..*self }
    }
}
