//! The player's paddle
//!
//! The paddle is split into five equal regions, each sending the ball off at
//! a fixed angle. The incoming angle is discarded; only the speed survives.

use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::collision::Collidable;
use super::geometry::{Point, Rectangle, ShapeError};
use super::listeners::PendingChanges;
use super::velocity::Velocity;
use crate::consts::PADDLE_REGION_ANGLES;

/// Number of hit regions across the paddle
pub const PADDLE_REGIONS: usize = 5;

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    id: u32,
    rect: Rectangle,
    /// Horizontal speed (pixels per second)
    speed: f64,
    /// Leftmost x the paddle's left side may reach
    min_x: f64,
    /// Rightmost x the paddle's right side may reach
    max_x: f64,
}

impl Paddle {
    pub fn new(id: u32, rect: Rectangle, speed: f64, min_x: f64, max_x: f64) -> Result<Self, ShapeError> {
        if !(rect.width() > 0.0) {
            return Err(ShapeError::InvalidPaddleWidth(rect.width()));
        }
        if !(speed >= 0.0) || !speed.is_finite() {
            return Err(ShapeError::InvalidSpeed(speed));
        }
        if !(max_x - min_x >= rect.width()) {
            return Err(ShapeError::InvalidTravelBounds {
                min: min_x,
                max: max_x,
                width: rect.width(),
            });
        }
        let mut paddle = Self {
            id,
            rect,
            speed,
            min_x,
            max_x,
        };
        // Start inside the travel bounds
        paddle.set_left(rect.left());
        Ok(paddle)
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn rect(&self) -> Rectangle {
        self.rect
    }

    fn set_left(&mut self, x: f64) {
        let x = x.clamp(self.min_x, self.max_x - self.rect.width());
        self.rect = self
            .rect
            .with_upper_left(Point::new(x, self.rect.top()));
    }

    pub fn move_left(&mut self, dt: f64) {
        self.set_left(self.rect.left() - self.speed * dt);
    }

    pub fn move_right(&mut self, dt: f64) {
        self.set_left(self.rect.left() + self.speed * dt);
    }

    /// Center the paddle on `x` (clamped to the travel bounds)
    pub fn center_on(&mut self, x: f64) {
        self.set_left(x - self.rect.width() / 2.0);
    }

    /// Which region (0 = leftmost) an x-coordinate falls in
    ///
    /// Boundaries: [s, s+d), [s+d, s+2d], (s+2d, s+3d), [s+3d, s+4d],
    /// (s+4d, s+5d]. Anything outside the paddle's span is `None`.
    pub fn region_at(&self, x: f64) -> Option<usize> {
        let start = self.rect.left();
        let div = self.rect.width() / PADDLE_REGIONS as f64;
        let edge = |n: f64| start + n * div;

        if x >= start && x < edge(1.0) {
            Some(0)
        } else if x >= edge(1.0) && x <= edge(2.0) {
            Some(1)
        } else if x > edge(2.0) && x < edge(3.0) {
            Some(2)
        } else if x >= edge(3.0) && x <= edge(4.0) {
            Some(3)
        } else if x > edge(4.0) && x <= edge(5.0) {
            Some(4)
        } else {
            None
        }
    }
}

impl Collidable for Paddle {
    fn id(&self) -> u32 {
        self.id
    }

    fn bounding_rectangle(&self) -> Rectangle {
        self.rect
    }

    fn hit(
        &mut self,
        _hitter: &Ball,
        collision_point: Point,
        velocity: Velocity,
        _pending: &mut PendingChanges,
    ) -> Velocity {
        match self.region_at(collision_point.x) {
            Some(region) => {
                Velocity::from_angle_and_speed(PADDLE_REGION_ANGLES[region], velocity.speed())
            }
            None => {
                log::debug!("Paddle hit outside its span at x={}", collision_point.x);
                velocity
            }
        }
    }
}
