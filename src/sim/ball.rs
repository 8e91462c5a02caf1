//! The ball and its per-frame movement step

use serde::{Deserialize, Serialize};

use super::collision::{Collidable, CollisionEnvironment, CollisionInfo};
use super::geometry::{Line, Point, ShapeError};
use super::listeners::PendingChanges;
use super::velocity::Velocity;
use crate::consts::*;

/// Pulls a ball back inside the side walls after a collision
///
/// Guards against escaping the playfield when a side-wall hit and a corner
/// case coincide in the same frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeGuard {
    pub left_guard: f64,
    pub left_reset: f64,
    pub right_guard: f64,
    pub right_reset: f64,
}

impl Default for EdgeGuard {
    fn default() -> Self {
        Self {
            left_guard: LEFT_GUARD_X,
            left_reset: LEFT_RESET_X,
            right_guard: RIGHT_GUARD_X,
            right_reset: RIGHT_RESET_X,
        }
    }
}

impl EdgeGuard {
    /// Clamp `center` and bounce `velocity` if the ball is past a guard line heading out
    pub fn apply(&self, center: &mut Point, velocity: Velocity) -> Velocity {
        if center.x > self.right_guard && velocity.dx > 0.0 {
            center.x = self.right_reset;
            return velocity.with_dx(-velocity.dx);
        }
        if center.x < self.left_guard && velocity.dx < 0.0 {
            center.x = self.left_reset;
            return velocity.with_dx(-velocity.dx);
        }
        velocity
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    id: u32,
    center: Point,
    radius: u32,
    velocity: Velocity,
    #[serde(default)]
    edge_guard: EdgeGuard,
}

impl Ball {
    pub fn new(id: u32, center: Point, radius: u32, velocity: Velocity) -> Result<Self, ShapeError> {
        if radius == 0 {
            return Err(ShapeError::ZeroRadius);
        }
        Ok(Self {
            id,
            center,
            radius,
            velocity,
            edge_guard: EdgeGuard::default(),
        })
    }

    pub fn with_edge_guard(mut self, edge_guard: EdgeGuard) -> Self {
        self.edge_guard = edge_guard;
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Where the ball would travel over `dt` if nothing were in the way
    pub fn trajectory(&self, dt: f64) -> Line {
        Line::new(self.center, self.velocity.scaled(dt).apply_to_point(self.center))
    }

    /// Advance the ball by one frame of `dt` seconds
    ///
    /// Returns the collision resolved this frame, if any. Without a collision
    /// the ball moves to the end of its trajectory. On a collision it stays
    /// put (only the velocity changes) except for the paddle and interior
    /// corrections below.
    pub fn advance(
        &mut self,
        dt: f64,
        env: &mut CollisionEnvironment,
        pending: &mut PendingChanges,
    ) -> Option<CollisionInfo> {
        let trajectory = self.trajectory(dt);

        let Some(info) = env.closest_collision(&trajectory) else {
            self.center = trajectory.end;
            return None;
        };
        let Some(collider) = env.get_mut(info.object) else {
            log::warn!("Collidable {} vanished mid-query", info.object);
            self.center = trajectory.end;
            return None;
        };

        let mut velocity = collider.hit(self, info.point, self.velocity, pending);
        let rect = collider.bounding_rectangle();

        // Fast or from-below approaches can leave the center inside the shape
        if rect.contains_strictly(self.center) {
            self.center = info.point;
        }

        // Step off the paddle right away so the next frame can't hit it again
        if collider.is_paddle() {
            self.center = velocity.scaled(dt).apply_to_point(self.center);
        }

        velocity = self.edge_guard.apply(&mut self.center, velocity);
        self.velocity = velocity;
        Some(info)
    }
}
