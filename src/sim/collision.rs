//! Collision detection over the set of collidable shapes
//!
//! Detection is line-vs-rectangle: the trajectory is traced from the ball's
//! center and the radius is not subtracted. Fast balls can tunnel through thin
//! shapes; level geometry is tuned around that.

use super::ball::Ball;
use super::block::Block;
use super::geometry::{Line, Point, Rectangle};
use super::listeners::PendingChanges;
use super::paddle::Paddle;
use super::velocity::Velocity;

/// Anything a ball can bounce off
pub trait Collidable {
    /// Entity id, unique within a level
    fn id(&self) -> u32;

    /// Shape used for collision queries
    fn bounding_rectangle(&self) -> Rectangle;

    /// Respond to a ball hitting this shape at `collision_point`
    ///
    /// Returns the ball's new velocity. Side effects (hit point loss, listener
    /// notification) happen here; structural changes go into `pending`.
    fn hit(
        &mut self,
        hitter: &Ball,
        collision_point: Point,
        velocity: Velocity,
        pending: &mut PendingChanges,
    ) -> Velocity;

    /// Inactive shapes are skipped by collision queries
    fn is_active(&self) -> bool {
        true
    }
}

/// The shapes a level registers with its environment
#[derive(Debug)]
pub enum Collider {
    Block(Block),
    Paddle(Paddle),
}

impl Collider {
    pub fn is_paddle(&self) -> bool {
        matches!(self, Collider::Paddle(_))
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Collider::Block(block) => Some(block),
            Collider::Paddle(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Collider::Block(block) => Some(block),
            Collider::Paddle(_) => None,
        }
    }

    pub fn as_paddle(&self) -> Option<&Paddle> {
        match self {
            Collider::Paddle(paddle) => Some(paddle),
            Collider::Block(_) => None,
        }
    }

    pub fn as_paddle_mut(&mut self) -> Option<&mut Paddle> {
        match self {
            Collider::Paddle(paddle) => Some(paddle),
            Collider::Block(_) => None,
        }
    }
}

impl Collidable for Collider {
    fn id(&self) -> u32 {
        match self {
            Collider::Block(block) => block.id(),
            Collider::Paddle(paddle) => paddle.id(),
        }
    }

    fn bounding_rectangle(&self) -> Rectangle {
        match self {
            Collider::Block(block) => block.bounding_rectangle(),
            Collider::Paddle(paddle) => paddle.bounding_rectangle(),
        }
    }

    fn hit(
        &mut self,
        hitter: &Ball,
        collision_point: Point,
        velocity: Velocity,
        pending: &mut PendingChanges,
    ) -> Velocity {
        match self {
            Collider::Block(block) => block.hit(hitter, collision_point, velocity, pending),
            Collider::Paddle(paddle) => paddle.hit(hitter, collision_point, velocity, pending),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Collider::Block(block) => block.is_active(),
            Collider::Paddle(paddle) => paddle.is_active(),
        }
    }
}

impl From<Block> for Collider {
    fn from(block: Block) -> Self {
        Collider::Block(block)
    }
}

impl From<Paddle> for Collider {
    fn from(paddle: Paddle) -> Self {
        Collider::Paddle(paddle)
    }
}

/// Result of a trajectory query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// Where the trajectory first meets a shape
    pub point: Point,
    /// Id of the shape that was met
    pub object: u32,
}

/// The set of shapes balls can collide with during one level
#[derive(Debug, Default)]
pub struct CollisionEnvironment {
    /// Registration order; ties in distance go to the earlier entry
    colliders: Vec<Collider>,
}

impl CollisionEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape for subsequent queries
    pub fn add(&mut self, collider: impl Into<Collider>) {
        let collider = collider.into();
        log::debug!("Registered collidable {}", collider.id());
        self.colliders.push(collider);
    }

    /// Unregister a shape, returning it if it was present
    pub fn remove(&mut self, id: u32) -> Option<Collider> {
        let index = self.colliders.iter().position(|c| c.id() == id)?;
        log::debug!("Unregistered collidable {}", id);
        Some(self.colliders.remove(index))
    }

    pub fn get(&self, id: u32) -> Option<&Collider> {
        self.colliders.iter().find(|c| c.id() == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Collider> {
        self.colliders.iter_mut().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collider> {
        self.colliders.iter()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// The collision nearest to the trajectory's start, if any
    ///
    /// Every edge of every active shape is tested; the point with the smallest
    /// distance from `trajectory.start` wins, first found on ties.
    pub fn closest_collision(&self, trajectory: &Line) -> Option<CollisionInfo> {
        let mut closest: Option<(CollisionInfo, f64)> = None;

        for collider in self.colliders.iter().filter(|c| c.is_active()) {
            let rect = collider.bounding_rectangle();
            for point in rect.intersection_points(trajectory) {
                let dist = trajectory.start.distance(point);
                if closest.is_none_or(|(_, best)| dist < best) {
                    closest = Some((
                        CollisionInfo {
                            point,
                            object: collider.id(),
                        },
                        dist,
                    ));
                }
            }
        }

        closest.map(|(info, _)| info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::BlockKind;

    fn block(id: u32, x: f64, y: f64, w: f64, h: f64, hit_points: u32) -> Block {
        Block::new(
            id,
            Rectangle::from_coords(x, y, w, h).unwrap(),
            hit_points,
            BlockKind::Breakable,
        )
    }

    #[test]
    fn test_empty_environment_has_no_collision() {
        let env = CollisionEnvironment::new();
        let trajectory = Line::from_coords(0.0, 0.0, 100.0, 100.0);
        assert!(env.closest_collision(&trajectory).is_none());
    }

    #[test]
    fn test_single_block_collision() {
        let mut env = CollisionEnvironment::new();
        env.add(block(1, 390.0, 305.0, 20.0, 10.0, 1));

        let trajectory = Line::from_coords(400.0, 300.0, 400.0, 305.0);
        let info = env.closest_collision(&trajectory).unwrap();
        assert_eq!(info.object, 1);
        assert_eq!(info.point, Point::new(400.0, 305.0));
    }

    #[test]
    fn test_closest_of_many() {
        let mut env = CollisionEnvironment::new();
        // Registered far-first so the order can't decide the result
        env.add(block(1, 0.0, 80.0, 200.0, 10.0, 1));
        env.add(block(2, 0.0, 40.0, 200.0, 10.0, 1));
        env.add(block(3, 0.0, 60.0, 200.0, 10.0, 1));

        let trajectory = Line::from_coords(100.0, 0.0, 100.0, 100.0);
        let info = env.closest_collision(&trajectory).unwrap();
        assert_eq!(info.object, 2);
        assert_eq!(info.point, Point::new(100.0, 40.0));
    }

    #[test]
    fn test_closest_edge_within_one_block() {
        let mut env = CollisionEnvironment::new();
        env.add(block(7, 10.0, 10.0, 20.0, 20.0, 1));

        // Enters through the left edge, leaves through the right edge
        let trajectory = Line::from_coords(0.0, 20.0, 40.0, 20.0);
        let info = env.closest_collision(&trajectory).unwrap();
        assert_eq!(info.point, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_zero_length_trajectory() {
        let mut env = CollisionEnvironment::new();
        env.add(block(1, 0.0, 0.0, 10.0, 10.0, 1));
        let trajectory = Line::from_coords(0.0, 5.0, 0.0, 5.0);
        assert!(env.closest_collision(&trajectory).is_none());
    }

    #[test]
    fn test_removed_and_destroyed_blocks_are_skipped() {
        let mut env = CollisionEnvironment::new();
        env.add(block(1, 0.0, 40.0, 200.0, 10.0, 1));
        env.add(block(2, 0.0, 60.0, 200.0, 10.0, 0));
        env.add(block(3, 0.0, 80.0, 200.0, 10.0, 1));

        let trajectory = Line::from_coords(100.0, 0.0, 100.0, 100.0);
        assert_eq!(env.closest_collision(&trajectory).unwrap().object, 1);

        assert!(env.remove(1).is_some());
        assert!(env.remove(1).is_none());
        // Block 2 has no hit points left and no longer collides
        assert_eq!(env.closest_collision(&trajectory).unwrap().object, 3);
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_collider_accessors() {
        let mut env = CollisionEnvironment::new();
        env.add(block(4, 0.0, 0.0, 10.0, 10.0, 2));
        let collider = env.get_mut(4).unwrap();
        assert!(!collider.is_paddle());
        assert!(collider.as_paddle().is_none());
        assert_eq!(collider.as_block_mut().unwrap().hit_points(), 2);
        assert!(env.contains(4));
        assert!(!env.contains(5));
    }
}
