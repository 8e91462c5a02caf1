//! Rectangular blocks and their hit policy

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::collision::Collidable;
use super::geometry::{Point, Rectangle};
use super::listeners::{HitListener, PendingChanges};
use super::velocity::Velocity;
use crate::consts::EPSILON;

/// Block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockKind {
    /// Loses a hit point per hit, destroyed at zero
    #[default]
    Breakable,
    /// Borders and the death zone: never loses hit points
    Invincible,
}

/// A block entity
pub struct Block {
    id: u32,
    kind: BlockKind,
    rect: Rectangle,
    hit_points: u32,
    /// Notified on every hit, in registration order
    hit_listeners: Vec<Rc<dyn HitListener>>,
}

impl Block {
    pub fn new(id: u32, rect: Rectangle, hit_points: u32, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            rect,
            hit_points,
            hit_listeners: Vec::new(),
        }
    }

    /// An indestructible block (walls, death zone)
    pub fn invincible(id: u32, rect: Rectangle) -> Self {
        Self::new(id, rect, 0, BlockKind::Invincible)
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn hit_points(&self) -> u32 {
        self.hit_points
    }

    /// True once a breakable block has no hit points left
    pub fn is_destroyed(&self) -> bool {
        self.kind == BlockKind::Breakable && self.hit_points == 0
    }

    /// Whether destroying this block is required to clear a level
    pub fn counts_for_clear(&self) -> bool {
        self.kind == BlockKind::Breakable
    }

    pub fn add_hit_listener(&mut self, listener: Rc<dyn HitListener>) {
        self.hit_listeners.push(listener);
    }

    /// Remove every registration of `listener`; returns whether any was found
    pub fn remove_hit_listener(&mut self, listener: &dyn HitListener) -> bool {
        let before = self.hit_listeners.len();
        self.hit_listeners
            .retain(|l| !std::ptr::addr_eq(Rc::as_ptr(l), listener));
        self.hit_listeners.len() != before
    }

    pub fn hit_listener_count(&self) -> usize {
        self.hit_listeners.len()
    }

    /// Tell every listener about a hit
    ///
    /// Iterates over a snapshot so listeners can add or remove listeners
    /// (including themselves) mid-notification. A failing listener is logged
    /// and the rest still run.
    fn notify_hit(&mut self, hitter: &Ball, pending: &mut PendingChanges) {
        let listeners = self.hit_listeners.clone();
        for listener in &listeners {
            if let Err(err) = listener.hit_event(self, hitter, pending) {
                log::warn!(
                    "Hit listener failed (block {}, ball {}): {}",
                    self.id,
                    hitter.id(),
                    err
                );
            }
        }
    }

    /// New velocity for a ball meeting this block at `point`
    ///
    /// Exact edge hits flip the matching axis. Points within EPSILON of an
    /// edge (but not on it) flip the rounded component, and only when the
    /// ball is heading into that edge. The two axes are checked independently,
    /// so a corner hit flips both.
    pub fn reflect(&self, point: Point, velocity: Velocity) -> Velocity {
        let r = &self.rect;
        let mut v = velocity;

        if point.y == r.top() || point.y == r.bottom() {
            v.dy = -v.dy;
        } else if self.grazes_horizontal_edge(point, v) {
            v.dy = -v.dy.round();
        }

        if point.x == r.left() || point.x == r.right() {
            v.dx = -v.dx;
        } else if self.grazes_vertical_edge(point, v) {
            v.dx = -v.dx.round();
        }

        v
    }

    fn grazes_horizontal_edge(&self, point: Point, v: Velocity) -> bool {
        let from_bottom = self.rect.bottom() - point.y;
        let from_top = point.y - self.rect.top();
        (from_bottom.abs() < EPSILON && from_bottom != 0.0 && v.dy < 0.0)
            || (from_top.abs() < EPSILON && from_top != 0.0 && v.dy > 0.0)
    }

    fn grazes_vertical_edge(&self, point: Point, v: Velocity) -> bool {
        let from_right = self.rect.right() - point.x;
        let from_left = point.x - self.rect.left();
        (from_right.abs() < EPSILON && from_right != 0.0 && v.dx < 0.0)
            || (from_left.abs() < EPSILON && from_left != 0.0 && v.dx > 0.0)
    }
}

impl Collidable for Block {
    fn id(&self) -> u32 {
        self.id
    }

    fn bounding_rectangle(&self) -> Rectangle {
        self.rect
    }

    fn hit(
        &mut self,
        hitter: &Ball,
        collision_point: Point,
        velocity: Velocity,
        pending: &mut PendingChanges,
    ) -> Velocity {
        if self.kind == BlockKind::Breakable {
            self.hit_points = self.hit_points.saturating_sub(1);
        }
        self.notify_hit(hitter, pending);
        self.reflect(collision_point, velocity)
    }

    fn is_active(&self) -> bool {
        !self.is_destroyed()
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("rect", &self.rect)
            .field("hit_points", &self.hit_points)
            .field("hit_listeners", &self.hit_listeners.len())
            .finish()
    }
}
