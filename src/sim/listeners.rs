//! Hit notification pipeline
//!
//! Blocks report hits to `HitListener`s. Listeners keep score and remove
//! destroyed blocks or lost balls, but never touch the collision environment
//! directly: removals are queued in `PendingChanges` and applied by the level
//! once the triggering ball has finished its step.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use super::ball::Ball;
use super::block::Block;
use super::collision::Collidable;

/// Failure reported by a hit listener
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListenerError {
    #[error("counter '{name}' cannot drop below zero")]
    CounterUnderflow { name: &'static str },

    #[error("{0}")]
    Custom(String),
}

/// Observer of block hits
pub trait HitListener {
    /// Called once per hit on `being_hit`, after its hit points were updated
    fn hit_event(
        &self,
        being_hit: &mut Block,
        hitter: &Ball,
        pending: &mut PendingChanges,
    ) -> Result<(), ListenerError>;
}

/// Structural changes requested during a tick
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingChanges {
    collidables: Vec<u32>,
    balls: Vec<u32>,
}

impl PendingChanges {
    /// Queue a collidable for removal (duplicates are ignored)
    pub fn remove_collidable(&mut self, id: u32) {
        if !self.collidables.contains(&id) {
            self.collidables.push(id);
        }
    }

    /// Queue a ball for removal (duplicates are ignored)
    pub fn remove_ball(&mut self, id: u32) {
        if !self.balls.contains(&id) {
            self.balls.push(id);
        }
    }

    pub fn is_ball_removed(&self, id: u32) -> bool {
        self.balls.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.collidables.is_empty() && self.balls.is_empty()
    }

    /// Take the queued collidable removals, in request order
    pub fn take_collidables(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.collidables)
    }

    /// Take the queued ball removals, in request order
    pub fn take_balls(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.balls)
    }
}

/// A shared, non-negative tally (score, remaining blocks, remaining balls)
///
/// Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct Counter(Rc<Cell<u64>>);

impl Counter {
    pub fn new(value: u64) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn value(&self) -> u64 {
        self.0.get()
    }

    pub fn set(&self, value: u64) {
        self.0.set(value);
    }

    pub fn increase(&self, amount: u64) {
        self.0.set(self.0.get().saturating_add(amount));
    }

    /// Subtract `amount`; fails without changing the value if it would go negative
    pub fn decrease(&self, amount: u64) -> Option<u64> {
        let value = self.0.get().checked_sub(amount)?;
        self.0.set(value);
        Some(value)
    }
}

/// Removes blocks whose hit points ran out
pub struct BlockRemover {
    remaining_blocks: Counter,
}

impl BlockRemover {
    pub fn new(remaining_blocks: Counter) -> Self {
        Self { remaining_blocks }
    }
}

impl HitListener for BlockRemover {
    fn hit_event(
        &self,
        being_hit: &mut Block,
        _hitter: &Ball,
        pending: &mut PendingChanges,
    ) -> Result<(), ListenerError> {
        if !being_hit.is_destroyed() {
            return Ok(());
        }
        log::debug!("Block {} destroyed", being_hit.id());
        pending.remove_collidable(being_hit.id());
        being_hit.remove_hit_listener(self);
        self.remaining_blocks
            .decrease(1)
            .map(|_| ())
            .ok_or(ListenerError::CounterUnderflow {
                name: "remaining blocks",
            })
    }
}

/// Removes balls that touch the block it listens to (the death zone)
pub struct BallRemover {
    remaining_balls: Counter,
}

impl BallRemover {
    pub fn new(remaining_balls: Counter) -> Self {
        Self { remaining_balls }
    }
}

impl HitListener for BallRemover {
    fn hit_event(
        &self,
        _being_hit: &mut Block,
        hitter: &Ball,
        pending: &mut PendingChanges,
    ) -> Result<(), ListenerError> {
        if pending.is_ball_removed(hitter.id()) {
            return Ok(());
        }
        log::debug!("Ball {} lost", hitter.id());
        pending.remove_ball(hitter.id());
        self.remaining_balls
            .decrease(1)
            .map(|_| ())
            .ok_or(ListenerError::CounterUnderflow {
                name: "remaining balls",
            })
    }
}

/// Points per hit, plus a bonus for the hit that destroys a block
pub struct ScoreTrackingListener {
    score: Counter,
    hit_award: u64,
    destroy_bonus: u64,
}

impl ScoreTrackingListener {
    pub fn new(score: Counter, hit_award: u64, destroy_bonus: u64) -> Self {
        Self {
            score,
            hit_award,
            destroy_bonus,
        }
    }
}

impl HitListener for ScoreTrackingListener {
    fn hit_event(
        &self,
        being_hit: &mut Block,
        _hitter: &Ball,
        _pending: &mut PendingChanges,
    ) -> Result<(), ListenerError> {
        self.score.increase(self.hit_award);
        if being_hit.is_destroyed() {
            self.score.increase(self.destroy_bonus);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::block::BlockKind;
    use crate::sim::geometry::{Point, Rectangle};
    use crate::sim::velocity::Velocity;

    fn block(id: u32, hit_points: u32) -> Block {
        Block::new(
            id,
            Rectangle::from_coords(100.0, 100.0, 50.0, 20.0).unwrap(),
            hit_points,
            BlockKind::Breakable,
        )
    }

    fn ball(id: u32) -> Ball {
        Ball::new(id, Point::new(125.0, 90.0), 5, Velocity::new(0.0, 5.0)).unwrap()
    }

    fn hit(block: &mut Block, ball: &Ball, pending: &mut PendingChanges) {
        block.hit(ball, Point::new(125.0, 100.0), ball.velocity(), pending);
    }

    #[test]
    fn test_counter_is_shared() {
        let a = Counter::new(3);
        let b = a.clone();
        b.increase(2);
        assert_eq!(a.value(), 5);
        assert_eq!(a.decrease(5), Some(0));
        assert_eq!(b.decrease(1), None);
        assert_eq!(b.value(), 0);
    }

    #[test]
    fn test_pending_changes_dedupe() {
        let mut pending = PendingChanges::default();
        assert!(pending.is_empty());
        pending.remove_collidable(4);
        pending.remove_collidable(4);
        pending.remove_ball(1);
        assert!(pending.is_ball_removed(1));
        assert_eq!(pending.take_collidables(), vec![4]);
        assert_eq!(pending.take_balls(), vec![1]);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_block_remover_waits_for_zero_hit_points() {
        let remaining = Counter::new(1);
        let mut b = block(7, 2);
        b.add_hit_listener(Rc::new(BlockRemover::new(remaining.clone())));
        let mut pending = PendingChanges::default();

        hit(&mut b, &ball(1), &mut pending);
        assert!(pending.is_empty());
        assert_eq!(remaining.value(), 1);

        hit(&mut b, &ball(1), &mut pending);
        assert_eq!(pending.take_collidables(), vec![7]);
        assert_eq!(remaining.value(), 0);
        // The remover unregisters itself from the destroyed block
        assert_eq!(b.hit_listener_count(), 0);
    }

    #[test]
    fn test_block_remover_underflow_is_reported_not_fatal() {
        let remaining = Counter::new(0);
        let remover = BlockRemover::new(remaining.clone());
        let mut b = block(7, 0);
        let mut pending = PendingChanges::default();
        let result = remover.hit_event(&mut b, &ball(1), &mut pending);
        assert_eq!(
            result,
            Err(ListenerError::CounterUnderflow {
                name: "remaining blocks"
            })
        );
        assert_eq!(pending.take_collidables(), vec![7]);
    }

    #[test]
    fn test_score_tracking() {
        let score = Counter::new(0);
        let mut b = block(7, 2);
        b.add_hit_listener(Rc::new(ScoreTrackingListener::new(score.clone(), 5, 10)));
        let mut pending = PendingChanges::default();

        hit(&mut b, &ball(1), &mut pending);
        assert_eq!(score.value(), 5);
        hit(&mut b, &ball(1), &mut pending);
        assert_eq!(score.value(), 20);
    }

    #[test]
    fn test_remover_and_score_share_one_hit() {
        let score = Counter::new(0);
        let remaining = Counter::new(1);
        let mut b = block(7, 1);
        // Remover first: it unregisters itself but the scorer still sees this hit
        b.add_hit_listener(Rc::new(BlockRemover::new(remaining.clone())));
        b.add_hit_listener(Rc::new(ScoreTrackingListener::new(score.clone(), 5, 10)));
        let mut pending = PendingChanges::default();

        hit(&mut b, &ball(1), &mut pending);
        assert_eq!(score.value(), 15);
        assert_eq!(remaining.value(), 0);
        assert_eq!(b.hit_listener_count(), 1);
    }

    #[test]
    fn test_ball_remover() {
        let remaining = Counter::new(2);
        let rect = Rectangle::from_coords(0.0, 600.0, 800.0, 10.0).unwrap();
        let mut death_zone = Block::invincible(99, rect);
        death_zone.add_hit_listener(Rc::new(BallRemover::new(remaining.clone())));
        let mut pending = PendingChanges::default();

        let falling = ball(3);
        death_zone.hit(&falling, Point::new(125.0, 600.0), falling.velocity(), &mut pending);
        death_zone.hit(&falling, Point::new(125.0, 600.0), falling.velocity(), &mut pending);
        assert_eq!(pending.take_balls(), vec![3]);
        assert_eq!(remaining.value(), 1);
        assert_eq!(death_zone.hit_listener_count(), 1);
    }
}
