//! Per-level game context and the frame tick
//!
//! A `Level` owns one collision environment for its whole lifetime: the
//! paddle, the border walls, the death zone and the layout's blocks. Balls
//! are spawned per turn. Score and lives are shared counters handed in by the
//! host so they carry over from level to level.

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::block::{Block, BlockKind};
use super::collision::{Collidable, CollisionEnvironment};
use super::geometry::{Point, Rectangle, ShapeError};
use super::listeners::{
    BallRemover, BlockRemover, Counter, HitListener, PendingChanges, ScoreTrackingListener,
};
use super::paddle::Paddle;
use super::velocity::Velocity;
use crate::consts::{BORDER_THICKNESS, PADDLE_SPEED, PADDLE_WIDTH, SCREEN_WIDTH};
use crate::settings::Settings;

/// Input for a single tick: which keys are currently down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

/// Where a level stands after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStatus {
    /// Balls in play
    Running,
    /// Every breakable block destroyed
    Cleared,
    /// All balls lost, a life was spent; start another turn
    TurnLost,
    /// All balls lost with no lives left
    OutOfLives,
}

/// A block placement within a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub hit_points: u32,
}

/// Everything that differs between levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub name: String,
    pub paddle_width: f64,
    pub paddle_speed: f64,
    /// One ball per entry, launched from the spawn point each turn
    pub ball_velocities: Vec<Velocity>,
    pub blocks: Vec<BlockSpec>,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self {
            name: String::from("Untitled"),
            paddle_width: PADDLE_WIDTH,
            paddle_speed: PADDLE_SPEED,
            ball_velocities: vec![Velocity::from_angle_and_speed(0.0, 300.0)],
            blocks: Vec::new(),
        }
    }
}

impl LevelLayout {
    /// A seeded grid of blocks for level `index` (0-based)
    ///
    /// Rows grow with the index; the same seed and index always give the same
    /// layout. Hit points and gaps are drawn from the seeded RNG.
    pub fn generate(index: u32, seed: u64) -> Self {
        const BLOCK_WIDTH: f64 = 50.0;
        const BLOCK_HEIGHT: f64 = 25.0;
        const FIRST_ROW_Y: f64 = 100.0;

        let mut rng = Pcg32::seed_from_u64(seed.wrapping_add((index as u64).wrapping_mul(2654435761)));
        let columns = ((SCREEN_WIDTH - 2.0 * BORDER_THICKNESS) / BLOCK_WIDTH) as u32;
        let rows = (2 + index).min(8);
        let max_hit_points = 1 + index.min(3);

        let mut blocks = Vec::new();
        for row in 0..rows {
            for col in 0..columns {
                // Leave roughly one cell in eight empty
                if rng.random_range(0..8) == 0 {
                    continue;
                }
                blocks.push(BlockSpec {
                    x: BORDER_THICKNESS + col as f64 * BLOCK_WIDTH,
                    y: FIRST_ROW_Y + row as f64 * BLOCK_HEIGHT,
                    width: BLOCK_WIDTH,
                    height: BLOCK_HEIGHT,
                    hit_points: rng.random_range(1..=max_hit_points),
                });
            }
        }
        if blocks.is_empty() {
            blocks.push(BlockSpec {
                x: SCREEN_WIDTH / 2.0 - BLOCK_WIDTH / 2.0,
                y: FIRST_ROW_Y,
                width: BLOCK_WIDTH,
                height: BLOCK_HEIGHT,
                hit_points: 1,
            });
        }

        // Later levels launch a second ball
        let mut ball_velocities = vec![Velocity::from_angle_and_speed(rng.random_range(330.0..360.0), 300.0)];
        if index >= 2 {
            ball_velocities.push(Velocity::from_angle_and_speed(rng.random_range(0.0..30.0), 300.0));
        }

        log::debug!("Generated level {} with {} blocks", index + 1, blocks.len());
        Self {
            name: format!("Level {}", index + 1),
            ball_velocities,
            blocks,
            ..Default::default()
        }
    }
}

/// A level in progress
#[derive(Debug)]
pub struct Level {
    name: String,
    settings: Settings,
    ball_velocities: Vec<Velocity>,
    env: CollisionEnvironment,
    balls: Vec<Ball>,
    paddle_id: u32,
    pending: PendingChanges,
    score: Counter,
    lives: Counter,
    remaining_blocks: Counter,
    remaining_balls: Counter,
    status: LevelStatus,
    time_ticks: u64,
    next_id: u32,
}

impl Level {
    /// Build the level's shapes and listeners; no balls until `start_turn`
    pub fn new(
        settings: &Settings,
        layout: &LevelLayout,
        score: Counter,
        lives: Counter,
    ) -> Result<Self, ShapeError> {
        let mut level = Self {
            name: layout.name.clone(),
            settings: settings.clone(),
            ball_velocities: layout.ball_velocities.clone(),
            env: CollisionEnvironment::new(),
            balls: Vec::new(),
            paddle_id: 0,
            pending: PendingChanges::default(),
            score,
            lives,
            remaining_blocks: Counter::new(0),
            remaining_balls: Counter::new(0),
            status: LevelStatus::Running,
            time_ticks: 0,
            next_id: 1,
        };

        level.paddle_id = level.next_entity_id();
        let paddle_rect = Rectangle::from_coords(
            (settings.screen_width - layout.paddle_width) / 2.0,
            settings.paddle_y,
            layout.paddle_width,
            settings.paddle_height,
        )?;
        level.env.add(Paddle::new(
            level.paddle_id,
            paddle_rect,
            layout.paddle_speed,
            settings.paddle_min_x,
            settings.paddle_max_x,
        )?);

        level.add_borders()?;

        let remover: Rc<dyn HitListener> = Rc::new(BlockRemover::new(level.remaining_blocks.clone()));
        let scorer: Rc<dyn HitListener> = Rc::new(ScoreTrackingListener::new(
            level.score.clone(),
            settings.hit_award,
            settings.destroy_bonus,
        ));
        for spec in &layout.blocks {
            if spec.hit_points == 0 {
                log::warn!(
                    "Skipping block at ({}, {}) in '{}': no hit points",
                    spec.x,
                    spec.y,
                    layout.name
                );
                continue;
            }
            let rect = Rectangle::from_coords(spec.x, spec.y, spec.width, spec.height)?;
            let mut block = Block::new(level.next_entity_id(), rect, spec.hit_points, BlockKind::Breakable);
            block.add_hit_listener(Rc::clone(&remover));
            block.add_hit_listener(Rc::clone(&scorer));
            level.env.add(block);
            level.remaining_blocks.increase(1);
        }

        log::info!(
            "Level '{}' ready with {} blocks",
            level.name,
            level.remaining_blocks.value()
        );
        Ok(level)
    }

    /// Top, left and right walls plus the death zone below the screen
    fn add_borders(&mut self) -> Result<(), ShapeError> {
        let s = &self.settings;
        let side_height = s.screen_height - s.top_margin;
        let walls = [
            Rectangle::from_coords(0.0, s.top_margin, s.screen_width, s.border_thickness)?,
            Rectangle::from_coords(0.0, s.top_margin, s.border_thickness, side_height)?,
            Rectangle::from_coords(
                s.screen_width - s.border_thickness,
                s.top_margin,
                s.border_thickness,
                side_height,
            )?,
        ];
        let death_zone_rect =
            Rectangle::from_coords(0.0, s.screen_height, s.screen_width, s.death_zone_height)?;

        for rect in walls {
            let id = self.next_entity_id();
            self.env.add(Block::invincible(id, rect));
        }

        let mut death_zone = Block::invincible(self.next_entity_id(), death_zone_rect);
        death_zone.add_hit_listener(Rc::new(BallRemover::new(self.remaining_balls.clone())));
        self.env.add(death_zone);
        Ok(())
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Center the paddle and spawn this level's balls
    pub fn start_turn(&mut self) -> Result<(), ShapeError> {
        let mid = self.settings.screen_width / 2.0;
        if let Some(paddle) = self.paddle_mut() {
            paddle.center_on(mid);
        }

        self.balls.clear();
        let spawn = Point::new(self.settings.ball_spawn_x, self.settings.ball_spawn_y);
        for velocity in self.ball_velocities.clone() {
            let id = self.next_entity_id();
            let ball = Ball::new(id, spawn, self.settings.ball_radius, velocity)?
                .with_edge_guard(self.settings.edge_guard);
            self.balls.push(ball);
        }
        self.remaining_balls.set(self.balls.len() as u64);
        self.status = LevelStatus::Running;
        log::debug!("Turn started with {} balls", self.balls.len());
        Ok(())
    }

    /// Advance the level by one frame
    pub fn tick(&mut self, input: &TickInput, dt: f64) -> LevelStatus {
        if self.status != LevelStatus::Running {
            return self.status;
        }
        self.time_ticks += 1;

        if let Some(paddle) = self.paddle_mut() {
            if input.left {
                paddle.move_left(dt);
            }
            if input.right {
                paddle.move_right(dt);
            }
        }

        // One ball at a time; removals land before the next ball's query
        let mut lost = Vec::new();
        for ball in &mut self.balls {
            ball.advance(dt, &mut self.env, &mut self.pending);
            for id in self.pending.take_collidables() {
                self.env.remove(id);
            }
            lost.extend(self.pending.take_balls());
        }
        if !lost.is_empty() {
            self.balls.retain(|b| !lost.contains(&b.id()));
        }

        self.status = self.check_status();
        self.status
    }

    fn check_status(&mut self) -> LevelStatus {
        if self.remaining_blocks.value() == 0 {
            self.score.increase(self.settings.clear_bonus);
            log::info!(
                "Level '{}' cleared after {} ticks (score {})",
                self.name,
                self.time_ticks,
                self.score.value()
            );
            return LevelStatus::Cleared;
        }

        if self.remaining_balls.value() == 0 {
            let lives = self.lives.decrease(1).unwrap_or(0);
            log::info!("All balls lost, {} lives left", lives);
            return if lives == 0 {
                LevelStatus::OutOfLives
            } else {
                LevelStatus::TurnLost
            };
        }

        LevelStatus::Running
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn environment(&self) -> &CollisionEnvironment {
        &self.env
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn paddle(&self) -> Option<&Paddle> {
        self.env.get(self.paddle_id).and_then(|c| c.as_paddle())
    }

    pub fn paddle_mut(&mut self) -> Option<&mut Paddle> {
        self.env
            .get_mut(self.paddle_id)
            .and_then(|c| c.as_paddle_mut())
    }

    pub fn score(&self) -> u64 {
        self.score.value()
    }

    pub fn lives(&self) -> u64 {
        self.lives.value()
    }

    pub fn remaining_blocks(&self) -> u64 {
        self.remaining_blocks.value()
    }

    /// Breakable blocks still registered, in registration order
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.env
            .iter()
            .filter_map(|c| c.as_block())
            .filter(|b| b.counts_for_clear())
    }
}
