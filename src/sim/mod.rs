//! Frame-driven simulation module
//!
//! All gameplay logic lives here:
//! - Geometry of lines and axis-aligned rectangles
//! - Ball movement against a shared collision environment
//! - Hit policies for blocks and the paddle
//! - Hit listeners for scoring and removals
//! - Levels tying it together per frame
//!
//! Nothing in here renders or reads input devices.

pub mod ball;
pub mod block;
pub mod collision;
pub mod geometry;
pub mod level;
pub mod listeners;
pub mod paddle;
pub mod velocity;

pub use ball::{Ball, EdgeGuard};
pub use block::{Block, BlockKind};
pub use collision::{Collidable, Collider, CollisionEnvironment, CollisionInfo};
pub use geometry::{Line, Point, Rectangle, ShapeError};
pub use level::{BlockSpec, Level, LevelLayout, LevelStatus, TickInput};
pub use listeners::{
    BallRemover, BlockRemover, Counter, HitListener, ListenerError, PendingChanges,
    ScoreTrackingListener,
};
pub use paddle::{PADDLE_REGIONS, Paddle};
pub use velocity::Velocity;
