//! Brick Breaker - A ball-and-paddle arcade game core
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (geometry, collisions, hit policies, levels)
//! - `settings`: Playfield configuration

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Tolerance for "on the boundary" checks against floating-point drift
    pub const EPSILON: f64 = 1e-3;
    /// Default frame delta (60 FPS host loop)
    pub const FRAME_DT: f64 = 1.0 / 60.0;

    /// Playfield dimensions
    pub const SCREEN_WIDTH: f64 = 800.0;
    pub const SCREEN_HEIGHT: f64 = 600.0;
    pub const BORDER_THICKNESS: f64 = 25.0;

    /// Screen-edge guard: a ball past these x-values after a collision is pulled back
    pub const RIGHT_GUARD_X: f64 = 775.0;
    pub const RIGHT_RESET_X: f64 = 773.0;
    pub const LEFT_GUARD_X: f64 = 25.0;
    pub const LEFT_RESET_X: f64 = 27.0;

    /// Paddle defaults
    pub const PADDLE_Y: f64 = 570.0;
    pub const PADDLE_HEIGHT: f64 = 20.0;
    pub const PADDLE_WIDTH: f64 = 100.0;
    pub const PADDLE_SPEED: f64 = 600.0;
    /// Paddle travel is limited to [PADDLE_MIN_X, PADDLE_MAX_X]
    pub const PADDLE_MIN_X: f64 = 20.0;
    pub const PADDLE_MAX_X: f64 = 780.0;

    /// Ball defaults
    pub const BALL_RADIUS: u32 = 5;
    pub const BALL_SPAWN_X: f64 = 400.0;
    pub const BALL_SPAWN_Y: f64 = 564.0;

    /// Outgoing angle (degrees clockwise from up) for each paddle region, left to right
    pub const PADDLE_REGION_ANGLES: [f64; 5] = [300.0, 330.0, 360.0, 30.0, 60.0];
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
