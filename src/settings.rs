//! Game settings
//!
//! Playfield geometry, paddle and ball defaults, and scoring values. Loaded
//! from a JSON file by the host; every field falls back to its default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::EdgeGuard;

/// Failure to load or validate settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting '{field}': {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub screen_width: f64,
    pub screen_height: f64,
    /// Thickness of the left, right and top walls
    pub border_thickness: f64,
    /// y where the top wall starts (room for the HUD above it)
    pub top_margin: f64,
    /// Height of the death zone below the screen's bottom edge
    pub death_zone_height: f64,

    // === Paddle ===
    pub paddle_y: f64,
    pub paddle_height: f64,
    pub paddle_min_x: f64,
    pub paddle_max_x: f64,

    // === Ball ===
    pub ball_radius: u32,
    pub ball_spawn_x: f64,
    pub ball_spawn_y: f64,
    pub edge_guard: EdgeGuard,

    // === Scoring ===
    /// Points for every block hit
    pub hit_award: u64,
    /// Extra points for the hit that destroys a block
    pub destroy_bonus: u64,
    /// Points for clearing a level
    pub clear_bonus: u64,
    pub initial_lives: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
            border_thickness: BORDER_THICKNESS,
            top_margin: 20.0,
            death_zone_height: 10.0,

            paddle_y: PADDLE_Y,
            paddle_height: PADDLE_HEIGHT,
            paddle_min_x: PADDLE_MIN_X,
            paddle_max_x: PADDLE_MAX_X,

            ball_radius: BALL_RADIUS,
            ball_spawn_x: BALL_SPAWN_X,
            ball_spawn_y: BALL_SPAWN_Y,
            edge_guard: EdgeGuard::default(),

            hit_award: 5,
            destroy_bonus: 10,
            clear_bonus: 100,
            initial_lives: 7,
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Save settings as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("border_thickness", self.border_thickness),
            ("death_zone_height", self.death_zone_height),
            ("paddle_height", self.paddle_height),
        ];
        for (field, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "must be a positive number",
                });
            }
        }
        if self.ball_radius == 0 {
            return Err(SettingsError::Invalid {
                field: "ball_radius",
                reason: "must be positive",
            });
        }
        if !(self.paddle_max_x > self.paddle_min_x) {
            return Err(SettingsError::Invalid {
                field: "paddle_max_x",
                reason: "must be greater than paddle_min_x",
            });
        }
        if !(self.edge_guard.left_guard < self.edge_guard.right_guard) {
            return Err(SettingsError::Invalid {
                field: "edge_guard",
                reason: "left guard must be left of the right guard",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.edge_guard.right_guard, 775.0);
        assert_eq!(settings.edge_guard.right_reset, 773.0);
        assert_eq!(settings.initial_lives, 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "clear_bonus": 450 }"#).unwrap();
        assert_eq!(settings.clear_bonus, 450);
        assert_eq!(settings.screen_width, SCREEN_WIDTH);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let settings = Settings {
            ball_radius: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid {
                field: "ball_radius",
                ..
            })
        ));

        let settings = Settings {
            screen_width: -800.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("brick_breaker_settings_{}.json", std::process::id()));
        let settings = Settings {
            clear_bonus: 250,
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/brick_breaker.json");
        assert_eq!(settings, Settings::default());
    }
}
