//! Simulation tuning
//!
//! Built once at startup and passed by reference into everything that needs
//! it. Stored as JSON; missing keys fall back to [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::PhysicsInvariantError;

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Grid & screen ===
    /// Edge length of one grid cell in pixels
    pub tile_size: i32,
    /// Visible rows; the screen height is `screen_tiles_y * tile_size`
    pub screen_tiles_y: i32,
    pub screen_width: i32,
    /// Camera scrolls left when the actor's center passes this x
    pub left_screen_edge: i32,
    /// Camera scrolls right when the actor's center passes this x
    pub right_screen_edge: i32,

    // === Physics ===
    pub gravity: f32,
    /// Horizontal run speed (px/frame)
    pub player_speed: i32,
    /// Vertical impulse on jump; negative is up
    pub jump_speed: f32,
    pub player_size: (i32, i32),

    // === Health ===
    pub max_lives: i32,
    /// Lives given to AI-controlled actors
    pub ai_max_lives: i32,
    /// Wall-clock window after a hit during which hazards do no damage
    pub invulnerability_ms: i64,
    /// Frames the actor blinks after a hit
    pub blink_frames: i32,

    // === Animation ===
    pub animation_speed: f32,
    pub animation_frames: u32,
    pub particle_frames: u32,

    // === Tiles ===
    pub hazard_speed: i32,
    pub hazard_size: (i32, i32),
    /// Horizontal inset of the hazard hitbox on each side
    pub hazard_hitbox_inset: i32,
    pub collectible_size: (i32, i32),
    pub collectible_offset_x: i32,
    /// Extra edge length of one-sided obstacle colliders
    pub obstacle_extra: i32,

    // === AI ===
    /// Columns in the observation window
    pub fov_columns: usize,
    /// Columns of the window that lie behind the actor
    pub fov_left_adjustment: usize,
    pub clock_rate: u32,
    /// Frames of distance history used to detect a stalled actor
    pub inactive_limit: usize,
    pub fitness_limit: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            screen_tiles_y: NUM_TILES_Y,
            screen_width: SCREEN_WIDTH,
            left_screen_edge: LEFT_SCREEN_EDGE,
            right_screen_edge: RIGHT_SCREEN_EDGE,

            gravity: GRAVITY,
            player_speed: PLAYER_SPEED,
            jump_speed: JUMP_SPEED,
            player_size: (PLAYER_WIDTH, PLAYER_HEIGHT),

            max_lives: PLAYER_MAX_LIVES,
            ai_max_lives: AI_MAX_LIVES,
            invulnerability_ms: AFTER_DAMAGE_INVUL,
            blink_frames: BLINKING_DURATION,

            animation_speed: ANIMATION_SPEED,
            animation_frames: ANIMATION_FRAMES,
            particle_frames: PARTICLE_FRAMES,

            hazard_speed: ENEMY_SPEED,
            hazard_size: (ENEMY_WIDTH, ENEMY_HEIGHT),
            hazard_hitbox_inset: ENEMY_COLLISION_OFFSET,
            collectible_size: (COLLECTIBLE_SIZE, COLLECTIBLE_SIZE),
            collectible_offset_x: COLLECTIBLE_OFFSET_X,
            obstacle_extra: TREE_OBSTACLE_ADDED_SPACE,

            fov_columns: FOV_DISTANCE,
            fov_left_adjustment: LEFT_FOV_ADJUSTMENT,
            clock_rate: CLOCK_RATE,
            inactive_limit: PLAYER_INACTIVE_LIMIT,
            fitness_limit: FITNESS_LIMIT,
        }
    }
}

impl Settings {
    /// Screen height in pixels; also the level's bottom bound
    pub fn screen_height(&self) -> i32 {
        self.screen_tiles_y * self.tile_size
    }

    /// Rows in the observation window (the top screen row is never observed)
    pub fn fov_rows(&self) -> usize {
        (self.screen_tiles_y - 1).max(0) as usize
    }

    /// Parse settings from JSON and validate them
    pub fn from_json_str(json: &str) -> Result<Self, PhysicsInvariantError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsInvariantError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject tuning that would only show up later as silent misbehavior
    pub fn validate(&self) -> Result<(), PhysicsInvariantError> {
        for (name, value) in [
            ("gravity", self.gravity),
            ("jump_speed", self.jump_speed),
            ("animation_speed", self.animation_speed),
        ] {
            if !value.is_finite() {
                return Err(PhysicsInvariantError::NotFinite { name, value });
            }
        }

        for (name, value) in [
            ("tile_size", self.tile_size),
            ("screen_tiles_y", self.screen_tiles_y),
            ("screen_width", self.screen_width),
            ("player width", self.player_size.0),
            ("player height", self.player_size.1),
            ("max_lives", self.max_lives),
            ("ai_max_lives", self.ai_max_lives),
        ] {
            if value <= 0 {
                return Err(PhysicsInvariantError::NotPositive {
                    name,
                    value: value as f64,
                });
            }
        }

        for (name, value) in [
            ("player_speed", self.player_speed as f64),
            ("invulnerability_ms", self.invulnerability_ms as f64),
            ("blink_frames", self.blink_frames as f64),
            ("animation_speed", self.animation_speed as f64),
            ("hazard_hitbox_inset", self.hazard_hitbox_inset as f64),
            ("obstacle_extra", self.obstacle_extra as f64),
        ] {
            if value < 0.0 {
                return Err(PhysicsInvariantError::Negative { name, value });
            }
        }

        if self.jump_speed >= 0.0 {
            return Err(PhysicsInvariantError::JumpSpeedNotUpward(self.jump_speed));
        }
        if self.left_screen_edge >= self.right_screen_edge {
            return Err(PhysicsInvariantError::InvertedScrollEdges {
                left: self.left_screen_edge,
                right: self.right_screen_edge,
            });
        }
        if self.fov_columns == 0 {
            return Err(PhysicsInvariantError::NotPositive {
                name: "fov_columns",
                value: 0.0,
            });
        }

        Ok(())
    }
}
