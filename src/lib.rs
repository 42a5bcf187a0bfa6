//! Tilerun - a tile-based side-scrolling platformer core
//!
//! Core modules:
//! - `sim`: Deterministic level simulation (actors, collisions, camera, observations)
//! - `settings`: Data-driven tuning, validated once at level construction
//! - `error`: Configuration and tuning error taxonomy

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ConfigurationError, PhysicsInvariantError, SimError};
pub use settings::Settings;

/// Game configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Fixed simulation rate (one tick per rendered frame)
    pub const CLOCK_RATE: u32 = 60;

    /// Grid and screen geometry
    pub const TILE_SIZE: i32 = 64;
    pub const NUM_TILES_Y: i32 = 11;
    pub const SCREEN_WIDTH: i32 = 1200;
    pub const SCREEN_HEIGHT: i32 = NUM_TILES_Y * TILE_SIZE;

    /// Camera scroll thresholds (screen-space x of the actor's center)
    pub const LEFT_SCREEN_EDGE: i32 = SCREEN_WIDTH / 5;
    pub const RIGHT_SCREEN_EDGE: i32 = SCREEN_WIDTH * 4 / 5;

    /// Physics, in pixels per frame
    pub const GRAVITY: f32 = 0.5;
    pub const PLAYER_SPEED: i32 = 5;
    pub const JUMP_SPEED: f32 = -13.0;
    pub const ENEMY_SPEED: i32 = 1;

    /// Actor hitbox
    pub const PLAYER_WIDTH: i32 = 54;
    pub const PLAYER_HEIGHT: i32 = 60;

    /// Lives (AI-controlled actors get a single life)
    pub const PLAYER_MAX_LIVES: i32 = 5;
    pub const AI_MAX_LIVES: i32 = 1;

    /// Invulnerability after a hazard hit (ms) and the blink it triggers (frames)
    pub const AFTER_DAMAGE_INVUL: i64 = 1000;
    pub const BLINKING_DURATION: i32 = 30;

    /// Animation
    pub const ANIMATION_SPEED: f32 = 0.15;
    pub const ANIMATION_FRAMES: u32 = 10;
    pub const PARTICLE_FRAMES: u32 = 6;

    /// Tile geometry for non-terrain layers
    pub const ENEMY_WIDTH: i32 = 64;
    pub const ENEMY_HEIGHT: i32 = 46;
    pub const ENEMY_COLLISION_OFFSET: i32 = 9;
    pub const COLLECTIBLE_SIZE: i32 = 24;
    pub const COLLECTIBLE_OFFSET_X: i32 = 15;
    pub const TREE_OBSTACLE_ADDED_SPACE: i32 = 20;

    /// AI observation window and training limits
    pub const FOV_DISTANCE: usize = 5;
    pub const LEFT_FOV_ADJUSTMENT: usize = 0;
    pub const PLAYER_INACTIVE_LIMIT: usize = 200;
    pub const FITNESS_LIMIT: f64 = -10.0;
}
