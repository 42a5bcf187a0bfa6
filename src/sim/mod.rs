//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame)
//! - Seeded RNG only, and only for level generation
//! - Stable iteration order (tiles in grid order, actors by id)
//! - Wall-clock time enters only through `TickInput::now_ms`
//! - No rendering or platform dependencies

pub mod actor;
pub mod camera;
pub mod collision;
pub mod grid;
pub mod levelgen;
pub mod observation;
pub mod particles;
pub mod rect;
pub mod state;
pub mod tick;
pub mod tile;

pub use actor::{Actor, ActorId, ActorState, Intent, KinematicSnapshot, derive_state};
pub use camera::{Camera, CameraShift};
pub use grid::{LevelDescription, World, parse_csv_layer};
pub use levelgen::generate_level;
pub use observation::{
    CellCode, EpisodeEnd, FitnessInputs, Observation, StallDetector, decide, episode_end, fitness,
    min_progress, observe,
};
pub use particles::{Particle, ParticleKind, ParticleSystem};
pub use rect::Rect;
pub use state::{ActorView, ControlMode, FrameSnapshot, Level, LevelEvent, Phase, TileView};
pub use tick::{TickInput, tick};
pub use tile::{CollectibleKind, DecorationLayer, Tile, TileKind, TileSet};
