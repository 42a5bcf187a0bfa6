//! Level state and lifecycle
//!
//! Everything a running level owns lives here: the tiles, the actors, the
//! camera and the particles. The per-frame rules are in [`super::tick`].

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorId, ActorState, KinematicSnapshot};
use super::camera::Camera;
use super::grid::LevelDescription;
use super::particles::{Particle, ParticleSystem};
use super::rect::Rect;
use super::tile::{CollectibleKind, TileKind, TileSet};
use crate::error::{ConfigurationError, SimError};
use crate::settings::Settings;

/// Lifecycle of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Built, not yet ticked
    Setup,
    Running,
    Paused,
    /// An actor reached a goal zone
    Completed,
    /// No actor survives
    Defeated,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Defeated)
    }
}

/// Who drives the actors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// One human-controlled actor; its defeat ends the level
    Player,
    /// A population of AI actors sharing the level; each is removed on defeat
    Ai { actors: usize },
}

/// Something that happened during a tick, for sound and UI layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    PhaseChanged { from: Phase, to: Phase },
    Jumped(ActorId),
    CoinCollected {
        actor: ActorId,
        kind: CollectibleKind,
        value: u32,
    },
    Healed { actor: ActorId, lives: i32 },
    HazardStomped { actor: ActorId, hazard: u32 },
    ActorHit { actor: ActorId, lives: i32 },
    ActorDefeated(ActorId),
    LevelCompleted(ActorId),
}

/// Render-facing view of one tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub id: u32,
    pub kind: TileKind,
    pub rect: Rect,
}

/// Render-facing view of one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    pub id: ActorId,
    pub rect: Rect,
    pub state: ActorState,
    pub facing_right: bool,
    pub visible: bool,
    pub animation_frame: u32,
    pub lives: i32,
    pub coins: u32,
    pub kills: u32,
    pub active: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub phase: Phase,
    pub tiles: Vec<TileView>,
    pub actors: Vec<ActorView>,
    pub particles: Vec<Particle>,
}

impl FrameSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// A loaded level
#[derive(Debug, Clone)]
pub struct Level {
    pub(crate) settings: Settings,
    description: LevelDescription,
    mode: ControlMode,
    pub phase: Phase,
    pub tiles: TileSet,
    /// Sorted by id
    pub actors: Vec<Actor>,
    pub camera: Camera,
    pub particles: ParticleSystem,
    pub spawn: IVec2,
    pub level_width: i32,
    /// Ticks simulated while running
    pub frame: u64,
    paused_with: Vec<KinematicSnapshot>,
}

impl Level {
    /// Validate the settings and materialize the level.
    /// Nothing is built when either is invalid.
    pub fn new(
        description: LevelDescription,
        settings: Settings,
        mode: ControlMode,
    ) -> Result<Self, SimError> {
        settings.validate()?;
        if matches!(mode, ControlMode::Ai { actors: 0 }) {
            return Err(ConfigurationError::NoActors.into());
        }

        let world = description.materialize(&settings)?;
        let actors = match mode {
            ControlMode::Player => vec![Actor::new(ActorId(0), world.spawn, &settings, false)],
            ControlMode::Ai { actors } => (0..actors as u32)
                .map(|id| Actor::new(ActorId(id), world.spawn, &settings, true))
                .collect(),
        };
        log::info!("Level ready: {} actor(s), mode {:?}", actors.len(), mode);

        Ok(Self {
            settings,
            description,
            mode,
            phase: Phase::Setup,
            tiles: world.tiles,
            actors,
            camera: Camera::new(),
            particles: ParticleSystem::new(),
            spawn: world.spawn,
            level_width: world.level_width,
            frame: 0,
            paused_with: Vec::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn description(&self) -> &LevelDescription {
        &self.description
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn is_multi_actor(&self) -> bool {
        matches!(self.mode, ControlMode::Ai { .. })
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn active_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().filter(|a| a.active)
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == Phase::Defeated
    }

    pub(crate) fn set_phase(&mut self, to: Phase) -> Option<LevelEvent> {
        let from = self.phase;
        if from == to {
            return None;
        }
        self.phase = to;
        log::info!("Level phase {:?} -> {:?}", from, to);
        Some(LevelEvent::PhaseChanged { from, to })
    }

    /// Setup -> Running
    pub fn start(&mut self) -> Option<LevelEvent> {
        if self.phase != Phase::Setup {
            return None;
        }
        self.set_phase(Phase::Running)
    }

    /// Freeze the level, remembering every actor's kinematic state
    pub fn pause(&mut self) -> Option<LevelEvent> {
        if self.phase != Phase::Running {
            return None;
        }
        self.paused_with = self.actors.iter().map(Actor::snapshot).collect();
        self.set_phase(Phase::Paused)
    }

    /// Restore the state saved by [`Level::pause`] and continue
    pub fn resume(&mut self) -> Option<LevelEvent> {
        if self.phase != Phase::Paused {
            return None;
        }
        for (actor, saved) in self.actors.iter_mut().zip(&self.paused_with) {
            actor.restore(saved);
        }
        self.paused_with.clear();
        self.set_phase(Phase::Running)
    }

    /// Rebuild the level from its description, back in `Setup`
    pub fn reset(&mut self) -> Result<(), SimError> {
        *self = Level::new(self.description().clone(), self.settings.clone(), self.mode())?;
        Ok(())
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            phase: self.phase,
            tiles: self
                .tiles
                .iter()
                .map(|t| TileView {
                    id: t.id,
                    kind: t.kind,
                    rect: t.rect,
                })
                .collect(),
            actors: self
                .actors
                .iter()
                .map(|a| ActorView {
                    id: a.id,
                    rect: a.rect(),
                    state: a.state,
                    facing_right: a.moving_right,
                    visible: a.visible,
                    animation_frame: a.animation_frame(),
                    lives: a.display_lives(),
                    coins: a.coins,
                    kills: a.kills,
                    active: a.active,
                })
                .collect(),
            particles: self.particles.iter().cloned().collect(),
        }
    }
}
