//! Cosmetic dust and explosion particles
//!
//! Spawned on state edges. They never affect physics but are part of the
//! render snapshot, so they follow the same deterministic rules.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorId, ActorState};
use super::rect::Rect;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    Jump,
    Land,
    Run,
    Explosion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    /// Anchor point (screen space)
    pub pos: IVec2,
    pub flipped: bool,
    pub frame_index: f32,
    /// Actor a run particle is attached to
    pub owner: Option<ActorId>,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: IVec2) -> Self {
        Self {
            kind,
            pos,
            flipped: false,
            frame_index: 0.0,
            owner: None,
        }
    }
}

/// Anchor of a run particle trailing behind the actor's feet
fn run_anchor(actor: &Actor) -> IVec2 {
    let rect = actor.rect();
    if actor.moving_right {
        IVec2::new(rect.x - 10, rect.bottom() - 10)
    } else {
        IVec2::new(rect.right() - 5, rect.bottom() - 10)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleSystem {
    /// One-shot particles, removed once their animation ends
    pub effects: Vec<Particle>,
    /// At most one per actor, alive while the actor runs
    pub run: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.effects.len() + self.run.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.effects.iter().chain(self.run.iter())
    }

    /// Spawn particles for the actor's state edges this frame.
    /// Call after state derivation; returns the kinds spawned.
    pub fn spawn_for(&mut self, actor: &Actor) -> Vec<ParticleKind> {
        let rect = actor.rect();
        let mut spawned = Vec::new();

        if actor.prev_state != ActorState::Jump && actor.direction.y < 0.0 {
            let pos = rect.bottom_left() + IVec2::new(10, -30);
            self.effects.push(Particle::new(ParticleKind::Jump, pos));
            spawned.push(ParticleKind::Jump);
        } else if actor.prev_state == ActorState::Jump && actor.on_ground {
            let pos = rect.bottom_left() - IVec2::new(20, 40);
            self.effects.push(Particle::new(ParticleKind::Land, pos));
            spawned.push(ParticleKind::Land);
        }

        if actor.prev_state != ActorState::Run && actor.state == ActorState::Run {
            let (pos, flipped) = if actor.moving_right {
                (rect.bottom_left() - IVec2::new(10, 0), false)
            } else {
                (rect.bottom_right() - IVec2::new(10, 0), true)
            };
            self.run.retain(|p| p.owner != Some(actor.id));
            self.run.push(Particle {
                kind: ParticleKind::Run,
                pos,
                flipped,
                frame_index: 0.0,
                owner: Some(actor.id),
            });
            spawned.push(ParticleKind::Run);
        }

        for kind in &spawned {
            log::debug!("Actor {} spawned {:?} particle", actor.id.0, kind);
        }
        spawned
    }

    /// Explosion over a destroyed hazard
    pub fn explode(&mut self, hazard: Rect) {
        let pos = hazard.top_left() - IVec2::new(20, 50);
        self.effects.push(Particle::new(ParticleKind::Explosion, pos));
    }

    /// Advance animations, drop finished effects, and keep run particles on
    /// their running owners
    pub fn update(&mut self, actors: &[Actor], settings: &Settings) {
        let frames = settings.particle_frames as f32;

        for particle in &mut self.effects {
            particle.frame_index += settings.animation_speed;
        }
        self.effects.retain(|p| p.frame_index < frames);

        self.run.retain_mut(|particle| {
            let Some(owner) = actors
                .iter()
                .find(|a| Some(a.id) == particle.owner && a.active)
            else {
                return false;
            };
            if owner.state != ActorState::Run {
                return false;
            }
            particle.pos = run_anchor(owner);
            particle.flipped = !owner.moving_right;
            particle.frame_index += settings.animation_speed;
            if particle.frame_index >= frames {
                particle.frame_index = 0.0;
            }
            true
        });
    }

    pub fn shift_x(&mut self, dx: i32) {
        for particle in self.effects.iter_mut().chain(self.run.iter_mut()) {
            particle.pos.x += dx;
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn actor() -> Actor {
        Actor::new(ActorId(0), IVec2::new(100, 200), &Settings::default(), false)
    }

    #[test]
    fn test_jump_edge() {
        let mut particles = ParticleSystem::new();
        let mut a = actor();
        a.direction = Vec2::new(0.0, -13.0);
        a.prev_state = ActorState::Idle;
        a.state = ActorState::Jump;

        assert_eq!(particles.spawn_for(&a), vec![ParticleKind::Jump]);
        assert_eq!(particles.effects[0].pos, IVec2::new(110, 230));

        // Already airborne: no second jump puff
        a.prev_state = ActorState::Jump;
        assert!(particles.spawn_for(&a).is_empty());
    }

    #[test]
    fn test_land_edge() {
        let mut particles = ParticleSystem::new();
        let mut a = actor();
        a.prev_state = ActorState::Jump;
        a.on_ground = true;
        assert_eq!(particles.spawn_for(&a), vec![ParticleKind::Land]);
        assert_eq!(particles.effects[0].pos, IVec2::new(80, 220));
    }

    #[test]
    fn test_run_particle_follows_and_ends() {
        let settings = Settings::default();
        let mut particles = ParticleSystem::new();
        let mut a = actor();
        a.on_ground = true;
        a.prev_state = ActorState::Idle;
        a.state = ActorState::Run;
        a.moving_right = false;

        assert_eq!(particles.spawn_for(&a), vec![ParticleKind::Run]);
        assert_eq!(particles.run[0].pos, IVec2::new(144, 260));
        assert!(particles.run[0].flipped);

        a.pos.x = 120.0;
        particles.update(std::slice::from_ref(&a), &settings);
        assert_eq!(particles.run[0].pos, IVec2::new(169, 250));

        a.state = ActorState::Idle;
        particles.update(std::slice::from_ref(&a), &settings);
        assert!(particles.run.is_empty());
    }

    #[test]
    fn test_effects_expire() {
        let settings = Settings::default();
        let mut particles = ParticleSystem::new();
        particles.explode(Rect::new(448, 338, 64, 46));
        assert_eq!(particles.effects[0].pos, IVec2::new(428, 288));

        // 6 frames at 0.15 per tick
        for _ in 0..39 {
            particles.update(&[], &settings);
        }
        assert_eq!(particles.len(), 1);
        particles.update(&[], &settings);
        particles.update(&[], &settings);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_shift_moves_particles() {
        let mut particles = ParticleSystem::new();
        particles.explode(Rect::new(100, 100, 64, 46));
        particles.shift_x(-5);
        assert_eq!(particles.effects[0].pos, IVec2::new(75, 50));
    }
}
