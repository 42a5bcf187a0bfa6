//! Fixed timestep simulation tick
//!
//! One call advances the level by one frame. Every active actor runs the same
//! ordered steps, in id order:
//!
//! 1. gravity
//! 2. jump, judged on last frame's ground contact
//! 3. horizontal intent and movement (the world shift and hazard patrol for
//!    the frame are applied once, before any actor moves)
//! 4. collision: X, then Y, then one-sided obstacles
//! 5. triggers: collectibles, hazards, goal zones
//!
//! After every actor has moved the level reverses hazards at constraints,
//! sweeps for defeats, recomputes the camera shift for the next frame, and
//! derives animation state and particles.

use serde::{Deserialize, Serialize};

use super::actor::{Intent, derive_state};
use super::camera::shift_actors;
use super::collision::{
    collect, resolve_one_sided, resolve_x, resolve_y, touch_hazards, touches_goal,
};
use super::state::{Level, LevelEvent, Phase};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// One intent per actor, by position; missing entries mean no input
    pub intents: Vec<Intent>,
    /// Pause toggle
    pub pause: bool,
    /// Clock for the post-hit invulnerability window (ms)
    pub now_ms: u64,
}

impl TickInput {
    /// Input for a single-actor level
    pub fn single(intent: Intent, now_ms: u64) -> Self {
        Self {
            intents: vec![intent],
            pause: false,
            now_ms,
        }
    }
}

/// Advance the level by one frame and report what happened
pub fn tick(level: &mut Level, input: &TickInput) -> Vec<LevelEvent> {
    let mut events = Vec::new();

    // Handle pause toggle
    if input.pause {
        match level.phase {
            Phase::Running => {
                events.extend(level.pause());
                return events;
            }
            Phase::Paused => events.extend(level.resume()),
            _ => {}
        }
    }

    match level.phase {
        Phase::Setup => events.extend(level.start()),
        Phase::Paused => return events,
        Phase::Completed | Phase::Defeated => {
            log::warn!("Tick ignored, level already {:?}", level.phase);
            return events;
        }
        Phase::Running => {}
    }

    if input.intents.len() > level.actors.len() {
        log::warn!(
            "{} intents for {} actors, extra intents ignored",
            input.intents.len(),
            level.actors.len()
        );
    } else if !input.intents.is_empty() && input.intents.len() < level.actors.len() {
        log::warn!(
            "{} intents for {} actors, the rest stand still",
            input.intents.len(),
            level.actors.len()
        );
    }

    // World shift computed last frame, then hazard patrol
    let shift = level.camera.take();
    level.tiles.shift_x(shift.amount);
    level.particles.shift_x(shift.amount);
    shift_actors(&mut level.actors, shift);
    level.tiles.patrol_hazards();

    let mut completed_by = None;
    {
        let settings = &level.settings;
        let tiles = &mut level.tiles;
        let particles = &mut level.particles;

        for (index, actor) in level.actors.iter_mut().enumerate() {
            if !actor.active {
                continue;
            }
            let intent = input.intents.get(index).copied().unwrap_or_default();

            actor.integrate(settings.gravity);
            if actor.try_jump(&intent) {
                events.push(LevelEvent::Jumped(actor.id));
            }

            actor.apply_intent(&intent);
            actor.advance();

            resolve_x(actor, &tiles.terrain);
            resolve_y(actor, &tiles.terrain);
            resolve_one_sided(actor, &tiles.obstacles, settings.tile_size);

            for kind in collect(actor, &mut tiles.collectibles) {
                if kind.heals() {
                    events.push(LevelEvent::Healed {
                        actor: actor.id,
                        lives: actor.lives,
                    });
                } else {
                    events.push(LevelEvent::CoinCollected {
                        actor: actor.id,
                        kind,
                        value: kind.value(),
                    });
                }
            }

            let outcome = touch_hazards(actor, &mut tiles.hazards, input.now_ms, settings);
            for hazard in &outcome.stomped {
                particles.explode(hazard.rect);
                events.push(LevelEvent::HazardStomped {
                    actor: actor.id,
                    hazard: hazard.id,
                });
            }
            if outcome.hits > 0 {
                events.push(LevelEvent::ActorHit {
                    actor: actor.id,
                    lives: actor.lives,
                });
            }

            if touches_goal(actor, &tiles.goals) {
                actor.levels_completed += 1;
                if completed_by.is_none() {
                    completed_by = Some(actor.id);
                }
            }

            actor.blink(settings);
        }
    }

    level.tiles.apply_constraints();

    // Defeat sweep
    let multi = level.is_multi_actor();
    let mut any_defeated = false;
    for actor in level.actors.iter_mut().filter(|a| a.active) {
        if actor.is_defeated(&level.settings) {
            any_defeated = true;
            if multi {
                actor.active = false;
            }
            log::info!(
                "Actor {} defeated at world x {}",
                actor.id.0,
                actor.distance_traveled()
            );
            events.push(LevelEvent::ActorDefeated(actor.id));
        }
    }

    if let Some(id) = completed_by {
        events.push(LevelEvent::LevelCompleted(id));
        events.extend(level.set_phase(Phase::Completed));
    } else if (multi && level.active_actors().next().is_none()) || (!multi && any_defeated) {
        events.extend(level.set_phase(Phase::Defeated));
    }

    // Camera shift for the next frame
    level.camera.recompute(&mut level.actors, &level.settings);

    // State derivation and particles
    for actor in level.actors.iter_mut().filter(|a| a.active) {
        actor.prev_state = actor.state;
        actor.state = derive_state(actor.direction.x, actor.on_ground);
        actor.animate(&level.settings);
        level.particles.spawn_for(actor);
    }
    level.particles.update(&level.actors, &level.settings);

    level.frame += 1;
    events
}
