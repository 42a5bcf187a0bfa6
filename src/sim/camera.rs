//! Horizontal camera
//!
//! The camera never moves; the world does. When the followed actor walks past
//! a scroll edge its own run speed is suppressed for a frame and every tile
//! (and every other actor) slides the opposite way instead. The shift is
//! computed at the end of a frame and applied at the start of the next one.

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorId};
use crate::settings::Settings;

/// One frame's world shift
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraShift {
    /// Signed pixels added to every x coordinate
    pub amount: i32,
    /// Actor whose own movement was suppressed in place of the shift
    pub exempt: Option<ActorId>,
}

/// Scroll-edge rule for the followed actor.
///
/// Preserves the run speed in `shift_speed`, and zeroes `speed.x` when the
/// camera takes over the movement.
pub fn edge_shift(actor: &mut Actor, settings: &Settings) -> i32 {
    actor.shift_speed = actor.speed.x;
    let center = actor.rect().center_x();
    let direction = actor.direction.x;

    if center < settings.left_screen_edge && direction < 0.0 {
        actor.speed.x = 0.0;
        actor.shift_speed.round() as i32
    } else if center > settings.right_screen_edge && direction > 0.0 {
        actor.speed.x = 0.0;
        -(actor.shift_speed.round() as i32)
    } else {
        0
    }
}

/// Active actor furthest along the level; ties go to the lowest id
pub fn select_leader(actors: &[Actor]) -> Option<ActorId> {
    actors
        .iter()
        .filter(|a| a.active)
        .max_by(|a, b| {
            a.distance_traveled()
                .cmp(&b.distance_traveled())
                .then(b.id.cmp(&a.id))
        })
        .map(|a| a.id)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camera {
    pending: CameraShift,
    leader: Option<ActorId>,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leader(&self) -> Option<ActorId> {
        self.leader
    }

    /// Shift waiting to be applied next frame
    pub fn pending(&self) -> CameraShift {
        self.pending
    }

    /// Hand out the pending shift, leaving none behind
    pub fn take(&mut self) -> CameraShift {
        std::mem::take(&mut self.pending)
    }

    /// Recompute the next frame's shift from the post-move actor positions.
    ///
    /// A change of leader pans the camera toward the new leader, at most one
    /// run step per frame, moving every actor. Otherwise the leader's scroll
    /// edges apply and the leader is exempt.
    pub fn recompute(&mut self, actors: &mut [Actor], settings: &Settings) -> CameraShift {
        let Some(leader) = select_leader(actors) else {
            self.pending = CameraShift::default();
            return self.pending;
        };

        let previous = self.leader.replace(leader);
        let previous_center = previous
            .filter(|&id| id != leader)
            .and_then(|id| actors.iter().find(|a| a.id == id))
            .map(|a| a.rect().center_x());

        let Some(current) = actors.iter_mut().find(|a| a.id == leader) else {
            self.pending = CameraShift::default();
            return self.pending;
        };

        self.pending = match previous_center {
            Some(center) => {
                let limit = current.shift_speed.round() as i32;
                let amount = (center - current.rect().center_x()).clamp(-limit, limit);
                log::debug!(
                    "Camera leader {:?} -> {:?}, pan {}",
                    previous,
                    leader,
                    amount
                );
                CameraShift {
                    amount,
                    exempt: None,
                }
            }
            None => CameraShift {
                amount: edge_shift(current, settings),
                exempt: Some(leader),
            },
        };
        self.pending
    }
}

/// Move active actors by a shift; the exempt actor only records it
pub fn shift_actors(actors: &mut [Actor], shift: CameraShift) {
    if shift.amount == 0 {
        return;
    }
    for actor in actors.iter_mut().filter(|a| a.active) {
        if shift.exempt == Some(actor.id) {
            actor.record_shift(shift.amount);
        } else {
            actor.shift_x(shift.amount);
        }
    }
}
