//! Controllable actors
//!
//! The actor keeps a continuous top-left position; its collision rectangle is
//! the floor of that position. `exact` is the integer look-ahead the collision
//! passes move to before deciding whether to snap or roll back.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::settings::Settings;

/// Stable actor identity; multi-actor iteration runs in id order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// Per-frame controller input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl Intent {
    pub fn right() -> Self {
        Self {
            right: true,
            ..Default::default()
        }
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Default::default()
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

/// Animation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorState {
    #[default]
    Idle,
    Run,
    Jump,
}

/// Pure state derivation from horizontal intent and ground contact
pub fn derive_state(direction_x: f32, on_ground: bool) -> ActorState {
    if !on_ground {
        ActorState::Jump
    } else if direction_x != 0.0 {
        ActorState::Run
    } else {
        ActorState::Idle
    }
}

/// Kinematic state captured on pause
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicSnapshot {
    pub pos: Vec2,
    pub exact: IVec2,
    pub direction: Vec2,
    pub speed: Vec2,
    pub on_ground: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Continuous top-left position (screen space)
    pub pos: Vec2,
    pub size: IVec2,
    /// Look-ahead position for this frame's collision passes
    pub exact: IVec2,
    /// x is the horizontal intent in {-1, 0, 1}; y is the vertical velocity
    pub direction: Vec2,
    /// x is the run speed, zeroed for a frame while the camera scrolls
    pub speed: Vec2,
    /// Run speed preserved across camera scroll frames
    pub shift_speed: f32,
    pub jump_speed: f32,
    pub on_ground: bool,
    pub moving_right: bool,

    pub lives: i32,
    pub max_lives: i32,
    pub coins: u32,
    pub kills: u32,
    pub levels_completed: u32,

    pub state: ActorState,
    pub prev_state: ActorState,
    /// Clock time of the last hazard hit; `None` until the first hit
    pub last_hit_ms: Option<u64>,
    pub blinks: i32,
    pub visible: bool,
    pub frame_index: f32,

    /// Sum of camera shifts not applied to this actor's own rectangle
    pub shifted: i32,
    /// Cleared when the actor is defeated in multi-actor mode
    pub active: bool,
}

impl Actor {
    /// Spawn an actor standing at `spawn` (top-left); AI actors get `ai_max_lives`
    pub fn new(id: ActorId, spawn: IVec2, settings: &Settings, ai: bool) -> Self {
        let lives = if ai {
            settings.ai_max_lives
        } else {
            settings.max_lives
        };
        let speed = settings.player_speed as f32;

        Self {
            id,
            pos: spawn.as_vec2(),
            size: IVec2::new(settings.player_size.0, settings.player_size.1),
            exact: spawn,
            direction: Vec2::ZERO,
            speed: Vec2::new(speed, 1.0),
            shift_speed: speed,
            jump_speed: settings.jump_speed,
            on_ground: false,
            moving_right: true,
            lives,
            max_lives: lives,
            coins: 0,
            kills: 0,
            levels_completed: 0,
            state: ActorState::Idle,
            prev_state: ActorState::Idle,
            last_hit_ms: None,
            blinks: settings.blink_frames,
            visible: true,
            frame_index: 0.0,
            shifted: 0,
            active: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.pos.x.floor() as i32,
            self.pos.y.floor() as i32,
            self.size.x,
            self.size.y,
        )
    }

    pub fn set_left(&mut self, left: i32) {
        self.pos.x = left as f32;
    }

    pub fn set_right(&mut self, right: i32) {
        self.pos.x = (right - self.size.x) as f32;
    }

    pub fn set_top(&mut self, top: i32) {
        self.pos.y = top as f32;
    }

    pub fn set_bottom(&mut self, bottom: i32) {
        self.pos.y = (bottom - self.size.y) as f32;
    }

    /// Apply gravity to the vertical velocity
    pub fn integrate(&mut self, gravity: f32) {
        self.direction.y += gravity;
    }

    /// Horizontal intent; `left` wins over `right`
    pub fn apply_intent(&mut self, intent: &Intent) {
        if intent.left {
            self.direction.x = -1.0;
            self.moving_right = false;
        } else if intent.right {
            self.direction.x = 1.0;
            self.moving_right = true;
        } else {
            self.direction.x = 0.0;
        }
    }

    /// Jump if grounded at frame start. Returns whether the jump happened.
    pub fn try_jump(&mut self, intent: &Intent) -> bool {
        if intent.jump && self.on_ground {
            self.direction.y = self.jump_speed;
            true
        } else {
            false
        }
    }

    /// Compute the look-ahead, move, and restore the run speed
    pub fn advance(&mut self) {
        let delta = Vec2::new(self.direction.x * self.speed.x, self.direction.y);
        let target = self.pos + delta;
        self.exact = IVec2::new(look_ahead(target.x, delta.x), look_ahead(target.y, delta.y));
        self.pos = target;
        self.speed.x = self.shift_speed;
    }

    /// Move by a camera shift, keeping world distance unchanged
    pub fn shift_x(&mut self, dx: i32) {
        self.pos.x += dx as f32;
        self.exact.x += dx;
        self.shifted -= dx;
    }

    /// Record a camera shift that was not applied to this actor
    pub fn record_shift(&mut self, dx: i32) {
        self.shifted -= dx;
    }

    /// Advance the animation cursor; restarts on a state change
    pub fn animate(&mut self, settings: &Settings) {
        self.frame_index += settings.animation_speed;
        if self.state != self.prev_state {
            self.frame_index = 0.0;
        }
        if self.frame_index >= settings.animation_frames as f32 {
            self.frame_index = 0.0;
        }
    }

    pub fn animation_frame(&self) -> u32 {
        self.frame_index as u32
    }

    /// Post-hit blink: invisible on even counts while the blink lasts
    pub fn blink(&mut self, settings: &Settings) {
        self.visible = true;
        if self.blinks < settings.blink_frames {
            if self.blinks % 2 == 0 {
                self.visible = false;
            }
            self.blinks += 1;
        }
    }

    pub fn can_be_hit(&self, now_ms: u64, settings: &Settings) -> bool {
        match self.last_hit_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) as i64 >= settings.invulnerability_ms,
        }
    }

    /// Lose one life and start the invulnerability window
    pub fn take_hit(&mut self, now_ms: u64) {
        self.last_hit_ms = Some(now_ms);
        self.lives -= 1;
        self.blinks = 0;
    }

    /// Lives as shown to the player
    pub fn display_lives(&self) -> i32 {
        self.lives.clamp(0, self.max_lives)
    }

    /// World-space x: screen x minus every camera shift this actor absorbed
    pub fn distance_traveled(&self) -> i32 {
        self.rect().x + self.shifted
    }

    pub fn is_defeated(&self, settings: &Settings) -> bool {
        self.lives <= 0 || self.rect().y >= settings.screen_height()
    }

    pub fn snapshot(&self) -> KinematicSnapshot {
        KinematicSnapshot {
            pos: self.pos,
            exact: self.exact,
            direction: self.direction,
            speed: self.speed,
            on_ground: self.on_ground,
        }
    }

    pub fn restore(&mut self, snapshot: &KinematicSnapshot) {
        self.pos = snapshot.pos;
        self.exact = snapshot.exact;
        self.direction = snapshot.direction;
        self.speed = snapshot.speed;
        self.on_ground = snapshot.on_ground;
    }
}

/// Round toward the motion so the look-ahead never lags the true position
fn look_ahead(target: f32, delta: f32) -> i32 {
    if delta < 0.0 {
        target.floor() as i32
    } else {
        target.ceil() as i32
    }
}
