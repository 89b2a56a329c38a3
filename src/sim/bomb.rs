//! Bomb entity: polar-velocity projectile with a fuse
//!
//! Velocity is stored as `speed` + `direction` so friction is a scalar
//! decay and wall bounces are angle mirrors.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::bounce_off_walls;
use crate::config::BombRules;
use crate::consts::{BOMB_SPAWN_MAX_SPEED, BOMB_SPAWN_RISE};
use crate::{lerp, polar_to_cartesian};

/// Lifecycle phase, derived from age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombPhase {
    /// Dropping in; cannot be kicked and is never deadly
    Spawning,
    Armed,
    /// Last stretch of the fuse, blinking
    Lit,
    Exploded,
}

/// Outcome of one physics step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BombTick {
    Alive,
    Exploded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    /// Heading in radians
    pub direction: f32,
    /// Ticks since spawn
    pub age: u32,
    /// Moving fast enough to kill on contact
    pub deadly: bool,
    exploded: bool,
}

impl Bomb {
    /// New bomb drifting in a random direction at a random low speed
    pub fn spawn<R: Rng>(id: u32, pos: Vec2, rng: &mut R) -> Self {
        let direction = rng.random_range(0.0..std::f32::consts::TAU);
        let speed = rng.random_range(0.0..BOMB_SPAWN_MAX_SPEED);
        Self::with_velocity(id, pos, speed, direction)
    }

    pub fn with_velocity(id: u32, pos: Vec2, speed: f32, direction: f32) -> Self {
        Self {
            id,
            pos,
            speed,
            direction,
            age: 0,
            deadly: false,
            exploded: false,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        polar_to_cartesian(self.speed, self.direction)
    }

    pub fn is_exploded(&self) -> bool {
        self.exploded
    }

    pub fn is_kickable(&self, rules: &BombRules) -> bool {
        !self.exploded && self.age >= rules.spawn_time
    }

    /// Ticks left before the timer explosion (0 once past the fuse)
    pub fn fuse_remaining(&self, rules: &BombRules) -> u32 {
        rules.fuse_end().saturating_sub(self.age)
    }

    pub fn phase(&self, rules: &BombRules) -> BombPhase {
        if self.exploded {
            BombPhase::Exploded
        } else if self.age < rules.spawn_time {
            BombPhase::Spawning
        } else if self.fuse_remaining(rules) <= rules.animation.lit_time {
            BombPhase::Lit
        } else {
            BombPhase::Armed
        }
    }

    /// Apply a kick. The fuse can only get shorter: `age` is capped at
    /// `spawn_time + explosion_delay * (1 - reset_timer_on_kick)`.
    pub fn on_kicked(&mut self, speed: f32, direction: f32, rules: &BombRules) {
        self.speed = speed;
        self.direction = direction;
        self.age = self.age.min(rules.kick_age_cap());
    }

    /// Advance one tick inside a `width` x `height` field
    pub fn tick(&mut self, rules: &BombRules, width: f32, height: f32) -> BombTick {
        if self.exploded {
            return BombTick::Exploded;
        }

        let vel = self.velocity();
        self.pos += vel;
        self.speed = (self.speed * rules.v_mult - rules.v_deccel).max(0.0);

        let contact = bounce_off_walls(self.pos, rules.radius, vel, self.direction, width, height);
        self.pos = contact.pos;
        self.direction = contact.direction;

        self.age += 1;
        self.deadly =
            self.age > rules.spawn_time && self.speed >= rules.collision.speed_to_kill_players;

        if self.age > rules.fuse_end() {
            self.exploded = true;
            self.deadly = false;
            BombTick::Exploded
        } else {
            BombTick::Alive
        }
    }

    /// Mark as detonated by contact
    pub fn detonate(&mut self) {
        self.exploded = true;
        self.deadly = false;
    }

    // --- Presentation outputs (read-only for renderers) ---

    /// 0 at spawn, 1 once armed
    pub fn spawn_progress(&self, rules: &BombRules) -> f32 {
        if rules.spawn_time == 0 {
            return 1.0;
        }
        (self.age as f32 / rules.spawn_time as f32).min(1.0)
    }

    /// Vertical drop-in offset: a parabola from -RISE to 0 over the spawn phase
    pub fn rise_offset(&self, rules: &BombRules) -> f32 {
        let p = 2.0 * (self.spawn_progress(rules) - 0.5);
        BOMB_SPAWN_RISE * (p * p - 1.0)
    }

    /// Fraction of the whole fuse elapsed
    pub fn fuse_progress(&self, rules: &BombRules) -> f32 {
        let end = rules.fuse_end();
        if end == 0 {
            return 1.0;
        }
        (self.age as f32 / end as f32).min(1.0)
    }

    /// Shake amplitude, growing quadratically with the fuse
    pub fn shake(&self, rules: &BombRules) -> f32 {
        let p = self.fuse_progress(rules);
        p * p
    }

    /// Blink interval in ticks while lit; shrinks as the fuse runs out
    pub fn lit_blink_interval(&self, rules: &BombRules) -> Option<f32> {
        if self.phase(rules) != BombPhase::Lit {
            return None;
        }
        let anim = &rules.animation;
        let t = if anim.lit_time == 0 {
            0.0
        } else {
            self.fuse_remaining(rules) as f32 / anim.lit_time as f32
        };
        Some(lerp(
            anim.lit_blink_interval_final,
            anim.lit_blink_interval_initial,
            t,
        ))
    }
}
