//! Bomb Arena - a two-team bomb-kicking arena game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (players, bombs, tiles, scoring)
//! - `config`: Per-round rule parameters and presets
//! - `input`: Logical action queries consumed by the simulation

pub mod config;
pub mod input;
pub mod sim;

pub use config::{ConfigError, KickStyle, RuleConfig};
pub use input::{Action, HeldKeys, InputQuery, PlayerControls};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (the rules are tuned in ticks at this rate)
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Upper bound (exclusive) of a freshly spawned bomb's speed
    pub const BOMB_SPAWN_MAX_SPEED: f32 = 5.0;
    /// How far a spawning bomb drops in from above (pixels)
    pub const BOMB_SPAWN_RISE: f32 = 100.0;
    /// Overcharged kicks never fall below this fraction of full power
    pub const OVERCHARGE_FLOOR: f32 = 0.25;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Direction (radians) pointing from `from` toward `to`
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1)
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
