//! Bomb spawn scheduler
//!
//! The interval slides linearly from `interval_initial` (full time left) to
//! `interval_final` (no time left). The counter keeps its remainder after a
//! spawn so fractional intervals do not drift.

use serde::{Deserialize, Serialize};

use crate::config::SpawnerRules;
use crate::lerp;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BombSpawner {
    counter: f32,
}

impl BombSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target interval in ticks for the given remaining time
    pub fn interval(rules: &SpawnerRules, time_left: f32, round_time: f32) -> f32 {
        let t = if round_time > 0.0 {
            (time_left / round_time).clamp(0.0, 1.0)
        } else {
            0.0
        };
        lerp(rules.interval_final, rules.interval_initial, t)
    }

    /// Advance one tick; true when a bomb is due
    pub fn tick(&mut self, rules: &SpawnerRules, time_left: f32, round_time: f32) -> bool {
        let interval = Self::interval(rules, time_left, round_time);
        self.counter += 1.0;
        if self.counter >= interval {
            self.counter -= interval;
            true
        } else {
            false
        }
    }

    pub fn counter(&self) -> f32 {
        self.counter
    }
}
