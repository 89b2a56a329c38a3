//! Player entity: movement, kick charge/cooldown, repair dwell, respawn

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tile::Side;
use crate::config::{ChargeRules, KickRules, PlayerRules, RuleConfig};
use crate::consts::OVERCHARGE_FLOOR;
use crate::input::{Action, InputQuery, PlayerControls};

/// Axis-aligned movement limits for a player's center
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub min: Vec2,
    pub max: Vec2,
}

impl Boundary {
    /// Own half of the field, widened by `extra_bound` past the midline
    pub fn for_side(side: Side, config: &RuleConfig) -> Self {
        let mid = config.midline();
        match side {
            Side::Left => Self {
                min: Vec2::ZERO,
                max: Vec2::new(mid + config.extra_bound, config.height),
            },
            Side::Right => Self {
                min: Vec2::new(mid - config.extra_bound, 0.0),
                max: Vec2::new(config.width, config.height),
            },
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Keep a disc of `radius` inside. The lower bound wins if the box is
    /// narrower than the disc.
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            (self.min.x + radius).max((self.max.x - radius).min(pos.x)),
            (self.min.y + radius).max((self.max.y - radius).min(pos.y)),
        )
    }
}

/// Kick charge state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KickState {
    #[default]
    Idle,
    /// Kick held for `counter` ticks (uncapped)
    Charging { counter: u32 },
    /// Ticks left before another kick can start
    Cooldown { remaining: u32 },
}

/// A kick released this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickFired {
    pub power: f32,
}

/// What happened to a player during its own update
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerUpdate {
    pub kick: Option<KickFired>,
    pub moved: bool,
    pub respawned: bool,
}

/// Strength multiplier for a kick held `counter` ticks.
///
/// Linear up to `time`; past it either stays at 1 or decays toward 25% when
/// overcharging is punished. The result is raised to `precision_exp`.
/// Must not be called with `time == 0` (instant kicks have no charge).
pub fn charge_value(counter: u32, rules: &ChargeRules) -> f32 {
    if counter == 0 || rules.time == 0 {
        return 0.0;
    }
    let ratio = counter as f32 / rules.time as f32;
    let raw = if counter >= rules.time {
        if rules.overcharged_is_weaker {
            (2.0 - ratio).max(OVERCHARGE_FLOOR)
        } else {
            1.0
        }
    } else {
        ratio
    };
    raw.powf(rules.precision_exp)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub team: Side,
    pub controls: PlayerControls,
    pub pos: Vec2,
    /// Position at the end of the previous tick
    pub last_pos: Vec2,
    pub spawn_pos: Vec2,
    pub boundary: Boundary,
    pub kick: KickState,
    /// Ticks the last fired kick still connects with bombs
    pub kick_window: u32,
    pub kick_power: f32,
    pub repair_counter: u32,
    /// 0 means alive
    pub respawn_remaining: u32,
}

impl Player {
    pub fn new(id: u32, team: Side, controls: PlayerControls, config: &RuleConfig) -> Self {
        let boundary = Boundary::for_side(team, config);
        let spawn_pos = boundary.center();
        Self {
            id,
            team,
            controls,
            pos: spawn_pos,
            last_pos: spawn_pos,
            spawn_pos,
            boundary,
            kick: KickState::Idle,
            kick_window: 0,
            kick_power: 0.0,
            repair_counter: 0,
            respawn_remaining: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.respawn_remaining == 0
    }

    /// Alive and inside the window of a fired kick
    pub fn is_kicking(&self) -> bool {
        self.is_alive() && self.kick_window > 0
    }

    /// Current charge in [0, 1] (0 when not charging)
    pub fn charge_fraction(&self, rules: &ChargeRules) -> f32 {
        match self.kick {
            KickState::Charging { counter } => charge_value(counter, rules),
            _ => 0.0,
        }
    }

    /// Movement and kick for an alive player, respawn countdown for a dead one
    pub fn update(&mut self, input: &impl InputQuery, rules: &PlayerRules) -> PlayerUpdate {
        let mut update = PlayerUpdate::default();

        if !self.is_alive() {
            self.respawn_remaining -= 1;
            if self.respawn_remaining == 0 {
                self.respawn();
                update.respawned = true;
            }
            return update;
        }

        update.moved = self.handle_movement(input, rules);
        let kick_held = input.is_action_held(&self.controls, Action::Kick);
        update.kick = self.update_kick(kick_held, &rules.kick);
        update
    }

    fn handle_movement(&mut self, input: &impl InputQuery, rules: &PlayerRules) -> bool {
        self.last_pos = self.pos;

        let held = |action| input.is_action_held(&self.controls, action);
        let mut delta = Vec2::ZERO;
        if held(Action::Up) {
            delta.y -= rules.speed;
        }
        if held(Action::Down) {
            delta.y += rules.speed;
        }
        if held(Action::Left) {
            delta.x -= rules.speed;
        }
        if held(Action::Right) {
            delta.x += rules.speed;
        }

        // Diagonals are scaled up per axis, not normalized: diagonal movement
        // is deliberately faster than straight movement.
        if delta.x != 0.0 && delta.y != 0.0 {
            delta *= std::f32::consts::SQRT_2;
        }

        self.pos = self.boundary.clamp(self.pos + delta, rules.radius);
        self.pos != self.last_pos
    }

    fn update_kick(&mut self, held: bool, rules: &KickRules) -> Option<KickFired> {
        self.kick_window = self.kick_window.saturating_sub(1);

        match self.kick {
            KickState::Cooldown { remaining } => {
                self.kick = if remaining <= 1 {
                    KickState::Idle
                } else {
                    KickState::Cooldown {
                        remaining: remaining - 1,
                    }
                };
                None
            }
            KickState::Idle if held => {
                if rules.charge.time == 0 {
                    Some(self.fire(rules.power * rules.power_mult, rules))
                } else {
                    self.kick = KickState::Charging { counter: 1 };
                    None
                }
            }
            KickState::Idle => None,
            KickState::Charging { counter } if held => {
                self.kick = KickState::Charging {
                    counter: counter.saturating_add(1),
                };
                None
            }
            KickState::Charging { counter } => {
                let power = charge_value(counter, &rules.charge) * rules.power * rules.power_mult;
                Some(self.fire(power, rules))
            }
        }
    }

    fn fire(&mut self, power: f32, rules: &KickRules) -> KickFired {
        // The firing tick counts as the first cooldown tick
        self.kick = if rules.cooldown > 1 {
            KickState::Cooldown {
                remaining: rules.cooldown - 1,
            }
        } else {
            KickState::Idle
        };
        self.kick_window = rules.duration;
        self.kick_power = power;
        KickFired { power }
    }

    /// Count a tick of standing still toward a repair
    pub fn update_repair_dwell(&mut self) {
        if !self.is_alive() {
            return;
        }
        if self.pos == self.last_pos {
            self.repair_counter += 1;
        } else {
            self.repair_counter = 0;
        }
    }

    /// Step back to where the player stood last tick
    pub fn revert_move(&mut self) {
        self.pos = self.last_pos;
    }

    pub fn die(&mut self, rules: &PlayerRules) {
        self.kick = KickState::Idle;
        self.kick_window = 0;
        self.kick_power = 0.0;
        self.repair_counter = 0;
        self.respawn_remaining = rules.respawn_time;
        if self.respawn_remaining == 0 {
            self.respawn();
        }
    }

    fn respawn(&mut self) {
        self.pos = self.spawn_pos;
        self.last_pos = self.spawn_pos;
    }
}
