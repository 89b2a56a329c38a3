//! Read-only view of a round for renderers, replays, and tests
//!
//! A snapshot holds plain data only. Two simulations fed the same seed and
//! inputs produce equal snapshots tick for tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bomb::BombPhase;
use super::state::{FieldSimulation, RoundOutcome};
use super::tile::{Score, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombView {
    pub id: u32,
    pub pos: Vec2,
    pub phase: BombPhase,
    pub deadly: bool,
    /// Ticks until the timer explosion
    pub fuse_remaining: u32,
    /// Vertical drop-in offset while spawning
    pub rise_offset: f32,
    /// Blink period in ticks while lit
    pub blink_interval: Option<f32>,
    /// Team of the last player to kick it
    pub kicker_team: Option<Side>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: u32,
    pub team: Side,
    pub pos: Vec2,
    pub alive: bool,
    pub kicking: bool,
    /// Kick charge in [0, 1]
    pub charge: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub alive: bool,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub tick: u64,
    pub time_left: u32,
    pub score: Score,
    pub outcome: Option<RoundOutcome>,
    pub bombs: Vec<BombView>,
    pub players: Vec<PlayerView>,
    /// Row-major, `cols` per row
    pub tiles: Vec<TileView>,
    pub rows: u32,
    pub cols: u32,
    pub tile_size: f32,
}

impl FieldSnapshot {
    pub fn is_round_over(&self) -> bool {
        self.outcome.is_some()
    }
}

impl FieldSimulation {
    pub fn snapshot(&self) -> FieldSnapshot {
        let bomb_rules = &self.config.bomb;
        let charge_rules = &self.config.player.kick.charge;

        FieldSnapshot {
            tick: self.clock.elapsed_ticks(),
            time_left: self.clock.time_left(),
            score: self.score,
            outcome: self.outcome,
            bombs: self
                .bombs
                .iter()
                .map(|b| BombView {
                    id: b.id,
                    pos: b.pos,
                    phase: b.phase(bomb_rules),
                    deadly: b.deadly,
                    fuse_remaining: b.fuse_remaining(bomb_rules),
                    rise_offset: b.rise_offset(bomb_rules),
                    blink_interval: b.lit_blink_interval(bomb_rules),
                    kicker_team: self.grace.kicker_of(b.id).map(|k| k.team),
                })
                .collect(),
            players: self
                .players
                .iter()
                .map(|p| PlayerView {
                    id: p.id,
                    team: p.team,
                    pos: p.pos,
                    alive: p.is_alive(),
                    kicking: p.is_kicking(),
                    charge: p.charge_fraction(charge_rules),
                })
                .collect(),
            tiles: self
                .grid
                .tiles()
                .iter()
                .map(|t| TileView {
                    alive: t.alive,
                    active: t.active,
                })
                .collect(),
            rows: self.grid.rows(),
            cols: self.grid.cols(),
            tile_size: self.grid.tile_size(),
        }
    }
}
