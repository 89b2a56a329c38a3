//! Field state and core simulation types
//!
//! Everything a round needs lives in `FieldSimulation`. Restarting a round
//! builds a fresh one; nothing is reset piecemeal.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bomb::Bomb;
use super::clock::RoundClock;
use super::grace::KickGrace;
use super::player::Player;
use super::spawner::BombSpawner;
use super::tile::{Score, Side, TileGrid};
use crate::config::{ConfigError, RuleConfig};
use crate::input::PlayerControls;

/// How a finished round went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Winner(Side),
    Draw,
}

impl RoundOutcome {
    pub fn from_score(score: Score) -> Self {
        match score.leader() {
            Some(side) => RoundOutcome::Winner(side),
            None => RoundOutcome::Draw,
        }
    }
}

/// Why a bomb went off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionCause {
    /// Fuse ran out
    Timer,
    /// A deadly bomb hit this player
    Contact { player: u32 },
}

/// Why a player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Blast { bomb: u32 },
    /// Stood on no living tile with falling enabled
    Fall,
}

/// Things that happened during a tick, in the order they happened.
/// Presentation (sound, particles) reacts to these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BombSpawned { bomb: u32, pos: Vec2 },
    KickFired { player: u32, power: f32 },
    BombKicked { bomb: u32, player: u32, speed: f32 },
    BombExploded { bomb: u32, pos: Vec2, cause: ExplosionCause },
    TilesDestroyed { bomb: u32, count: usize },
    PlayerKilled { player: u32, cause: DeathCause },
    PlayerRespawned { player: u32 },
    TileRepaired { player: u32, tile: usize },
    SecondElapsed { time_left: u32 },
    RoundOver { outcome: RoundOutcome },
}

/// Complete round state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct FieldSimulation {
    pub config: RuleConfig,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub grid: TileGrid,
    /// Roster, ordered by id
    pub players: Vec<Player>,
    /// Live bombs, ordered by id
    pub bombs: Vec<Bomb>,
    pub spawner: BombSpawner,
    pub clock: RoundClock,
    pub grace: KickGrace,
    pub score: Score,
    /// Set once the round has ended
    pub outcome: Option<RoundOutcome>,
    next_id: u32,
}

impl FieldSimulation {
    /// Validate the rules and set up a round
    pub fn new(config: RuleConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// Throw the whole round away and start over with the same rules
    pub fn restart(&self, seed: u64) -> Self {
        log::info!("Restarting round with seed {}", seed);
        Self::build(self.config.clone(), seed)
    }

    fn build(config: RuleConfig, seed: u64) -> Self {
        let grid = TileGrid::new(&config);
        let score = grid.score_by_side();

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            grid,
            players: Vec::new(),
            bombs: Vec::new(),
            spawner: BombSpawner::new(),
            clock: RoundClock::new(config.round_time, config.ticks_per_second),
            grace: KickGrace::new(),
            score,
            outcome: None,
            next_id: 1,
            config,
        };

        for slot in 0..state.config.player_count() {
            let team = if slot % 2 == 0 { Side::Left } else { Side::Right };
            let player = Player::new(
                slot as u32,
                team,
                PlayerControls::preset(slot),
                &state.config,
            );
            state.players.push(player);
        }

        log::info!(
            "Round start: {} players, {}s, {}x{} tiles, seed {}",
            state.players.len(),
            state.config.round_time,
            state.config.tiles.cols,
            state.config.tiles.rows,
            seed
        );
        state
    }

    /// Allocate a new bomb ID (monotonic for the round)
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Uniformly random point inside the field
    pub fn random_field_point(&mut self) -> Vec2 {
        Vec2::new(
            self.rng.random_range(0.0..self.config.width),
            self.rng.random_range(0.0..self.config.height),
        )
    }

    /// Place a new bomb; returns its id
    pub fn spawn_bomb(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let bomb = Bomb::spawn(id, pos, &mut self.rng);
        log::debug!(
            "Bomb {} spawned at ({:.1}, {:.1}) speed {:.2}",
            id,
            pos.x,
            pos.y,
            bomb.speed
        );
        self.bombs.push(bomb);
        id
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn bomb(&self, id: u32) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.id == id)
    }

    pub fn alive_player_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    pub fn is_round_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.players.sort_by_key(|p| p.id);
        self.bombs.sort_by_key(|b| b.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_or_four_players() {
        let sim = FieldSimulation::new(RuleConfig::default(), 1).unwrap();
        assert_eq!(sim.players.len(), 2);
        assert_eq!(sim.alive_player_count(), 2);
        assert_eq!(sim.players[0].team, Side::Left);
        assert_eq!(sim.players[1].team, Side::Right);

        let config = RuleConfig {
            four_players: true,
            ..RuleConfig::default()
        };
        let sim = FieldSimulation::new(config, 1).unwrap();
        assert_eq!(sim.players.len(), 4);
        let left = sim.players.iter().filter(|p| p.team == Side::Left).count();
        assert_eq!(left, 2);
        assert_ne!(sim.players[0].controls, sim.players[2].controls);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RuleConfig::default();
        config.bomb_spawner.interval_final = 0.0;
        assert!(FieldSimulation::new(config, 1).is_err());
    }

    #[test]
    fn test_bomb_ids_unique_and_monotonic() {
        let mut sim = FieldSimulation::new(RuleConfig::default(), 5).unwrap();
        let mut last = 0;
        for _ in 0..50 {
            let pos = sim.random_field_point();
            let id = sim.spawn_bomb(pos);
            assert!(id > last);
            last = id;
        }
        let mut ids: Vec<u32> = sim.bombs.iter().map(|b| b.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_random_points_inside_field() {
        let mut sim = FieldSimulation::new(RuleConfig::default(), 42).unwrap();
        for _ in 0..500 {
            let p = sim.random_field_point();
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..400.0).contains(&p.y));
        }
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut sim = FieldSimulation::new(RuleConfig::default(), 3).unwrap();
        sim.spawn_bomb(Vec2::new(100.0, 100.0));
        sim.grid.damage_area(Vec2::new(100.0, 100.0), 30.0);
        sim.players[0].die(&sim.config.player);

        let fresh = sim.restart(4);
        assert!(fresh.bombs.is_empty());
        assert_eq!(fresh.grid.score_by_side().total(), 800);
        assert_eq!(fresh.alive_player_count(), 2);
        assert_eq!(fresh.seed, 4);
        assert_eq!(fresh.config, sim.config);
    }

    #[test]
    fn test_outcome_from_score() {
        assert_eq!(
            RoundOutcome::from_score(Score { left: 10, right: 4 }),
            RoundOutcome::Winner(Side::Left)
        );
        assert_eq!(RoundOutcome::from_score(Score { left: 4, right: 4 }), RoundOutcome::Draw);
    }
}
