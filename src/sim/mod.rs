//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio, or platform dependencies

pub mod bomb;
pub mod clock;
pub mod collision;
pub mod grace;
pub mod player;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod tile;

pub use bomb::{Bomb, BombPhase, BombTick};
pub use clock::{FixedStep, RoundClock};
pub use collision::{WallContact, bounce_off_walls, circles_overlap};
pub use grace::{KickGrace, KickerRecord};
pub use player::{Boundary, KickFired, KickState, Player, PlayerUpdate, charge_value};
pub use snapshot::{BombView, FieldSnapshot, PlayerView, TileView};
pub use spawner::BombSpawner;
pub use state::{DeathCause, ExplosionCause, FieldSimulation, GameEvent, RoundOutcome};
pub use tick::tick;
pub use tile::{Score, Side, Tile, TileGrid};
