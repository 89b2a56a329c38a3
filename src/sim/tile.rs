//! Destructible floor grid
//!
//! The score of a side is the number of its tiles still alive, so the grid
//! is the only place scoring state lives.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::circles_overlap;
use crate::config::RuleConfig;

/// One half of the field, and the team defending it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Side that owns x coordinate `x`
    pub fn of_x(x: f32, midline: f32) -> Self {
        if x < midline { Side::Left } else { Side::Right }
    }
}

/// A single floor tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub pos: Vec2,
    pub side: Side,
    pub alive: bool,
    /// A living player stands on it this tick
    pub active: bool,
}

/// Alive tiles per side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn total(&self) -> u32 {
        self.left + self.right
    }

    /// Side with more alive tiles, `None` on a tie
    pub fn leader(&self) -> Option<Side> {
        match self.left.cmp(&self.right) {
            std::cmp::Ordering::Greater => Some(Side::Left),
            std::cmp::Ordering::Less => Some(Side::Right),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Row-major tile grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    rows: u32,
    cols: u32,
    size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build a fully alive grid; tile centers sit half a tile in from the corner
    pub fn new(config: &RuleConfig) -> Self {
        let rows = config.tiles.rows;
        let cols = config.tiles.cols;
        let size = config.tiles.size;
        let midline = config.midline();

        let mut tiles = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let pos = Vec2::new(
                    col as f32 * size + size / 2.0,
                    row as f32 * size + size / 2.0,
                );
                tiles.push(Tile {
                    pos,
                    side: Side::of_x(pos.x, midline),
                    alive: true,
                    active: false,
                });
            }
        }

        Self {
            rows,
            cols,
            size,
            tiles,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn tile_size(&self) -> f32 {
        self.size
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| (row * self.cols + col) as usize)
    }

    /// Indices of every tile (alive or not) under a disc of `radius`
    pub fn tiles_under(&self, pos: Vec2, radius: f32) -> Vec<usize> {
        let half = self.size / 2.0;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| circles_overlap(pos, radius, t.pos, half))
            .map(|(i, _)| i)
            .collect()
    }

    /// Recompute `active` flags from the standing players.
    ///
    /// `footprints` holds one `Some(position)` per alive player (`None` for a
    /// dead one). Returns, per footprint, every tile under it.
    pub fn rebuild_occupancy(
        &mut self,
        footprints: &[Option<Vec2>],
        ground_radius: f32,
    ) -> Vec<Vec<usize>> {
        for tile in &mut self.tiles {
            tile.active = false;
        }

        footprints
            .iter()
            .map(|footprint| {
                let Some(pos) = footprint else {
                    return Vec::new();
                };
                let hits = self.tiles_under(*pos, ground_radius);
                for &i in &hits {
                    if self.tiles[i].alive {
                        self.tiles[i].active = true;
                    }
                }
                hits
            })
            .collect()
    }

    /// Destroy alive tiles caught in a blast; returns how many fell
    pub fn damage_area(&mut self, center: Vec2, radius: f32) -> usize {
        let half = self.size / 2.0;
        let mut destroyed = 0;
        for tile in &mut self.tiles {
            if tile.alive && circles_overlap(center, radius, tile.pos, half) {
                tile.alive = false;
                tile.active = false;
                destroyed += 1;
            }
        }
        destroyed
    }

    /// Bring a destroyed tile back. Returns false if it was already alive
    pub fn repair_tile(&mut self, index: usize) -> bool {
        match self.tiles.get_mut(index) {
            Some(tile) if !tile.alive => {
                tile.alive = true;
                true
            }
            _ => false,
        }
    }

    pub fn any_alive(&self, candidates: &[usize]) -> bool {
        candidates
            .iter()
            .any(|&i| self.tiles.get(i).is_some_and(|t| t.alive))
    }

    /// Destroyed tiles among `candidates`, nearest to `pos` first
    pub fn destroyed_by_distance(&self, pos: Vec2, candidates: &[usize]) -> Vec<usize> {
        let mut destroyed: Vec<(usize, f32)> = candidates
            .iter()
            .filter_map(|&i| self.tiles.get(i).map(|t| (i, t)))
            .filter(|(_, t)| !t.alive)
            .map(|(i, t)| (i, t.pos.distance_squared(pos)))
            .collect();
        destroyed.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        destroyed.into_iter().map(|(i, _)| i).collect()
    }

    /// Nearest destroyed tile among `candidates`
    pub fn nearest_destroyed(&self, pos: Vec2, candidates: &[usize]) -> Option<usize> {
        self.destroyed_by_distance(pos, candidates).first().copied()
    }

    pub fn score_by_side(&self) -> Score {
        self.tiles
            .iter()
            .filter(|t| t.alive)
            .fold(Score::default(), |mut score, t| {
                match t.side {
                    Side::Left => score.left += 1,
                    Side::Right => score.right += 1,
                }
                score
            })
    }
}
