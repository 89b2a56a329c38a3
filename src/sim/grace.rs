//! Kick grace bookkeeping
//!
//! One structure owns both kinds of grace:
//! - re-kick suppression per (player, bomb) pair, so a held kick window
//!   kicks a bomb once instead of every tick;
//! - the last kicker of each bomb, who cannot be hurt by it while the
//!   grace lasts. The kicker's team is remembered afterwards for the
//!   friendly-fire rule.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tile::Side;

/// Who kicked a bomb last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickerRecord {
    /// Protected kicker; cleared when the grace runs out
    pub player: Option<u32>,
    pub team: Side,
    pub ticks_remaining: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KickGrace {
    /// (player id, bomb id) -> ticks remaining
    pairs: BTreeMap<(u32, u32), u32>,
    /// bomb id -> last kicker
    kickers: BTreeMap<u32, KickerRecord>,
}

impl KickGrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `player` may kick `bomb` right now
    pub fn can_kick(&self, player: u32, bomb: u32) -> bool {
        !self.pairs.contains_key(&(player, bomb))
    }

    /// Record a kick and start both grace timers
    pub fn register_kick(&mut self, player: u32, team: Side, bomb: u32, ticks: u32) {
        if ticks > 0 {
            self.pairs.insert((player, bomb), ticks);
        }
        self.kickers.insert(
            bomb,
            KickerRecord {
                player: (ticks > 0).then_some(player),
                team,
                ticks_remaining: ticks,
            },
        );
    }

    pub fn kicker_of(&self, bomb: u32) -> Option<&KickerRecord> {
        self.kickers.get(&bomb)
    }

    /// Player currently protected from `bomb`, if any
    pub fn protected_kicker(&self, bomb: u32) -> Option<u32> {
        self.kickers.get(&bomb).and_then(|k| k.player)
    }

    /// Whether `bomb` may kill a player of `team` with id `player`
    pub fn can_harm(&self, bomb: u32, player: u32, team: Side, friendly_fire: bool) -> bool {
        match self.kickers.get(&bomb) {
            None => true,
            Some(record) => {
                if record.player == Some(player) {
                    return false;
                }
                friendly_fire || record.team != team
            }
        }
    }

    /// Count every timer down one tick and drop the expired ones
    pub fn tick(&mut self) {
        self.pairs.retain(|_, ticks| {
            *ticks = ticks.saturating_sub(1);
            *ticks > 0
        });
        for record in self.kickers.values_mut() {
            record.ticks_remaining = record.ticks_remaining.saturating_sub(1);
            if record.ticks_remaining == 0 {
                record.player = None;
            }
        }
    }

    /// Forget everything about a removed bomb
    pub fn forget_bomb(&mut self, bomb: u32) {
        self.kickers.remove(&bomb);
        self.pairs.retain(|&(_, b), _| b != bomb);
    }
}
