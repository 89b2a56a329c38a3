//! Round rules
//!
//! A `RuleConfig` is fixed for the whole round. Every duration is measured in
//! simulation ticks unless the field name says otherwise.
//!
//! Partial JSON is accepted: missing fields fall back to their defaults, so an
//! options screen only has to send the values it changed.

use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;

/// Rejected configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("`{0}` must be a finite number")]
    NotFinite(&'static str),
    #[error("`{0}` must not be negative")]
    Negative(&'static str),
    #[error("`{0}` must be greater than zero")]
    NotPositive(&'static str),
    #[error("`{field}` must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("invalid rule json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Charge tuning for held kicks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargeRules {
    /// Ticks to reach a full-strength kick. 0 means instant kicks (no power control)
    pub time: u32,
    /// 1 = linear. Higher means more precision needed for a full charge
    pub precision_exp: f32,
    /// Holding past full charge decays power back toward 25%
    pub overcharged_is_weaker: bool,
}

impl Default for ChargeRules {
    fn default() -> Self {
        Self {
            time: 0,
            precision_exp: 1.0,
            overcharged_is_weaker: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KickRules {
    /// Extra distance (beyond the bomb radius) a kick connects at
    pub reach: f32,
    pub power: f32,
    pub power_mult: f32,
    pub cooldown: u32,
    /// Ticks a fired kick stays active for hit-testing
    pub duration: u32,
    pub charge: ChargeRules,
}

impl Default for KickRules {
    fn default() -> Self {
        Self {
            reach: 30.0,
            power: 8.0,
            power_mult: 1.0,
            cooldown: 60,
            duration: 10,
            charge: ChargeRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerRules {
    /// Pixels per tick along one axis
    pub speed: f32,
    /// Body radius (movement clamp, bomb contact, blast contact)
    pub radius: f32,
    /// Footprint radius used for standing on tiles
    pub ground_radius: f32,
    pub kick: KickRules,
    /// Ticks standing still over a hole before a repair lands
    pub repair_time: u32,
    /// Walking off the grid kills instead of being blocked
    pub can_fall: bool,
    pub respawn_time: u32,
}

impl Default for PlayerRules {
    fn default() -> Self {
        Self {
            speed: 2.5,
            radius: 12.0,
            ground_radius: 8.0,
            kick: KickRules::default(),
            repair_time: 14,
            can_fall: false,
            respawn_time: 480,
        }
    }
}

/// Spawn interval in ticks, interpolated over the round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnerRules {
    pub interval_initial: f32,
    pub interval_final: f32,
}

impl Default for SpawnerRules {
    fn default() -> Self {
        Self {
            interval_initial: 120.0,
            interval_final: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BombCollisionRules {
    pub speed_to_kill_players: f32,
    pub friendly_fire: bool,
    pub grace_period: u32,
}

impl Default for BombCollisionRules {
    fn default() -> Self {
        Self {
            speed_to_kill_players: 6.0,
            friendly_fire: false,
            grace_period: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BombAnimationRules {
    /// Remaining fuse (ticks) at which the bomb starts blinking
    pub lit_time: u32,
    pub lit_blink_interval_initial: f32,
    pub lit_blink_interval_final: f32,
}

impl Default for BombAnimationRules {
    fn default() -> Self {
        Self {
            lit_time: 90,
            lit_blink_interval_initial: 20.0,
            lit_blink_interval_final: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BombRules {
    pub spawn_time: u32,
    pub explosion_delay: u32,
    /// Per-tick speed multiplier
    pub v_mult: f32,
    /// Per-tick speed loss applied after `v_mult`
    pub v_deccel: f32,
    pub radius: f32,
    pub explosion_radius: f32,
    pub tile_destroy_radius: f32,
    /// 0 = a kick never touches the fuse, 1 = a kick restarts the full fuse
    pub reset_timer_on_kick: f32,
    pub collision: BombCollisionRules,
    pub animation: BombAnimationRules,
}

impl Default for BombRules {
    fn default() -> Self {
        Self {
            spawn_time: 60,
            explosion_delay: 240,
            v_mult: 0.98,
            v_deccel: 0.02,
            radius: 10.0,
            explosion_radius: 30.0,
            tile_destroy_radius: 30.0,
            reset_timer_on_kick: 0.0,
            collision: BombCollisionRules::default(),
            animation: BombAnimationRules::default(),
        }
    }
}

impl BombRules {
    /// Age at which the bomb explodes
    pub fn fuse_end(&self) -> u32 {
        self.spawn_time + self.explosion_delay
    }

    /// Largest age a bomb may keep after being kicked
    pub fn kick_age_cap(&self) -> u32 {
        let cap = self.spawn_time as f32
            + self.explosion_delay as f32 * (1.0 - self.reset_timer_on_kick);
        cap.floor() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileRules {
    pub rows: u32,
    pub cols: u32,
    pub size: f32,
}

impl Default for TileRules {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 40,
            size: 20.0,
        }
    }
}

/// Complete rule set for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleConfig {
    pub width: f32,
    pub height: f32,
    /// How far a player can enter the enemy field
    pub extra_bound: f32,
    /// Round length in seconds
    pub round_time: u32,
    pub ticks_per_second: u32,
    pub player: PlayerRules,
    pub bomb_spawner: SpawnerRules,
    pub bomb: BombRules,
    pub tiles: TileRules,
    pub four_players: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            extra_bound: 50.0,
            round_time: 60,
            ticks_per_second: TICKS_PER_SECOND,
            player: PlayerRules::default(),
            bomb_spawner: SpawnerRules::default(),
            bomb: BombRules::default(),
            tiles: TileRules::default(),
            four_players: false,
        }
    }
}

impl RuleConfig {
    /// Parse a (possibly partial) rule set and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Midline x coordinate separating the two sides
    pub fn midline(&self) -> f32 {
        self.width / 2.0
    }

    pub fn player_count(&self) -> usize {
        if self.four_players { 4 } else { 2 }
    }

    /// Builder-style kick preset application
    pub fn with_kick_style(mut self, style: KickStyle) -> Self {
        style.apply(&mut self);
        self
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        non_negative("extraBound", self.extra_bound)?;
        if self.ticks_per_second == 0 {
            return Err(ConfigError::NotPositive("ticksPerSecond"));
        }

        let p = &self.player;
        non_negative("player.speed", p.speed)?;
        non_negative("player.radius", p.radius)?;
        non_negative("player.groundRadius", p.ground_radius)?;
        non_negative("player.kick.reach", p.kick.reach)?;
        non_negative("player.kick.power", p.kick.power)?;
        non_negative("player.kick.powerMult", p.kick.power_mult)?;
        positive("player.kick.charge.precisionExp", p.kick.charge.precision_exp)?;

        positive("bombSpawner.intervalInitial", self.bomb_spawner.interval_initial)?;
        positive("bombSpawner.intervalFinal", self.bomb_spawner.interval_final)?;

        let b = &self.bomb;
        non_negative("bomb.vMult", b.v_mult)?;
        non_negative("bomb.vDeccel", b.v_deccel)?;
        non_negative("bomb.radius", b.radius)?;
        non_negative("bomb.explosionRadius", b.explosion_radius)?;
        non_negative("bomb.tileDestroyRadius", b.tile_destroy_radius)?;
        finite("bomb.resetTimerOnKick", b.reset_timer_on_kick)?;
        if !(0.0..=1.0).contains(&b.reset_timer_on_kick) {
            return Err(ConfigError::OutOfRange {
                field: "bomb.resetTimerOnKick",
                min: 0.0,
                max: 1.0,
                value: b.reset_timer_on_kick,
            });
        }
        non_negative(
            "bomb.collision.speedToKillPlayers",
            b.collision.speed_to_kill_players,
        )?;
        non_negative(
            "bomb.animation.litBlinkIntervalInitial",
            b.animation.lit_blink_interval_initial,
        )?;
        non_negative(
            "bomb.animation.litBlinkIntervalFinal",
            b.animation.lit_blink_interval_final,
        )?;

        if self.tiles.rows == 0 {
            return Err(ConfigError::NotPositive("tiles.rows"));
        }
        if self.tiles.cols == 0 {
            return Err(ConfigError::NotPositive("tiles.cols"));
        }
        positive("tiles.size", self.tiles.size)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite(field))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative(field));
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive(field));
    }
    Ok(())
}

/// Kick feel presets offered by the options screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KickStyle {
    /// Instant fixed-power kick
    #[default]
    Simple,
    /// Hold to charge, overcharging keeps full power
    HoldToCharge,
    /// Short charge window, overcharging weakens the kick
    PrecisionCharge,
}

impl KickStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            KickStyle::Simple => "Simple",
            KickStyle::HoldToCharge => "Hold to charge",
            KickStyle::PrecisionCharge => "Precision charge",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "simple" => Some(KickStyle::Simple),
            "hold" | "hold to charge" | "charge" => Some(KickStyle::HoldToCharge),
            "precision" | "precision charge" => Some(KickStyle::PrecisionCharge),
            _ => None,
        }
    }

    /// Overwrite the kick power and charge settings of `config`
    pub fn apply(&self, config: &mut RuleConfig) {
        let kick = &mut config.player.kick;
        match self {
            KickStyle::Simple => {
                kick.charge.time = 0;
                kick.power = 8.0;
            }
            KickStyle::HoldToCharge => {
                kick.charge.time = 90;
                kick.power = 12.0;
                kick.charge.overcharged_is_weaker = false;
            }
            KickStyle::PrecisionCharge => {
                kick.charge.time = 30;
                kick.power = 10.0;
                kick.charge.overcharged_is_weaker = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = RuleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.player_count(), 2);
        assert_eq!(config.midline(), 400.0);
    }

    #[test]
    fn test_partial_json_merges_with_defaults() {
        let config = RuleConfig::from_json(
            r#"{ "roundTime": 90, "bomb": { "explosionDelay": 390 }, "fourPlayers": true }"#,
        )
        .unwrap();
        assert_eq!(config.round_time, 90);
        assert_eq!(config.bomb.explosion_delay, 390);
        assert_eq!(config.bomb.spawn_time, 60);
        assert_eq!(config.player_count(), 4);
        assert_eq!(config.tiles, TileRules::default());
    }

    #[test]
    fn test_json_roundtrip_keeps_camel_case() {
        let json = RuleConfig::default().to_json().unwrap();
        assert!(json.contains("\"extraBound\""));
        assert!(json.contains("\"speedToKillPlayers\""));
        assert_eq!(RuleConfig::from_json(&json).unwrap(), RuleConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = RuleConfig::default();
        config.bomb.radius = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Negative("bomb.radius"))));

        let mut config = RuleConfig::default();
        config.tiles.cols = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive("tiles.cols"))));

        let mut config = RuleConfig::default();
        config.bomb.reset_timer_on_kick = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange { .. })));

        let mut config = RuleConfig::default();
        config.width = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::NotFinite("width"))));

        assert!(matches!(
            RuleConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_kick_age_cap() {
        let mut bomb = BombRules::default();
        assert_eq!(bomb.fuse_end(), 300);
        assert_eq!(bomb.kick_age_cap(), 300);
        bomb.reset_timer_on_kick = 1.0;
        assert_eq!(bomb.kick_age_cap(), 60);
        bomb.reset_timer_on_kick = 0.5;
        assert_eq!(bomb.kick_age_cap(), 180);
    }

    #[test]
    fn test_kick_style_presets() {
        assert_eq!(KickStyle::from_str("Precision"), Some(KickStyle::PrecisionCharge));
        assert_eq!(KickStyle::from_str("nope"), None);

        let config = RuleConfig::default().with_kick_style(KickStyle::HoldToCharge);
        assert_eq!(config.player.kick.charge.time, 90);
        assert_eq!(config.player.kick.power, 12.0);
        assert!(!config.player.kick.charge.overcharged_is_weaker);

        let config = config.with_kick_style(KickStyle::Simple);
        assert_eq!(config.player.kick.charge.time, 0);
        assert_eq!(KickStyle::Simple.as_str(), "Simple");
    }
}
