//! Runtime gameplay configuration loaded from `assets/arena.toml`.
//!
//! [`ArenaConfig`] is a Bevy [`Resource`] that mirrors the gameplay constants
//! in [`crate::constants`]. At startup, [`load_arena_config`] reads
//! `assets/arena.toml` and overwrites the defaults with any values present in
//! the file. Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `ArenaConfig::default()`.

use crate::constants::*;
use crate::error::{validate_spawn_speedup, MotionResult};
use crate::math::clamp_angle_deg;
use bevy::prelude::*;
use serde::Deserialize;

pub const ARENA_CONFIG_PATH: &str = "assets/arena.toml";

/// Runtime-tunable gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // ── Enemy: Body ───────────────────────────────────────────────────────────
    pub enemy_upright_strength: f32,
    pub enemy_look_strength: f32,
    pub neck_spring: f32,
    pub neck_break_force: f32,
    pub arm_spring: f32,
    pub arm_break_force: f32,
    pub enemy_hover_force: f32,
    pub enemy_hover_height: f32,
    pub hard_variant_scale: f32,
    pub limb_damping: f32,

    // ── Enemy: Pursuit ────────────────────────────────────────────────────────
    pub enemy_push_force: f32,
    pub enemy_push_point_ratio: f32,
    pub enemy_facing_angle_deg: f32,
    pub collapse_strength: f32,
    pub collapse_break_angle_deg: f32,

    // ── Appendages ────────────────────────────────────────────────────────────
    pub dead_mass_scale: f32,
    pub appendage_despawn_secs: f32,

    // ── Spawner ───────────────────────────────────────────────────────────────
    pub spawn_time: f32,
    pub spawn_speedup: f32,
    pub min_spawn_time: f32,
    pub max_enemies: u32,
    pub spawn_batch: u32,
    pub hard_mode_threshold: f32,
    pub hard_mode_time_scale: f32,
    pub spawn_clear_radius: f32,
    pub player_near_distance: f32,
    pub player_look_angle_deg: f32,

    // ── Session ───────────────────────────────────────────────────────────────
    pub starting_health: u32,
    pub wipe_secs: f32,
    pub wipe_retry_secs: f32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player_speed: f32,
    pub player_max_speed: f32,
    pub player_turn_speed_deg: f32,
    pub player_pitch_min_deg: f32,
    pub player_pitch_max_deg: f32,

    // ── Weapon ────────────────────────────────────────────────────────────────
    pub fire_delay: f32,
    pub weapon_range: f32,
    pub weapon_slerp_rate: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,

    // ── Bomb ──────────────────────────────────────────────────────────────────
    pub bomb_launch_impulse: f32,
    pub bomb_blast_radius: f32,
    pub bomb_power: f32,
    pub bomb_fuse_secs: f32,
    pub bomb_cooldown_secs: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            // Enemy: Body
            enemy_upright_strength: ENEMY_UPRIGHT_STRENGTH,
            enemy_look_strength: ENEMY_LOOK_STRENGTH,
            neck_spring: NECK_SPRING,
            neck_break_force: NECK_BREAK_FORCE,
            arm_spring: ARM_SPRING,
            arm_break_force: ARM_BREAK_FORCE,
            enemy_hover_force: ENEMY_HOVER_FORCE,
            enemy_hover_height: ENEMY_HOVER_HEIGHT,
            hard_variant_scale: HARD_VARIANT_SCALE,
            limb_damping: LIMB_DAMPING,
            // Enemy: Pursuit
            enemy_push_force: ENEMY_PUSH_FORCE,
            enemy_push_point_ratio: ENEMY_PUSH_POINT_RATIO,
            enemy_facing_angle_deg: ENEMY_FACING_ANGLE_DEG,
            collapse_strength: COLLAPSE_STRENGTH,
            collapse_break_angle_deg: COLLAPSE_BREAK_ANGLE_DEG,
            // Appendages
            dead_mass_scale: DEAD_MASS_SCALE,
            appendage_despawn_secs: APPENDAGE_DESPAWN_SECS,
            // Spawner
            spawn_time: SPAWN_TIME,
            spawn_speedup: SPAWN_SPEEDUP,
            min_spawn_time: MIN_SPAWN_TIME,
            max_enemies: MAX_ENEMIES,
            spawn_batch: SPAWN_BATCH,
            hard_mode_threshold: HARD_MODE_THRESHOLD,
            hard_mode_time_scale: HARD_MODE_TIME_SCALE,
            spawn_clear_radius: SPAWN_CLEAR_RADIUS,
            player_near_distance: PLAYER_NEAR_DISTANCE,
            player_look_angle_deg: PLAYER_LOOK_ANGLE_DEG,
            // Session
            starting_health: STARTING_HEALTH,
            wipe_secs: WIPE_SECS,
            wipe_retry_secs: WIPE_RETRY_SECS,
            // Player
            player_speed: PLAYER_SPEED,
            player_max_speed: PLAYER_MAX_SPEED,
            player_turn_speed_deg: PLAYER_TURN_SPEED_DEG,
            player_pitch_min_deg: PLAYER_PITCH_MIN_DEG,
            player_pitch_max_deg: PLAYER_PITCH_MAX_DEG,
            // Weapon
            fire_delay: FIRE_DELAY,
            weapon_range: WEAPON_RANGE,
            weapon_slerp_rate: WEAPON_SLERP_RATE,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            // Bomb
            bomb_launch_impulse: BOMB_LAUNCH_IMPULSE,
            bomb_blast_radius: BOMB_BLAST_RADIUS,
            bomb_power: BOMB_POWER,
            bomb_fuse_secs: BOMB_FUSE_SECS,
            bomb_cooldown_secs: BOMB_COOLDOWN_SECS,
        }
    }
}

impl ArenaConfig {
    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Reject values the spawner or camera cannot work with.
    pub fn validate(&self) -> MotionResult<()> {
        validate_spawn_speedup(self.spawn_speedup)?;
        clamp_angle_deg(0.0, self.player_pitch_min_deg, self.player_pitch_max_deg)?;
        Ok(())
    }
}

/// Startup system: attempt to load `assets/arena.toml` and overwrite the
/// `ArenaConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults. Parse or validation errors
/// are logged but do not abort the game. A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_arena_config(mut config: ResMut<ArenaConfig>) {
    let path = ARENA_CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match ArenaConfig::from_toml(&contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => {
                    *config = loaded;
                    println!("✓ Loaded arena config from {path}");
                }
                Err(e) => warn!("Rejected {path}: {e}; using defaults"),
            },
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present; defaults are already in place.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ArenaConfig::from_toml("spawn_time = 2.5\nmax_enemies = 8\n").unwrap();
        assert_eq!(cfg.spawn_time, 2.5);
        assert_eq!(cfg.max_enemies, 8);
        assert_eq!(cfg.spawn_speedup, SPAWN_SPEEDUP);
        assert_eq!(cfg.neck_spring, NECK_SPRING);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(ArenaConfig::from_toml("spawn_time = \"soon\"").is_err());
    }

    #[test]
    fn runaway_speedup_is_rejected() {
        let cfg = ArenaConfig {
            spawn_speedup: 1.2,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_pitch_limits_are_rejected() {
        let cfg = ArenaConfig {
            player_pitch_min_deg: 30.0,
            player_pitch_max_deg: -30.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
