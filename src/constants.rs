//! Centralised motion and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place. [`crate::config::ArenaConfig`] mirrors the gameplay
//! subset so it can be overridden from `assets/arena.toml` without a rebuild.

// ── Force generators ──────────────────────────────────────────────────────────

/// Default torque scale of a stabilizer.
pub const DEFAULT_STABILIZER_STRENGTH: f32 = 1.0;

/// Offset added to each component of a stabilizer's world axis when the angle
/// error lands on 90°, 180° or 270°, where the cross product degenerates.
pub const SINGULAR_AXIS_NUDGE: f32 = 0.01;

/// Default spring constant of a directional joint (force per world unit).
pub const DEFAULT_JOINT_SPRING: f32 = 100.0;

/// Default repulsor force per unit of compression.
pub const DEFAULT_REPULSOR_FORCE: f32 = 100.0;

/// Default repulsor probe length (world units).
pub const DEFAULT_REPULSOR_MAX_DISTANCE: f32 = 1.0;

// ── Enemy: Body ───────────────────────────────────────────────────────────────

/// Strength of the torso and head upright stabilizers.
///
/// Above ~2.0 the torque overshoots within one step and bodies jitter.
pub const ENEMY_UPRIGHT_STRENGTH: f32 = 1.0;

/// Strength of the torso and head look stabilizers.
pub const ENEMY_LOOK_STRENGTH: f32 = 0.5;

/// Spring constant of the neck joint holding the head above the torso.
///
/// With a ~0.07 kg head this keeps `sqrt(k/m)·dt` well under 1 at 64 Hz;
/// much stiffer springs oscillate.
pub const NECK_SPRING: f32 = 40.0;

/// Neck joint break force. A solid hit to the head exceeds this and
/// decapitates the enemy.
pub const NECK_BREAK_FORCE: f32 = 15.0;

/// Spring constant of arm joints.
pub const ARM_SPRING: f32 = 10.0;

/// Arm joint break force.
pub const ARM_BREAK_FORCE: f32 = 4.0;

/// Repulsor force holding the torso off the ground.
pub const ENEMY_HOVER_FORCE: f32 = 60.0;

/// Repulsor probe length below the torso (world units).
pub const ENEMY_HOVER_HEIGHT: f32 = 0.6;

/// Force and break multiplier for the hard enemy variant.
pub const HARD_VARIANT_SCALE: f32 = 1.5;

/// Damping ratio used on neck and arm joints.
pub const LIMB_DAMPING: f32 = 0.3;

// ── Enemy: Pursuit ────────────────────────────────────────────────────────────

/// Horizontal push applied to the torso while it faces its target.
pub const ENEMY_PUSH_FORCE: f32 = 4.0;

/// Height of the push point as a fraction of the torso's local Y.
///
/// Negative values push below the centre, which keeps the torso from
/// tipping forward over the push.
pub const ENEMY_PUSH_POINT_RATIO: f32 = -0.25;

/// The torso is only pushed while its forward axis is within this angle
/// (degrees) of the pursuit direction.
pub const ENEMY_FACING_ANGLE_DEG: f32 = 30.0;

/// Upright stabilizer strength after decapitation; negative so the body topples.
pub const COLLAPSE_STRENGTH: f32 = -3.0;

/// Upright stabilizer break angle after decapitation (degrees).
pub const COLLAPSE_BREAK_ANGLE_DEG: f32 = 25.0;

// ── Appendages ────────────────────────────────────────────────────────────────

/// Mass multiplier applied to an appendage when it dies.
pub const DEAD_MASS_SCALE: f32 = 1.0 / 3.0;

/// Seconds a dead appendage lingers before it is despawned.
pub const APPENDAGE_DESPAWN_SECS: f32 = 30.0;

// ── Spawner ───────────────────────────────────────────────────────────────────

/// Initial interval between spawn batches (seconds).
pub const SPAWN_TIME: f32 = 5.0;

/// Interval multiplier applied after every batch.
pub const SPAWN_SPEEDUP: f32 = 0.9;

/// Intervals shorter than this collapse to zero (spawn every frame).
pub const MIN_SPAWN_TIME: f32 = 0.1;

/// No batches are requested while this many enemies are alive.
pub const MAX_ENEMIES: u32 = 50;

/// Enemies requested per batch.
pub const SPAWN_BATCH: u32 = 2;

/// Hard variants spawn when `atan(game_time / HARD_MODE_TIME_SCALE) · U(0,1)`
/// exceeds this.
pub const HARD_MODE_THRESHOLD: f32 = 0.7;

/// Game time (seconds) scale of the hard-variant ramp.
pub const HARD_MODE_TIME_SCALE: f32 = 100.0;

/// A spawn point with an enemy inside this radius is occupied.
pub const SPAWN_CLEAR_RADIUS: f32 = 2.0;

/// Spawn points closer than this to the player are skipped.
pub const PLAYER_NEAR_DISTANCE: f32 = 20.0;

/// Spawn points within this angle (degrees) of the player's view are skipped.
pub const PLAYER_LOOK_ANGLE_DEG: f32 = 30.0;

// ── Session ───────────────────────────────────────────────────────────────────

/// Hits the player can absorb before the next one ends the game.
pub const STARTING_HEALTH: u32 = 3;

/// Duration of the wipe after the player is hit (seconds).
pub const WIPE_SECS: f32 = 5.0;

/// Retry interval for ending a wipe that finished while paused (seconds).
pub const WIPE_RETRY_SECS: f32 = 1.0;

// ── Player ────────────────────────────────────────────────────────────────────

/// Velocity added per fixed step per unit of movement input.
pub const PLAYER_SPEED: f32 = 0.8;

/// Horizontal speed cap for the player (world units per second).
pub const PLAYER_MAX_SPEED: f32 = 12.0;

/// Yaw rate while a turn key is held (degrees per second).
pub const PLAYER_TURN_SPEED_DEG: f32 = 120.0;

/// Camera pitch limits (degrees); positive looks up.
pub const PLAYER_PITCH_MIN_DEG: f32 = -60.0;
pub const PLAYER_PITCH_MAX_DEG: f32 = 60.0;

// ── Weapon ────────────────────────────────────────────────────────────────────

/// Seconds between automatic shots while a target is under the crosshair.
pub const FIRE_DELAY: f32 = 0.5;

/// Targeting ray length from the camera (world units).
pub const WEAPON_RANGE: f32 = 50.0;

/// Rate at which the gun swings back to the view with no target in sight.
pub const WEAPON_SLERP_RATE: f32 = 2.0;

/// Muzzle speed of a projectile (world units per second).
pub const PROJECTILE_SPEED: f32 = 40.0;

/// Seconds before an unspent projectile is despawned.
pub const PROJECTILE_LIFETIME: f32 = 5.0;

/// Projectile collider radius.
pub const PROJECTILE_RADIUS: f32 = 0.12;

/// Projectile collider density. Dense enough that a head shot snaps the neck.
pub const PROJECTILE_DENSITY: f32 = 40.0;

// ── Bomb ──────────────────────────────────────────────────────────────────────

/// Bomb mass (kg); the launch impulse is divided by this.
pub const BOMB_MASS: f32 = 1.0;

/// Launch impulse along the aim direction.
pub const BOMB_LAUNCH_IMPULSE: f32 = 50.0;

/// Reach of both the proximity trigger and the blast.
pub const BOMB_BLAST_RADIUS: f32 = 5.0;

/// Impulse delivered at the centre of the blast; fades linearly to zero at
/// [`BOMB_BLAST_RADIUS`].
pub const BOMB_POWER: f32 = 10.0;

/// Delay between a target entering the blast radius and the explosion.
pub const BOMB_FUSE_SECS: f32 = 1.0;

/// Seconds a spent bomb lingers (hidden) before it is despawned.
pub const BOMB_LINGER_SECS: f32 = 1.0;

/// Minimum interval between bomb launches.
pub const BOMB_COOLDOWN_SECS: f32 = 5.0;
