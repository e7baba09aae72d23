//! Player armament: a gun that fires on its own at ragdoll parts under the
//! crosshair, and sticky proximity bombs on a cooldown.
//!
//! ## Gun
//!
//! Each frame a ray from the eye looks for a [`BodyPart`]. With one in sight
//! the gun turns straight at the hit point, otherwise it eases back toward
//! the view. A shot leaves when the cooldown is ready and a second ray, cast
//! from the muzzle along the gun, confirms the target. Projectiles are dense
//! balls; the joints they knock loose do the damage. Unspent ones expire
//! through [`DespawnTimer`].
//!
//! ## Bomb
//!
//! A bomb sticks to the first thing it touches. Once any ragdoll part comes
//! within its blast radius the fuse is lit, and when it burns down every part
//! in range receives an outward impulse that fades linearly with distance.

use crate::appendage::DespawnTimer;
use crate::config::ArenaConfig;
use crate::constants::{BOMB_LINGER_SECS, BOMB_MASS, PROJECTILE_DENSITY, PROJECTILE_RADIUS};
use crate::enemy::BodyPart;
use crate::player::{keyboard_to_intent_system, Player, PlayerIntent, PlayerLook, EYE_HEIGHT};
use crate::session::GameSession;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Muzzle position in view space: right of, below and ahead of the eye.
const MUZZLE_OFFSET: Vec3 = Vec3::new(0.3, -0.25, -0.8);

const BOMB_RADIUS: f32 = 0.15;

// ── Cooldown ──────────────────────────────────────────────────────────────────

/// Countdown gating a repeatable action; ready at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Cooldown {
    remaining: f32,
}

impl Cooldown {
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Start a `duration` cooldown if ready. Returns whether the action may go.
    pub fn trigger(&mut self, duration: f32) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.remaining = duration.max(0.0);
        true
    }
}

// ── Components ────────────────────────────────────────────────────────────────

/// The player's gun. `aim` is its world rotation, forward on −Z like the
/// camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct Weapon {
    pub aim: Quat,
    pub cooldown: Cooldown,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            aim: Quat::IDENTITY,
            cooldown: Cooldown::default(),
        }
    }
}

impl Weapon {
    pub fn forward(&self) -> Vec3 {
        self.aim * Vec3::NEG_Z
    }

    /// Turn at `target` when there is one, otherwise ease toward `view`.
    /// Returns whether a target is locked.
    pub fn track(
        &mut self,
        muzzle: Vec3,
        view: Quat,
        target: Option<Vec3>,
        slerp_rate: f32,
        dt: f32,
    ) -> bool {
        match target.and_then(|point| (point - muzzle).try_normalize()) {
            Some(direction) => {
                self.aim = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
                true
            }
            None => {
                self.aim = self.aim.slerp(view, (slerp_rate * dt).clamp(0.0, 1.0));
                false
            }
        }
    }
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct BombLauncher {
    pub cooldown: Cooldown,
}

#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Projectile;

/// Where a stuck bomb sits in the frame of the thing it hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub entity: Entity,
    pub local_offset: Vec3,
}

impl Attachment {
    /// Pin the world `point` to `surface`'s frame.
    pub fn new(entity: Entity, surface: &Transform, point: Vec3) -> Self {
        Self {
            entity,
            local_offset: surface.rotation.inverse() * (point - surface.translation),
        }
    }

    pub fn world_position(&self, surface: &Transform) -> Vec3 {
        surface.translation + surface.rotation * self.local_offset
    }
}

#[derive(Component, Debug, Clone)]
pub struct Bomb {
    pub blast_radius: f32,
    /// Impulse at the centre of the blast.
    pub power: f32,
    fuse_secs: f32,
    fuse: Option<f32>,
    exploded: bool,
    attachment: Option<Attachment>,
}

impl Bomb {
    pub fn new(blast_radius: f32, power: f32, fuse_secs: f32) -> Self {
        Self {
            blast_radius,
            power,
            fuse_secs,
            fuse: None,
            exploded: false,
            attachment: None,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.bomb_blast_radius, config.bomb_power, config.bomb_fuse_secs)
    }

    pub fn is_armed(&self) -> bool {
        self.fuse.is_some()
    }

    pub fn has_exploded(&self) -> bool {
        self.exploded
    }

    pub fn attachment(&self) -> Option<Attachment> {
        self.attachment
    }

    /// Stick to a surface. Only the first contact counts.
    pub fn attach(&mut self, attachment: Attachment) -> bool {
        if self.attachment.is_some() {
            return false;
        }
        self.attachment = Some(attachment);
        true
    }

    /// Advance the fuse. A target in range lights it; once lit it burns down
    /// whether or not the target stays. Returns `true` once, on the tick the
    /// bomb goes off.
    pub fn tick(&mut self, dt: f32, target_in_range: bool) -> bool {
        if self.exploded {
            return false;
        }
        match self.fuse.as_mut() {
            None => {
                if target_in_range {
                    self.fuse = Some(self.fuse_secs);
                }
                false
            }
            Some(remaining) => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return false;
                }
                self.exploded = true;
                true
            }
        }
    }
}

/// Impulse on a body at `position` from a blast at `center`: `power` at the
/// centre, fading linearly to zero at `radius`, pointing away from the
/// centre (straight up for a body sitting on it).
pub fn explosion_impulse(center: Vec3, position: Vec3, power: f32, radius: f32) -> Vec3 {
    let offset = position - center;
    let distance = offset.length();
    if radius <= 0.0 || distance >= radius {
        return Vec3::ZERO;
    }
    offset.try_normalize().unwrap_or(Vec3::Y) * power * (1.0 - distance / radius)
}

/// World position of the muzzle for a body looking along `look`.
pub fn muzzle_position(body: &Transform, look: &PlayerLook) -> Vec3 {
    body.translation + Vec3::Y * EYE_HEIGHT + look.view_rotation() * MUZZLE_OFFSET
}

// ── Spawning ──────────────────────────────────────────────────────────────────

pub fn projectile_bundle(config: &ArenaConfig, muzzle: Vec3, aim: Quat) -> impl Bundle {
    (
        Projectile,
        Transform::from_translation(muzzle).with_rotation(aim),
        RigidBody::Dynamic,
        Collider::ball(PROJECTILE_RADIUS),
        ColliderMassProperties::Density(PROJECTILE_DENSITY),
        Velocity::linear(aim * Vec3::NEG_Z * config.projectile_speed),
        Ccd::enabled(),
        DespawnTimer(Timer::from_seconds(
            config.projectile_lifetime,
            TimerMode::Once,
        )),
    )
}

/// A bomb leaving the muzzle with the launch impulse already applied as
/// velocity.
pub fn bomb_bundle(config: &ArenaConfig, muzzle: Vec3, aim: Quat) -> impl Bundle {
    (
        Bomb::from_config(config),
        Transform::from_translation(muzzle).with_rotation(aim),
        RigidBody::Dynamic,
        Collider::ball(BOMB_RADIUS),
        ColliderMassProperties::Mass(BOMB_MASS),
        Velocity::linear(aim * Vec3::NEG_Z * config.bomb_launch_impulse / BOMB_MASS),
        Ccd::enabled(),
        ActiveEvents::COLLISION_EVENTS,
    )
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                weapon_fire_system,
                bomb_launch_system.after(keyboard_to_intent_system),
                (bomb_stick_system, bomb_follow_system, bomb_fuse_system).chain(),
            ),
        );
    }
}

/// Aim the gun and fire at whatever ragdoll part it has locked.
#[allow(clippy::too_many_arguments)]
pub fn weapon_fire_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ArenaConfig>,
    session: Res<GameSession>,
    rapier_context: ReadRapierContext,
    mut q_player: Query<(Entity, &Transform, &PlayerLook, &mut Weapon), With<Player>>,
    q_targets: Query<(), With<BodyPart>>,
) {
    let Ok((player, transform, look, mut weapon)) = q_player.single_mut() else {
        return;
    };
    let dt = time.delta_secs();
    weapon.cooldown.tick(dt);
    let Ok(rapier) = rapier_context.single() else {
        return;
    };

    let filter = QueryFilter::default().exclude_rigid_body(player);
    let target_along = |origin: Vec3, direction: Vec3| {
        rapier
            .cast_ray(origin, direction, config.weapon_range, true, filter)
            .filter(|(entity, _)| q_targets.contains(*entity))
            .map(|(_, toi)| origin + direction * toi)
    };

    let view = look.view_rotation();
    let eye = transform.translation + Vec3::Y * EYE_HEIGHT;
    let muzzle = muzzle_position(transform, look);
    let sighted = target_along(eye, view * Vec3::NEG_Z);
    let locked = weapon.track(muzzle, view, sighted, config.weapon_slerp_rate, dt);

    if !locked || !session.is_playing() || !weapon.cooldown.is_ready() {
        return;
    }
    if target_along(muzzle, weapon.forward()).is_none() {
        return;
    }
    weapon.cooldown.trigger(config.fire_delay);
    commands.spawn(projectile_bundle(&config, muzzle, weapon.aim));
}

pub fn bomb_launch_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ArenaConfig>,
    session: Res<GameSession>,
    intent: Res<PlayerIntent>,
    mut q_player: Query<(&Transform, &PlayerLook, &Weapon, &mut BombLauncher), With<Player>>,
) {
    let Ok((transform, look, weapon, mut launcher)) = q_player.single_mut() else {
        return;
    };
    launcher.cooldown.tick(time.delta_secs());
    if !intent.bomb || !session.is_playing() {
        return;
    }
    if !launcher.cooldown.trigger(config.bomb_cooldown_secs) {
        return;
    }
    let muzzle = muzzle_position(transform, look);
    commands.spawn(bomb_bundle(&config, muzzle, weapon.aim));
    info!("Bomb away");
}

/// A flying bomb that touches anything but the player stops being a rigid
/// body and rides along with what it hit.
pub fn bomb_stick_system(
    mut commands: Commands,
    mut collisions: MessageReader<CollisionEvent>,
    mut q_bombs: Query<(&Transform, &mut Bomb)>,
    q_surfaces: Query<&Transform, (Without<Bomb>, Without<Player>)>,
) {
    for event in collisions.read() {
        let CollisionEvent::Started(a, b, _) = *event else {
            continue;
        };
        for (bomb_entity, other) in [(a, b), (b, a)] {
            let Ok((transform, mut bomb)) = q_bombs.get_mut(bomb_entity) else {
                continue;
            };
            let Ok(surface) = q_surfaces.get(other) else {
                continue;
            };
            if bomb.attach(Attachment::new(other, surface, transform.translation)) {
                commands
                    .entity(bomb_entity)
                    .remove::<(RigidBody, Collider, Velocity, Ccd, ActiveEvents)>();
            }
        }
    }
}

/// Keep stuck bombs on their surface. A bomb whose surface is gone stays put.
pub fn bomb_follow_system(
    mut q_bombs: Query<(&Bomb, &mut Transform)>,
    q_surfaces: Query<&Transform, Without<Bomb>>,
) {
    for (bomb, mut transform) in q_bombs.iter_mut() {
        let Some(attachment) = bomb.attachment() else {
            continue;
        };
        if let Ok(surface) = q_surfaces.get(attachment.entity) {
            transform.translation = attachment.world_position(surface);
        }
    }
}

/// Light fuses near ragdoll parts and blow up the ones that burned down.
pub fn bomb_fuse_system(
    mut commands: Commands,
    time: Res<Time>,
    mut q_bombs: Query<(Entity, &Transform, &mut Bomb)>,
    mut q_parts: Query<(&Transform, Option<&mut ExternalImpulse>), (With<BodyPart>, Without<Bomb>)>,
) {
    let dt = time.delta_secs();
    for (entity, transform, mut bomb) in q_bombs.iter_mut() {
        let center = transform.translation;
        let in_range = q_parts
            .iter()
            .any(|(part, _)| part.translation.distance(center) < bomb.blast_radius);
        if !bomb.tick(dt, in_range) {
            continue;
        }

        let mut struck = 0;
        for (part, impulse) in q_parts.iter_mut() {
            let Some(mut impulse) = impulse else {
                continue;
            };
            let push = explosion_impulse(center, part.translation, bomb.power, bomb.blast_radius);
            if push != Vec3::ZERO {
                impulse.impulse += push;
                struck += 1;
            }
        }
        commands.entity(entity).insert((
            Visibility::Hidden,
            DespawnTimer(Timer::from_seconds(BOMB_LINGER_SECS, TimerMode::Once)),
        ));
        info!("Bomb {:?} went off; {struck} part(s) in the blast", entity);
    }
}
