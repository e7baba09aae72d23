//! Ragdoll enemies: a torso held upright and turned toward the player by
//! stabilizers, a head on a breakable neck joint and two arms that hurt the
//! player on contact.
//!
//! ## Body layout
//!
//! | Part  | Force generators                                   |
//! |-------|----------------------------------------------------|
//! | torso | upright + look stabilizers, hover repulsor, push   |
//! | head  | upright + look stabilizers, neck joint to torso    |
//! | arms  | joint to torso (their life source), [`Appendage`]  |
//!
//! Breaking the neck kills the enemy: the look stabilizers go away and the
//! torso's upright stabilizer is inverted so the body topples over.

use crate::appendage::{appendage_life_system, despawn_timer_system, Appendage, DespawnTimer};
use crate::config::ArenaConfig;
use crate::error::MotionResult;
use crate::joint::{DirectionalJoint, JointConfig};
use crate::math::{angle_between_deg, Axis};
use crate::player::Player;
use crate::repulsor::{Repulsor, RepulsorConfig};
use crate::session::{GameSession, PlayerHit, WipeStarted};
use crate::simulation::{motion_forces_system, MotionBody};
use crate::spawner::SpawnDirector;
use crate::stabilizer::{Stabilizer, Stabilizers};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

// ── Body dimensions ───────────────────────────────────────────────────────────

const TORSO_HALF_HEIGHT: f32 = 0.5;
const TORSO_RADIUS: f32 = 0.35;
/// Torso centre above the spawn point.
const TORSO_ELEVATION: f32 = 1.35;
const HEAD_RADIUS: f32 = 0.25;
/// Head centre above the torso centre.
const HEAD_OFFSET: f32 = 1.15;
const ARM_HALF_HEIGHT: f32 = 0.25;
const ARM_RADIUS: f32 = 0.1;
/// Shoulder position on the torso (right arm; the left is mirrored).
const SHOULDER: Vec3 = Vec3::new(0.55, 0.1, 0.0);

// ── Components ────────────────────────────────────────────────────────────────

/// Shape tag for each ragdoll part; the renderer builds meshes from it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Torso,
    Head,
    Arm,
}

impl BodyPart {
    pub fn mesh(self) -> Mesh {
        match self {
            BodyPart::Torso => Capsule3d::new(TORSO_RADIUS, TORSO_HALF_HEIGHT * 2.0).into(),
            BodyPart::Head => Sphere::new(HEAD_RADIUS).into(),
            BodyPart::Arm => Capsule3d::new(ARM_RADIUS, ARM_HALF_HEIGHT * 2.0).into(),
        }
    }
}

/// Spawnable enemy variants. The first half of [`EnemyVariant::ALL`] is the
/// easy pool, the second half the hard pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyVariant {
    Grunt,
    Brute,
}

impl EnemyVariant {
    pub const ALL: [EnemyVariant; 2] = [EnemyVariant::Grunt, EnemyVariant::Brute];

    /// Multiplier on push and break forces.
    pub fn scale(self, config: &ArenaConfig) -> f32 {
        match self {
            EnemyVariant::Grunt => 1.0,
            EnemyVariant::Brute => config.hard_variant_scale,
        }
    }
}

/// Pursuit controller on the torso entity.
#[derive(Component, Debug, Clone)]
pub struct EnemyController {
    pub head: Entity,
    pub target: Option<Entity>,
    pub appendages: Vec<Entity>,
    pub force: f32,
    /// Push point height as a fraction of the torso's local Y.
    pub push_point_ratio: f32,
    pub facing_angle_deg: f32,
    direction: Vec3,
    dead: bool,
    kill_requested: bool,
}

impl EnemyController {
    pub fn new(head: Entity, target: Option<Entity>, config: &ArenaConfig) -> Self {
        Self {
            head,
            target,
            appendages: Vec::new(),
            force: config.enemy_push_force,
            push_point_ratio: config.enemy_push_point_ratio,
            facing_angle_deg: config.enemy_facing_angle_deg,
            direction: Vec3::ZERO,
            dead: false,
            kill_requested: false,
        }
    }

    /// Horizontal unit direction toward the target, from the last steer.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Break the neck and every limb on the next collapse pass.
    pub fn request_kill(&mut self) {
        self.kill_requested = true;
    }
}

// ── Pursuit helpers ───────────────────────────────────────────────────────────

/// Direction from `body` to `target` on the ground plane; `None` when the
/// target is straight above or below.
pub fn pursuit_direction(body: Vec3, target: Vec3) -> Option<Vec3> {
    let delta = target - body;
    Vec3::new(delta.x, 0.0, delta.z).try_normalize()
}

/// Push only while the torso roughly faces where it wants to go.
pub fn should_push(body_forward: Vec3, direction: Vec3, facing_angle_deg: f32) -> bool {
    angle_between_deg(body_forward, direction) < facing_angle_deg
}

/// World position of the push point, `(0, ratio, 0)` in torso space.
pub fn push_point(body: &Transform, ratio: f32) -> Vec3 {
    body.transform_point(Vec3::new(0.0, ratio, 0.0))
}

/// Turn a headless body into a falling one. The head loses all its
/// stabilizers, the torso loses its look stabilizer, and whatever keeps the
/// torso upright is inverted with a small break angle.
pub fn collapse(
    body: &mut Stabilizers,
    head: Option<&mut Stabilizers>,
    strength: f32,
    break_angle: f32,
) {
    if let Some(head) = head {
        head.0.clear();
    }
    body.remove_axis(Axis::Z);
    for upright in body.0.iter_mut() {
        upright.config.strength = strength;
        upright.config.break_angle = break_angle;
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                wipe_kill_system,
                enemy_steer_system,
                enemy_collapse_system,
                enemy_attack_system,
                appendage_life_system,
                despawn_timer_system,
            )
                .chain(),
        )
        .add_systems(FixedUpdate, enemy_push_system.after(motion_forces_system));
    }
}

/// Every enemy dies when a wipe starts.
pub fn wipe_kill_system(
    mut wipes: MessageReader<WipeStarted>,
    mut q_enemies: Query<&mut EnemyController>,
) {
    if wipes.read().count() == 0 {
        return;
    }
    for mut controller in q_enemies.iter_mut() {
        controller.request_kill();
    }
}

/// Point the torso and head look stabilizers at the target.
pub fn enemy_steer_system(
    mut q_enemies: Query<(Entity, &Transform, &mut EnemyController)>,
    q_targets: Query<&Transform, Without<EnemyController>>,
    mut q_stabilizers: Query<&mut Stabilizers>,
) {
    for (entity, transform, mut controller) in q_enemies.iter_mut() {
        if controller.dead {
            continue;
        }
        let Some(target) = controller.target.and_then(|t| q_targets.get(t).ok()) else {
            continue;
        };
        let Some(direction) = pursuit_direction(transform.translation, target.translation) else {
            continue;
        };
        controller.direction = direction;

        for part in [entity, controller.head] {
            if let Ok(mut stabilizers) = q_stabilizers.get_mut(part) {
                if let Some(look) = stabilizers.by_axis_mut(Axis::Z) {
                    look.set_direction(direction);
                }
            }
        }
    }
}

/// Kill enemies whose neck broke, vanished, or who were ordered to die. The
/// neck and every arm joint are broken so the limbs die with the body.
pub fn enemy_collapse_system(
    mut commands: Commands,
    config: Res<ArenaConfig>,
    mut session: ResMut<GameSession>,
    mut director: ResMut<SpawnDirector>,
    mut q_enemies: Query<(Entity, &mut EnemyController)>,
    mut q_joints: Query<&mut DirectionalJoint>,
    mut q_stabilizers: Query<&mut Stabilizers>,
) {
    for (entity, mut controller) in q_enemies.iter_mut() {
        if controller.dead {
            continue;
        }
        let neck_intact = q_joints
            .get(controller.head)
            .is_ok_and(|neck| !neck.is_broken());
        if neck_intact && !controller.kill_requested {
            continue;
        }

        // Limbs lose their life source with the body, whatever killed it.
        let parts = std::iter::once(controller.head).chain(controller.appendages.iter().copied());
        for part in parts {
            if let Ok(mut joint) = q_joints.get_mut(part) {
                joint.break_joint();
            }
        }

        match q_stabilizers.get_many_mut([entity, controller.head]) {
            Ok([mut body, mut head]) => collapse(
                &mut body,
                Some(&mut head),
                config.collapse_strength,
                config.collapse_break_angle_deg,
            ),
            Err(_) => {
                if let Ok(mut body) = q_stabilizers.get_mut(entity) {
                    collapse(
                        &mut body,
                        None,
                        config.collapse_strength,
                        config.collapse_break_angle_deg,
                    );
                }
            }
        }

        controller.dead = true;
        session.add_kill();
        director.enemy_died();

        let despawn = || {
            DespawnTimer(Timer::from_seconds(
                config.appendage_despawn_secs,
                TimerMode::Once,
            ))
        };
        commands.entity(entity).insert(despawn());
        if let Ok(mut head) = commands.get_entity(controller.head) {
            head.insert(despawn());
        }
        info!("Enemy {:?} collapsed ({} alive)", entity, director.current());
    }
}

/// Living limbs touching the player count as a hit.
pub fn enemy_attack_system(
    mut collisions: MessageReader<CollisionEvent>,
    q_limbs: Query<&Appendage>,
    q_player: Query<(), With<Player>>,
    mut hits: MessageWriter<PlayerHit>,
) {
    for event in collisions.read() {
        let CollisionEvent::Started(a, b, _) = *event else {
            continue;
        };
        let touched = [(a, b), (b, a)].into_iter().any(|(limb, other)| {
            q_player.contains(other) && q_limbs.get(limb).is_ok_and(|l| l.can_attack())
        });
        if touched {
            hits.write(PlayerHit);
        }
    }
}

/// Shove living torsos toward their target at the push point. Adds onto the
/// force the motion pass wrote.
pub fn enemy_push_system(
    mut q_enemies: Query<(
        &Transform,
        &EnemyController,
        &ReadMassProperties,
        &mut ExternalForce,
    )>,
) {
    for (transform, controller, mass, mut external) in q_enemies.iter_mut() {
        if controller.dead {
            continue;
        }
        let forward = transform.rotation * Vec3::Z;
        if !should_push(forward, controller.direction, controller.facing_angle_deg) {
            continue;
        }
        let force = controller.direction * controller.force;
        let point = push_point(transform, controller.push_point_ratio);
        let com = transform.transform_point(mass.local_center_of_mass);
        external.force += force;
        external.torque += (point - com).cross(force);
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Components shared by every ragdoll part.
fn part_bundle(part: BodyPart, collider: Collider, transform: Transform) -> impl Bundle {
    (
        part,
        MotionBody,
        transform,
        RigidBody::Dynamic,
        collider,
        ColliderMassProperties::Density(1.0),
        ReadMassProperties::default(),
        Velocity::zero(),
        ExternalForce::default(),
        ExternalImpulse::default(),
    )
}

/// Build a complete ragdoll standing on `position`, facing `rotation`'s +Z.
pub fn spawn_enemy(
    commands: &mut Commands,
    config: &ArenaConfig,
    variant: EnemyVariant,
    position: Vec3,
    rotation: Quat,
    target: Option<Entity>,
) -> MotionResult<Entity> {
    let scale = variant.scale(config);
    let neck_config = JointConfig {
        spring: config.neck_spring,
        break_force: config.neck_break_force * scale,
        damping: config.limb_damping,
        ..Default::default()
    };
    neck_config.validate()?;
    let arm_config = |side: f32| JointConfig {
        connected_anchor: SHOULDER * Vec3::new(side, 1.0, 1.0),
        spring: config.arm_spring,
        break_force: config.arm_break_force * scale,
        connected_follow_rotation: BVec3::TRUE,
        damping: config.limb_damping,
        ..Default::default()
    };
    arm_config(1.0).validate()?;

    let torso_position = position + rotation * Vec3::Y * TORSO_ELEVATION;
    let heading = rotation * Vec3::Z;
    let torso = commands
        .spawn((
            Name::new(format!("{variant:?}")),
            part_bundle(
                BodyPart::Torso,
                Collider::capsule_y(TORSO_HALF_HEIGHT, TORSO_RADIUS),
                Transform::from_translation(torso_position).with_rotation(rotation),
            ),
            Damping {
                linear_damping: 0.5,
                angular_damping: 1.0,
            },
            Stabilizers(vec![
                Stabilizer::upright(config.enemy_upright_strength),
                Stabilizer::look(config.enemy_look_strength, heading),
            ]),
            Repulsor::new(RepulsorConfig {
                force: config.enemy_hover_force,
                max_distance: config.enemy_hover_height,
                anchor: Vec3::NEG_Y * (TORSO_HALF_HEIGHT + TORSO_RADIUS),
                axis: Vec3::NEG_Y,
            }),
        ))
        .id();

    let head = commands
        .spawn((
            part_bundle(
                BodyPart::Head,
                Collider::ball(HEAD_RADIUS),
                Transform::from_translation(torso_position + rotation * Vec3::Y * HEAD_OFFSET)
                    .with_rotation(rotation),
            ),
            Stabilizers(vec![
                Stabilizer::upright(config.enemy_upright_strength),
                Stabilizer::look(config.enemy_look_strength, heading),
            ]),
            DirectionalJoint::new(neck_config, Some(torso))?,
        ))
        .id();

    let mut appendages = Vec::with_capacity(2);
    for side in [1.0, -1.0] {
        let shoulder = SHOULDER * Vec3::new(side, 1.0, 1.0);
        let arm = commands
            .spawn((
                part_bundle(
                    BodyPart::Arm,
                    Collider::capsule_y(ARM_HALF_HEIGHT, ARM_RADIUS),
                    Transform::from_translation(torso_position + rotation * shoulder)
                        .with_rotation(rotation),
                ),
                DirectionalJoint::new(arm_config(side), Some(torso))?,
                Appendage::from_config(config),
                ActiveEvents::COLLISION_EVENTS,
            ))
            .id();
        appendages.push(arm);
    }

    let mut controller = EnemyController::new(head, target, config);
    controller.force *= scale;
    controller.appendages = appendages;
    commands.entity(torso).insert(controller);
    Ok(torso)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stabilizer::StabilizerConfig;
    use bevy::ecs::message::Messages;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    fn ragdoll_stabilizers() -> Stabilizers {
        Stabilizers(vec![
            Stabilizer::upright(1.0),
            Stabilizer::look(0.5, Vec3::Z),
        ])
    }

    #[test]
    fn pursuit_ignores_height() {
        let dir = pursuit_direction(Vec3::new(0.0, 1.0, 0.0), Vec3::new(3.0, 10.0, 4.0)).unwrap();
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert_eq!(pursuit_direction(Vec3::ZERO, Vec3::Y * 5.0), None);
    }

    #[test]
    fn push_only_when_facing_target() {
        assert!(should_push(Vec3::Z, Vec3::Z, 30.0));
        let off = Quat::from_rotation_y(40f32.to_radians()) * Vec3::Z;
        assert!(!should_push(off, Vec3::Z, 30.0));
        assert!(!should_push(Vec3::Z, Vec3::ZERO, 30.0));
    }

    #[test]
    fn push_point_is_below_centre() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0);
        assert_eq!(push_point(&t, -0.25), Vec3::new(1.0, 1.75, 3.0));
    }

    #[test]
    fn collapse_strips_look_and_inverts_upright() {
        let mut body = ragdoll_stabilizers();
        let mut head = ragdoll_stabilizers();
        collapse(&mut body, Some(&mut head), -3.0, 25.0);

        assert!(head.0.is_empty());
        assert!(body.by_axis(Axis::Z).is_none());
        let upright = body.by_axis(Axis::Y).unwrap();
        assert_eq!(upright.config.strength, -3.0);
        assert_eq!(upright.config.break_angle, 25.0);
    }

    #[test]
    fn collapse_without_head_still_topples_body() {
        let mut body = Stabilizers(vec![Stabilizer::new(StabilizerConfig::default())]);
        collapse(&mut body, None, -3.0, 25.0);
        assert_eq!(body.0.len(), 1);
        assert_eq!(body.0[0].config.strength, -3.0);
    }

    #[test]
    fn brute_scales_forces() {
        let config = ArenaConfig::default();
        assert_eq!(EnemyVariant::Grunt.scale(&config), 1.0);
        assert_eq!(EnemyVariant::Brute.scale(&config), config.hard_variant_scale);
    }

    fn collapse_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ArenaConfig::default());
        app.insert_resource(GameSession::default());
        app.insert_resource(SpawnDirector::default());
        app.add_systems(Update, enemy_collapse_system);
        app
    }

    fn spawn_test_enemy(app: &mut App) -> (Entity, Entity) {
        let config = ArenaConfig::default();
        let world = app.world_mut();
        let torso = world.spawn(ragdoll_stabilizers()).id();
        let neck = DirectionalJoint::new(JointConfig::default(), Some(torso)).unwrap();
        let head = world.spawn((ragdoll_stabilizers(), neck)).id();
        world
            .entity_mut(torso)
            .insert(EnemyController::new(head, None, &config));
        world.resource_mut::<GameSession>().start_game();
        world.resource_mut::<SpawnDirector>().enemy_spawned();
        (torso, head)
    }

    #[test]
    fn intact_neck_keeps_enemy_alive() {
        let mut app = collapse_test_app();
        let (torso, _) = spawn_test_enemy(&mut app);
        app.update();
        assert!(!app.world().get::<EnemyController>(torso).unwrap().is_dead());
        assert_eq!(app.world().resource::<GameSession>().kills(), 0);
    }

    #[test]
    fn broken_neck_collapses_and_counts_kill() {
        let mut app = collapse_test_app();
        let (torso, head) = spawn_test_enemy(&mut app);
        app.world_mut()
            .get_mut::<DirectionalJoint>(head)
            .unwrap()
            .break_joint();
        app.update();

        let world = app.world();
        assert!(world.get::<EnemyController>(torso).unwrap().is_dead());
        assert!(world.get::<Stabilizers>(head).unwrap().0.is_empty());
        assert!(world.get::<Stabilizers>(torso).unwrap().by_axis(Axis::Z).is_none());
        assert!(world.get::<DespawnTimer>(torso).is_some());
        assert_eq!(world.resource::<GameSession>().kills(), 1);
        assert_eq!(world.resource::<SpawnDirector>().current(), 0);
    }

    #[test]
    fn kill_request_breaks_neck() {
        let mut app = collapse_test_app();
        let (torso, head) = spawn_test_enemy(&mut app);
        app.world_mut()
            .get_mut::<EnemyController>(torso)
            .unwrap()
            .request_kill();
        app.update();

        assert!(app.world().get::<DirectionalJoint>(head).unwrap().is_broken());
        assert!(app.world().get::<EnemyController>(torso).unwrap().is_dead());
    }

    #[test]
    fn decapitation_kills_and_clears_the_arms() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ArenaConfig {
            appendage_despawn_secs: 0.0,
            ..Default::default()
        });
        app.insert_resource(GameSession::default());
        app.insert_resource(SpawnDirector::default());
        app.add_systems(
            Update,
            (enemy_collapse_system, appendage_life_system, despawn_timer_system).chain(),
        );

        let (torso, head) = spawn_test_enemy(&mut app);
        let arm_joint = DirectionalJoint::new(JointConfig::default(), Some(torso)).unwrap();
        let arm = app
            .world_mut()
            .spawn((arm_joint, Appendage::default(), ColliderMassProperties::Density(1.0)))
            .id();
        app.world_mut()
            .get_mut::<EnemyController>(torso)
            .unwrap()
            .appendages
            .push(arm);
        app.world_mut()
            .get_mut::<DirectionalJoint>(head)
            .unwrap()
            .break_joint();

        for _ in 0..5 {
            app.update();
        }

        let world = app.world();
        assert!(world.get::<EnemyController>(torso).is_none());
        assert!(world.get::<Stabilizers>(head).is_none());
        assert!(world.get::<Appendage>(arm).is_none(), "arm outlived its body");
    }

    #[test]
    fn wipe_kills_every_enemy_without_scoring() {
        let mut app = collapse_test_app();
        app.add_message::<WipeStarted>();
        app.add_systems(Update, wipe_kill_system.before(enemy_collapse_system));

        let (first, _) = spawn_test_enemy(&mut app);
        let (second, _) = spawn_test_enemy(&mut app);
        app.world_mut().resource_mut::<GameSession>().player_hit();
        app.world_mut().write_message(WipeStarted);
        app.update();

        let world = app.world();
        for torso in [first, second] {
            assert!(world.get::<EnemyController>(torso).unwrap().is_dead());
        }
        assert_eq!(world.resource::<GameSession>().kills(), 0);
        assert_eq!(world.resource::<SpawnDirector>().current(), 0);
    }

    fn attack_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<CollisionEvent>();
        app.add_message::<PlayerHit>();
        app.add_systems(Update, enemy_attack_system);
        app
    }

    #[test]
    fn living_limb_touching_player_is_a_hit() {
        let mut app = attack_test_app();
        let player = app.world_mut().spawn(Player).id();
        let arm = app.world_mut().spawn(Appendage::default()).id();
        app.world_mut()
            .write_message(CollisionEvent::Started(player, arm, CollisionEventFlags::empty()));
        app.update();

        assert_eq!(app.world().resource::<Messages<PlayerHit>>().len(), 1);
    }

    #[test]
    fn dead_limb_or_other_contacts_are_harmless() {
        let mut app = attack_test_app();
        let player = app.world_mut().spawn(Player).id();
        let mut severed = Appendage::default();
        severed.die();
        let dead_arm = app.world_mut().spawn(severed).id();
        let live_arm = app.world_mut().spawn(Appendage::default()).id();
        let world = app.world_mut();
        world.write_message(CollisionEvent::Started(dead_arm, player, CollisionEventFlags::empty()));
        world.write_message(CollisionEvent::Started(live_arm, dead_arm, CollisionEventFlags::empty()));
        world.write_message(CollisionEvent::Stopped(live_arm, player, CollisionEventFlags::empty()));
        app.update();

        assert!(app.world().resource::<Messages<PlayerHit>>().is_empty());
    }

    #[test]
    fn steer_points_look_stabilizers_at_target() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, enemy_steer_system);

        let config = ArenaConfig::default();
        let world = app.world_mut();
        let target = world.spawn(Transform::from_xyz(10.0, 0.0, 0.0)).id();
        let torso = world
            .spawn((Transform::default(), ragdoll_stabilizers()))
            .id();
        let head = world.spawn(ragdoll_stabilizers()).id();
        world
            .entity_mut(torso)
            .insert(EnemyController::new(head, Some(target), &config));
        app.update();

        let world = app.world();
        assert_eq!(world.get::<EnemyController>(torso).unwrap().direction(), Vec3::X);
        for part in [torso, head] {
            let look = world.get::<Stabilizers>(part).unwrap().by_axis(Axis::Z).unwrap().config.direction;
            assert!((look - Vec3::X).length() < 1e-6);
        }
    }

    #[test]
    fn push_adds_force_while_facing() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, enemy_push_system);

        let config = ArenaConfig::default();
        let world = app.world_mut();
        let head = world.spawn_empty().id();
        let mut controller = EnemyController::new(head, None, &config);
        controller.direction = Vec3::Z;
        let torso = world
            .spawn((
                Transform::default(),
                controller,
                ReadMassProperties::default(),
                ExternalForce::default(),
            ))
            .id();
        app.update();

        let external = app.world().get::<ExternalForce>(torso).unwrap();
        assert!((external.force - Vec3::Z * config.enemy_push_force).length() < 1e-5);
        // Pushed below the centre of mass, so the torque is about -X.
        assert!(external.torque.x < 0.0);
    }
}
