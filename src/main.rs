use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;
use std::f32::consts::TAU;

use ragdoll_arena::config::{self, ArenaConfig};
use ragdoll_arena::enemy::{BodyPart, EnemyPlugin};
use ragdoll_arena::player::{self, Player, PlayerCamera, PlayerLook, PlayerPlugin};
use ragdoll_arena::session::{GamePhase, GameSession, SessionPlugin};
use ragdoll_arena::simulation::SimulationPlugin;
use ragdoll_arena::spawner::{SpawnDirector, SpawnPoint, SpawnerPlugin};
use ragdoll_arena::weapon::{Bomb, BombLauncher, Projectile, Weapon, WeaponPlugin};

/// Half the side length of the square arena floor.
const ARENA_HALF_SIZE: f32 = 40.0;
/// Spawn points sit on a ring of this radius.
const SPAWN_RING_RADIUS: f32 = 30.0;
const SPAWN_POINT_COUNT: usize = 12;
const PLAYER_START: Vec3 = Vec3::new(0.0, 1.0, 0.0);

fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(
            ARENA_HALF_SIZE * 2.0,
            ARENA_HALF_SIZE * 2.0,
        ))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.35, 0.3))),
        Transform::default(),
        RigidBody::Fixed,
        Collider::halfspace(Vec3::Y)
            .unwrap_or_else(|| Collider::cuboid(ARENA_HALF_SIZE, 0.01, ARENA_HALF_SIZE)),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Camera3d::default(),
        PlayerCamera,
        Transform::from_translation(PLAYER_START),
    ));

    for i in 0..SPAWN_POINT_COUNT {
        let angle = i as f32 / SPAWN_POINT_COUNT as f32 * TAU;
        let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * SPAWN_RING_RADIUS;
        // Enemies face the arena centre on their local +Z.
        let facing = Quat::from_rotation_arc(Vec3::Z, -position.normalize());
        commands.spawn((
            SpawnPoint,
            Transform::from_translation(position).with_rotation(facing),
        ));
    }

    player::spawn_player(&mut commands, PLAYER_START);
}

/// Give every new ragdoll part a visible mesh.
fn attach_part_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    q_parts: Query<(Entity, &BodyPart), Without<Mesh3d>>,
) {
    for (entity, part) in q_parts.iter() {
        let color = match part {
            BodyPart::Torso => Color::srgb(0.7, 0.25, 0.2),
            BodyPart::Head => Color::srgb(0.9, 0.8, 0.6),
            BodyPart::Arm => Color::srgb(0.6, 0.3, 0.25),
        };
        commands.entity(entity).insert((
            Mesh3d(meshes.add(part.mesh())),
            MeshMaterial3d(materials.add(color)),
        ));
    }
}

/// Small spheres for projectiles and bombs.
fn attach_ordnance_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    q_ordnance: Query<(Entity, Has<Bomb>), (Or<(With<Projectile>, With<Bomb>)>, Without<Mesh3d>)>,
) {
    for (entity, is_bomb) in q_ordnance.iter() {
        let (radius, color) = if is_bomb {
            (0.15, Color::srgb(0.15, 0.15, 0.15))
        } else {
            (0.12, Color::srgb(1.0, 0.85, 0.3))
        };
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Sphere::new(radius))),
            MeshMaterial3d(materials.add(color)),
        ));
    }
}

/// Enter starts a game from the menu or after a game over, Escape toggles
/// pause, Backspace returns to the menu.
fn session_input_system(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<ArenaConfig>,
    mut session: ResMut<GameSession>,
    mut director: ResMut<SpawnDirector>,
    q_debris: Query<Entity, Or<(With<BodyPart>, With<Projectile>, With<Bomb>)>>,
    mut q_player: Query<
        (
            &mut Transform,
            &mut Velocity,
            &mut PlayerLook,
            &mut Weapon,
            &mut BombLauncher,
        ),
        With<Player>,
    >,
) {
    if keys.just_pressed(KeyCode::Enter)
        && matches!(session.phase(), GamePhase::Main | GamePhase::End)
    {
        for entity in q_debris.iter() {
            commands.entity(entity).despawn();
        }
        if let Ok((mut transform, mut velocity, mut look, mut weapon, mut launcher)) =
            q_player.single_mut()
        {
            transform.translation = PLAYER_START;
            *velocity = Velocity::zero();
            *look = PlayerLook::default();
            *weapon = Weapon::default();
            *launcher = BombLauncher::default();
        }
        *session = GameSession::from_config(&config);
        session.start_game();
        *director = SpawnDirector::from_config(&config);
        info!("Game started");
    }

    if keys.just_pressed(KeyCode::Escape) && !session.resume() && session.pause() {
        info!("Paused");
    }

    if keys.just_pressed(KeyCode::Backspace)
        && matches!(session.phase(), GamePhase::Pause | GamePhase::End)
    {
        session.back_to_main();
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Ragdoll Arena".into(),
            resolution: WindowResolution::new(1280, 720),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.55, 0.7, 0.85)))
    // Compiled defaults; load_arena_config overwrites them from
    // assets/arena.toml (if present) in the Startup schedule.
    .insert_resource(ArenaConfig::default())
    // Forces are written in FixedUpdate, so Rapier must step on the same clock.
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
    .add_plugins((
        SimulationPlugin,
        SessionPlugin,
        SpawnerPlugin,
        EnemyPlugin,
        PlayerPlugin,
        WeaponPlugin,
    ))
    .add_systems(
        Startup,
        (
            config::load_arena_config,
            setup_arena.after(config::load_arena_config),
        ),
    )
    .add_systems(
        Update,
        (
            session_input_system,
            attach_part_mesh_system,
            attach_ordnance_mesh_system,
        ),
    );

    app.run();
}
