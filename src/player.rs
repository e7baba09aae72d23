//! Player body: keyboard intent, fixed-step movement and the first-person
//! follow camera.
//!
//! Input is decoupled from physics through [`PlayerIntent`], so tests can
//! populate the resource directly and run only [`apply_player_intent_system`].

use crate::config::ArenaConfig;
use crate::math::clamp_angle_deg;
use crate::weapon::{BombLauncher, Weapon};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Camera height above the player's centre.
pub const EYE_HEIGHT: f32 = 0.6;

/// Marker for the player body; enemies pursue it and limbs hurt it.
#[derive(Component)]
pub struct Player;

/// Marker for the camera that follows the player's view.
#[derive(Component)]
pub struct PlayerCamera;

/// Where the player is looking. The body itself never rotates.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerLook {
    pub yaw_deg: f32,
    /// Positive looks up.
    pub pitch_deg: f32,
}

impl PlayerLook {
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw_deg.to_radians())
    }

    /// Horizontal facing (Bevy's forward is −Z).
    pub fn forward(&self) -> Vec3 {
        self.yaw_rotation() * Vec3::NEG_Z
    }

    pub fn view_rotation(&self) -> Quat {
        self.yaw_rotation() * Quat::from_rotation_x(self.pitch_deg.to_radians())
    }
}

/// Per-frame control request.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// `x` strafes right, `y` moves forward; each in `[-1, 1]`.
    pub movement: Vec2,
    /// +1 turns right.
    pub turn: f32,
    /// +1 looks up.
    pub pitch: f32,
    /// Launch a bomb this frame.
    pub bomb: bool,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerIntent>()
            .add_systems(Update, (keyboard_to_intent_system, camera_follow_system))
            .add_systems(FixedUpdate, apply_player_intent_system);
    }
}

/// WASD moves, arrow keys turn and pitch, Space throws a bomb.
pub fn keyboard_to_intent_system(keys: Res<ButtonInput<KeyCode>>, mut intent: ResMut<PlayerIntent>) {
    let axis = |pos: KeyCode, neg: KeyCode| {
        (keys.pressed(pos) as i8 - keys.pressed(neg) as i8) as f32
    };
    *intent = PlayerIntent {
        movement: Vec2::new(
            axis(KeyCode::KeyD, KeyCode::KeyA),
            axis(KeyCode::KeyW, KeyCode::KeyS),
        ),
        turn: axis(KeyCode::ArrowRight, KeyCode::ArrowLeft),
        pitch: axis(KeyCode::ArrowUp, KeyCode::ArrowDown),
        bomb: keys.just_pressed(KeyCode::Space),
    };
}

/// Turn the view, then add movement velocity in the view's horizontal frame
/// and cap horizontal speed. Vertical velocity is left to gravity.
pub fn apply_player_intent_system(
    time: Res<Time>,
    config: Res<ArenaConfig>,
    intent: Res<PlayerIntent>,
    mut q: Query<(&mut PlayerLook, &mut Velocity), With<Player>>,
) {
    let Ok((mut look, mut velocity)) = q.single_mut() else {
        return;
    };
    let dt = time.delta_secs();

    look.yaw_deg = (look.yaw_deg - intent.turn * config.player_turn_speed_deg * dt).rem_euclid(360.0);
    let pitch = look.pitch_deg + intent.pitch * config.player_turn_speed_deg * dt;
    if let Ok(pitch) = clamp_angle_deg(
        pitch,
        config.player_pitch_min_deg,
        config.player_pitch_max_deg,
    ) {
        look.pitch_deg = pitch;
    }

    let yaw = look.yaw_rotation();
    let wish = (yaw * Vec3::X * intent.movement.x + look.forward() * intent.movement.y)
        .clamp_length_max(1.0);
    let linvel = velocity.linvel + wish * config.player_speed;
    let horizontal = Vec3::new(linvel.x, 0.0, linvel.z).clamp_length_max(config.player_max_speed);
    velocity.linvel = Vec3::new(horizontal.x, linvel.y, horizontal.z);
}

pub fn camera_follow_system(
    q_player: Query<(&Transform, &PlayerLook), (With<Player>, Without<PlayerCamera>)>,
    mut q_camera: Query<&mut Transform, With<PlayerCamera>>,
) {
    let Ok((player, look)) = q_player.single() else {
        return;
    };
    for mut camera in q_camera.iter_mut() {
        camera.translation = player.translation + Vec3::Y * EYE_HEIGHT;
        camera.rotation = look.view_rotation();
    }
}

/// Spawn the player ball at `position`, armed with a gun and a bomb
/// launcher. Rotation is locked; the view turns through [`PlayerLook`]
/// instead.
pub fn spawn_player(commands: &mut Commands, position: Vec3) -> Entity {
    commands
        .spawn((
            Player,
            PlayerLook::default(),
            Weapon::default(),
            BombLauncher::default(),
            Transform::from_translation(position),
            RigidBody::Dynamic,
            Collider::ball(0.5),
            LockedAxes::ROTATION_LOCKED,
            Velocity::zero(),
            Damping {
                linear_damping: 2.0,
                angular_damping: 0.0,
            },
            ActiveEvents::COLLISION_EVENTS,
        ))
        .id()
}
