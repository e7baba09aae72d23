//! Bevy bridge for the force model.
//!
//! Every fixed step, before Rapier integrates, [`motion_forces_system`]
//! snapshots each [`MotionBody`] into a [`SimBody`], runs its stabilizers,
//! repulsor and joint against the snapshots, and writes the accumulated
//! force and torque into Rapier's `ExternalForce`. The write replaces last
//! step's value; later fixed systems (enemy push) add on top of it.

use crate::body::{MotorState, SimBody};
use crate::joint::DirectionalJoint;
use crate::repulsor::{RayHit, Repulsor};
use crate::stabilizer::Stabilizers;
use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Marks a rigid body driven by stabilizers, repulsors or joints.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MotionBody;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, motion_forces_system);
    }
}

/// Snapshot a Rapier body. Mass properties read as zero until Rapier has
/// computed them once; every generator treats that as "no effect".
pub fn snapshot(transform: &Transform, velocity: &Velocity, mass: &ReadMassProperties) -> SimBody {
    SimBody {
        position: transform.translation,
        rotation: transform.rotation,
        linear_velocity: velocity.linvel,
        angular_velocity: velocity.angvel,
        local_center_of_mass: mass.local_center_of_mass,
        mass: mass.mass,
        principal_inertia: mass.principal_inertia,
        inertia_rotation: mass.principal_inertia_local_frame,
        ..Default::default()
    }
}

#[allow(clippy::type_complexity)]
pub fn motion_forces_system(
    time: Res<Time>,
    rapier_context: ReadRapierContext,
    mut q_bodies: Query<
        (
            Entity,
            &Transform,
            &Velocity,
            &ReadMassProperties,
            Option<&mut Stabilizers>,
            Option<&mut Repulsor>,
            Option<&mut DirectionalJoint>,
        ),
        With<MotionBody>,
    >,
    mut q_forces: Query<(Entity, &mut ExternalForce), With<MotionBody>>,
    q_anchors: Query<&Transform, Without<MotionBody>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    let rapier = rapier_context.single().ok();

    let mut bodies: HashMap<Entity, SimBody> = q_bodies
        .iter()
        .map(|(entity, transform, velocity, mass, ..)| {
            (entity, snapshot(transform, velocity, mass))
        })
        .collect();

    for (entity, _, _, _, stabilizers, repulsor, joint) in q_bodies.iter_mut() {
        if let Some(mut stabilizers) = stabilizers {
            if let Some(body) = bodies.get_mut(&entity) {
                let broken = stabilizers.step_all(body, dt);
                if broken > 0 {
                    info!("{broken} stabilizer(s) on {entity:?} broke");
                }
            }
        }

        if let Some(mut repulsor) = repulsor {
            let Some(mut own) = bodies.remove(&entity) else {
                continue;
            };
            let ray = repulsor.ray(&own);
            let hit = rapier.as_ref().and_then(|ctx| {
                ctx.cast_ray(
                    ray.origin,
                    ray.direction,
                    ray.max_distance,
                    true,
                    QueryFilter::default().exclude_rigid_body(entity),
                )
            });
            match hit {
                Some((hit_entity, toi)) => {
                    let hit = RayHit {
                        point: ray.origin + ray.direction * toi,
                    };
                    repulsor.step(&mut own, Some(hit), bodies.get_mut(&hit_entity));
                }
                None => {
                    repulsor.step(&mut own, None, None);
                }
            }
            bodies.insert(entity, own);
        }

        if let Some(mut joint) = joint {
            if joint.is_broken() {
                continue;
            }
            let Some(mut own) = bodies.remove(&entity) else {
                continue;
            };
            let connected = joint.connected;
            let state = match connected.and_then(|c| bodies.remove(&c).map(|body| (c, body))) {
                Some((c, mut other)) => {
                    let state = joint.step(&mut own, Some(&mut other));
                    bodies.insert(c, other);
                    state
                }
                None => {
                    // Bodies without a MotionBody marker act as fixed anchors.
                    let mut anchor = connected
                        .and_then(|c| q_anchors.get(c).ok())
                        .map(|t| SimBody::anchor(t.translation, t.rotation));
                    joint.step(&mut own, anchor.as_mut())
                }
            };
            bodies.insert(entity, own);

            if state == MotorState::Broken {
                info!(
                    "Joint on {entity:?} broke at {:.1} N",
                    joint.last_force().length()
                );
            }
        }
    }

    for (entity, mut external) in q_forces.iter_mut() {
        if let Some(body) = bodies.get(&entity) {
            external.force = body.force();
            external.torque = body.torque();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointConfig;
    use crate::stabilizer::Stabilizer;
    use bevy::reflect::GetTupleStructField;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn motion_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
        app.add_systems(Update, motion_forces_system);
        app
    }

    fn unit_mass() -> ReadMassProperties {
        let mut props = ReadMassProperties::default();
        // `ReadMassProperties::set` is crate-private in bevy_rapier3d; write
        // the wrapped value through reflection instead.
        *props
            .get_field_mut::<MassProperties>(0)
            .expect("ReadMassProperties wraps a MassProperties") = MassProperties {
            mass: 1.0,
            principal_inertia: Vec3::ONE,
            ..Default::default()
        };
        props
    }

    fn spawn_body(app: &mut App, transform: Transform) -> Entity {
        app.world_mut()
            .spawn((
                MotionBody,
                transform,
                Velocity::zero(),
                unit_mass(),
                ExternalForce::default(),
            ))
            .id()
    }

    #[test]
    fn snapshot_copies_rapier_state() {
        let transform = Transform::from_xyz(1.0, 2.0, 3.0);
        let velocity = Velocity::linear(Vec3::X);
        let body = snapshot(&transform, &velocity, &unit_mass());
        assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.linear_velocity, Vec3::X);
        assert_eq!(body.mass, 1.0);
        assert!(body.dynamic);
    }

    #[test]
    fn tilted_body_gets_righting_torque() {
        let mut app = motion_test_app();
        let body = spawn_body(
            &mut app,
            Transform::from_rotation(Quat::from_rotation_z(0.3)),
        );
        app.world_mut()
            .entity_mut(body)
            .insert(Stabilizers(vec![Stabilizer::upright(1.0)]));
        app.update();
        app.update();

        let torque = app.world().get::<ExternalForce>(body).unwrap().torque;
        assert!(torque.z < 0.0, "expected torque back toward +Y, got {torque:?}");
    }

    #[test]
    fn joint_pulls_both_bodies_together() {
        let mut app = motion_test_app();
        let anchor_body = spawn_body(&mut app, Transform::default());
        let follower = spawn_body(&mut app, Transform::from_xyz(0.0, -1.0, 0.0));
        let joint = DirectionalJoint::new(
            JointConfig {
                spring: 10.0,
                ..Default::default()
            },
            Some(anchor_body),
        )
        .unwrap();
        app.world_mut().entity_mut(follower).insert(joint);
        app.update();
        app.update();

        // Activation captures the current offset; moving the anchor body
        // stretches the joint.
        app.world_mut()
            .get_mut::<Transform>(anchor_body)
            .unwrap()
            .translation = Vec3::new(0.0, 0.0, 1.0);
        app.update();

        let pull = app.world().get::<ExternalForce>(follower).unwrap().force;
        let reaction = app.world().get::<ExternalForce>(anchor_body).unwrap().force;
        assert!((pull - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4, "got {pull:?}");
        assert!((pull + reaction).length() < 1e-4);
    }

    #[test]
    fn plain_entity_acts_as_fixed_anchor() {
        let mut app = motion_test_app();
        let post = app.world_mut().spawn(Transform::from_xyz(0.0, 2.0, 0.0)).id();
        let body = spawn_body(&mut app, Transform::default());
        let joint = DirectionalJoint::new(JointConfig::default(), Some(post)).unwrap();
        app.world_mut().entity_mut(body).insert(joint);
        app.update();
        app.update();

        app.world_mut().get_mut::<Transform>(post).unwrap().translation.y = 3.0;
        app.update();

        let force = app.world().get::<ExternalForce>(body).unwrap().force;
        assert!(force.y > 0.0);
    }
}
