//! Rigid-body handle consumed by the force generators.
//!
//! The simulation owns the bodies; stabilizers, joints and repulsors only
//! borrow one for a single tick through [`RigidBodyHandle`]. [`SimBody`] is a
//! plain-data implementation: the Bevy bridge fills one from Rapier state,
//! runs every generator against it, then copies the accumulated force and
//! torque into `ExternalForce`.

use bevy::math::{Quat, Vec3};

/// Lifecycle of a force generator. `Broken` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotorState {
    #[default]
    Active,
    Broken,
}

/// Read access to a body's state plus additive force application.
///
/// All vectors are world-space. Applying force or torque more than once in a
/// tick accumulates.
pub trait RigidBodyHandle {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    fn linear_velocity(&self) -> Vec3;
    fn angular_velocity(&self) -> Vec3;
    /// World-space centre of mass.
    fn center_of_mass(&self) -> Vec3;
    fn mass(&self) -> f32;
    /// Diagonal inertia tensor in the principal frame.
    fn principal_inertia(&self) -> Vec3;
    /// Orientation of the principal frame relative to the body.
    fn inertia_rotation(&self) -> Quat;

    fn apply_torque(&mut self, torque: Vec3);
    fn apply_force_at_point(&mut self, force: Vec3, point: Vec3);

    /// False for anchors that have a transform but no rigid body.
    fn accepts_forces(&self) -> bool {
        true
    }

    fn apply_force(&mut self, force: Vec3) {
        let com = self.center_of_mass();
        self.apply_force_at_point(force, com);
    }

    fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position() + self.rotation() * local
    }

    fn transform_direction(&self, local: Vec3) -> Vec3 {
        self.rotation() * local
    }

    fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.linear_velocity() + self.angular_velocity().cross(point - self.center_of_mass())
    }
}

/// Snapshot of a body plus the force and torque accumulated this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Centre of mass in body-local coordinates.
    pub local_center_of_mass: Vec3,
    pub mass: f32,
    pub principal_inertia: Vec3,
    pub inertia_rotation: Quat,
    pub dynamic: bool,
    pub(crate) force: Vec3,
    pub(crate) torque: Vec3,
}

impl Default for SimBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            local_center_of_mass: Vec3::ZERO,
            mass: 1.0,
            principal_inertia: Vec3::ONE,
            inertia_rotation: Quat::IDENTITY,
            dynamic: true,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }
}

impl SimBody {
    /// Dynamic body at `position` with unit mass and inertia.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Transform-only anchor: has a pose, ignores applied forces.
    pub fn anchor(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            mass: f32::INFINITY,
            dynamic: false,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_inertia(mut self, principal_inertia: Vec3, inertia_rotation: Quat) -> Self {
        self.principal_inertia = principal_inertia;
        self.inertia_rotation = inertia_rotation;
        self
    }

    pub fn force(&self) -> Vec3 {
        self.force
    }

    pub fn torque(&self) -> Vec3 {
        self.torque
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Semi-implicit Euler step using the accumulated force and torque, then
    /// clears them. Inertia is treated in the principal frame.
    ///
    /// Only meant for tests and headless previews; Rapier integrates the game.
    pub fn integrate(&mut self, dt: f32) {
        if self.dynamic && self.mass > 0.0 && self.mass.is_finite() {
            self.linear_velocity += self.force / self.mass * dt;

            let q = self.rotation * self.inertia_rotation;
            let local_torque = q.inverse() * self.torque;
            let inv_inertia = Vec3::select(
                self.principal_inertia.cmpgt(Vec3::ZERO),
                self.principal_inertia.recip(),
                Vec3::ZERO,
            );
            self.angular_velocity += q * (local_torque * inv_inertia) * dt;
        }

        self.position += self.linear_velocity * dt;
        let spin = self.angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            self.rotation = (Quat::from_scaled_axis(spin) * self.rotation).normalize();
        }
        self.clear_forces();
    }
}

impl RigidBodyHandle for SimBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn center_of_mass(&self) -> Vec3 {
        self.transform_point(self.local_center_of_mass)
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn principal_inertia(&self) -> Vec3 {
        self.principal_inertia
    }

    fn inertia_rotation(&self) -> Quat {
        self.inertia_rotation
    }

    fn apply_torque(&mut self, torque: Vec3) {
        if self.dynamic {
            self.torque += torque;
        }
    }

    fn apply_force_at_point(&mut self, force: Vec3, point: Vec3) {
        if self.dynamic {
            self.force += force;
            self.torque += (point - self.center_of_mass()).cross(force);
        }
    }

    fn accepts_forces(&self) -> bool {
        self.dynamic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_at_offset_point_adds_torque() {
        let mut body = SimBody::at(Vec3::ZERO);
        body.apply_force_at_point(Vec3::X, Vec3::Y);
        assert_eq!(body.force(), Vec3::X);
        // r × F = (0,1,0) × (1,0,0) = (0,0,-1)
        assert!((body.torque() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn forces_accumulate_additively() {
        let mut body = SimBody::at(Vec3::ZERO);
        body.apply_force(Vec3::X);
        body.apply_force(Vec3::X);
        body.apply_torque(Vec3::Y);
        assert_eq!(body.force(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(body.torque(), Vec3::Y);
    }

    #[test]
    fn anchors_ignore_forces() {
        let mut anchor = SimBody::anchor(Vec3::ONE, Quat::IDENTITY);
        anchor.apply_force(Vec3::X);
        anchor.apply_torque(Vec3::X);
        assert!(!anchor.accepts_forces());
        assert_eq!(anchor.force(), Vec3::ZERO);
        assert_eq!(anchor.torque(), Vec3::ZERO);
    }

    #[test]
    fn integrate_moves_and_clears() {
        let mut body = SimBody::at(Vec3::ZERO).with_mass(2.0);
        body.apply_force(Vec3::new(4.0, 0.0, 0.0));
        body.integrate(0.5);
        assert!((body.linear_velocity.x - 1.0).abs() < 1e-6);
        assert!((body.position.x - 0.5).abs() < 1e-6);
        assert_eq!(body.force(), Vec3::ZERO);
    }

    #[test]
    fn velocity_at_point_includes_spin() {
        let mut body = SimBody::at(Vec3::ZERO);
        body.angular_velocity = Vec3::Y;
        // ω × r = (0,1,0) × (1,0,0) = (0,0,-1)
        let v = body.velocity_at_point(Vec3::X);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);
    }
}
