//! Orientation stabilizer: torque that swings a body-local axis toward a
//! world direction, scaled by the body's inertia.
//!
//! Each tick the configured local axis is moved into world space and compared
//! with [`StabilizerConfig::direction`]. The correction needed to close that
//! angle within one fixed step becomes an angular acceleration, which is
//! multiplied through the principal inertia tensor to get a torque.
//!
//! When the angle error exceeds `break_angle` the stabilizer breaks for good
//! and applies nothing on that tick or any later one. Owning logic watches for
//! [`MotorState::Broken`] and reacts (usually by letting the ragdoll fall).

use crate::body::{MotorState, RigidBodyHandle};
use crate::constants::{DEFAULT_STABILIZER_STRENGTH, SINGULAR_AXIS_NUDGE};
use crate::math::{angle_between_deg, is_near_singular_angle, Axis};
use bevy::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerConfig {
    /// Torque scale. Negative values push the axis away from the target.
    pub strength: f32,
    /// Angle error (degrees) beyond which the stabilizer breaks.
    pub break_angle: f32,
    /// World-space unit target direction.
    pub direction: Vec3,
    /// Local axis to align; `None` disables the stabilizer without breaking it.
    pub axis: Option<Axis>,
    /// Component of the world axis vector zeroed before the correction is
    /// computed.
    pub axis_lock: Option<Axis>,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STABILIZER_STRENGTH,
            break_angle: f32::INFINITY,
            direction: Vec3::Y,
            axis: Some(Axis::Y),
            axis_lock: None,
        }
    }
}

/// Outcome of one stabilizer tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilizerStep {
    /// No axis configured.
    Disabled,
    /// Broke on this tick or earlier.
    Broken,
    /// Correction was degenerate (already aligned); nothing to apply.
    Aligned,
    /// World-space torque to apply.
    Torque(Vec3),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stabilizer {
    pub config: StabilizerConfig,
    state: MotorState,
    last_torque: Vec3,
    last_angle: f32,
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let mut config = config;
        config.direction = config.direction.normalize_or(Vec3::Y);
        Self {
            config,
            state: MotorState::Active,
            last_torque: Vec3::ZERO,
            last_angle: 0.0,
        }
    }

    /// Keeps `local` upright (+Y) with the given strength.
    pub fn upright(strength: f32) -> Self {
        Self::new(StabilizerConfig {
            strength,
            ..Default::default()
        })
    }

    /// Turns the body's forward (+Z) toward a horizontal heading. Only yaw is
    /// corrected since the vertical component of the forward axis is locked.
    pub fn look(strength: f32, heading: Vec3) -> Self {
        Self::new(StabilizerConfig {
            strength,
            direction: heading,
            axis: Some(Axis::Z),
            axis_lock: Some(Axis::Y),
            ..Default::default()
        })
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_broken(&self) -> bool {
        self.state == MotorState::Broken
    }

    /// Torque computed on the last tick (zero when nothing was applied).
    pub fn last_torque(&self) -> Vec3 {
        self.last_torque
    }

    /// Angle error in degrees measured on the last tick.
    pub fn last_angle(&self) -> f32 {
        self.last_angle
    }

    /// Retarget. A zero vector keeps the previous direction.
    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(dir) = direction.try_normalize() {
            self.config.direction = dir;
        }
    }

    /// Compute this tick's torque without applying it.
    pub fn compute<B: RigidBodyHandle + ?Sized>(&mut self, body: &B, dt: f32) -> StabilizerStep {
        self.last_torque = Vec3::ZERO;

        if self.state == MotorState::Broken {
            return StabilizerStep::Broken;
        }
        let Some(axis) = self.config.axis else {
            return StabilizerStep::Disabled;
        };

        let direction = self.config.direction;
        let mut axis_vector = body.transform_direction(axis.unit());
        let angle = angle_between_deg(axis_vector, direction);
        self.last_angle = angle;

        // The cross product degenerates on these angles; nudge off them.
        if is_near_singular_angle(angle) {
            axis_vector = (axis_vector + Vec3::splat(SINGULAR_AXIS_NUDGE)).normalize_or_zero();
        }

        // Not a true projection onto the locked plane, but the gameplay tuning
        // relies on this exact behaviour.
        if let Some(lock) = self.config.axis_lock {
            axis_vector = lock.zero_component(axis_vector).normalize_or_zero();
        }

        if angle > self.config.break_angle {
            self.state = MotorState::Broken;
            return StabilizerStep::Broken;
        }

        let rotation_axis = axis_vector.cross(direction);
        let theta = rotation_axis.length().min(1.0).asin();
        let angular_acc = rotation_axis.normalize() * theta / dt;

        // Inertia is diagonal in its principal frame only.
        let q = body.rotation() * body.inertia_rotation();
        let torque =
            q * (body.principal_inertia() * (q.inverse() * angular_acc)) * self.config.strength;

        if torque.is_nan() || !torque.is_finite() {
            return StabilizerStep::Aligned;
        }

        self.last_torque = torque;
        StabilizerStep::Torque(torque)
    }

    /// Compute and apply this tick's torque.
    pub fn step<B: RigidBodyHandle + ?Sized>(&mut self, body: &mut B, dt: f32) -> MotorState {
        if let StabilizerStep::Torque(torque) = self.compute(&*body, dt) {
            body.apply_torque(torque);
        }
        self.state
    }
}

/// All stabilizers attached to one body, ticked in insertion order.
#[derive(Component, Debug, Clone, Default)]
pub struct Stabilizers(pub Vec<Stabilizer>);

impl Stabilizers {
    /// First stabilizer aligning `axis`.
    pub fn by_axis(&self, axis: Axis) -> Option<&Stabilizer> {
        self.0.iter().find(|s| s.config.axis == Some(axis))
    }

    pub fn by_axis_mut(&mut self, axis: Axis) -> Option<&mut Stabilizer> {
        self.0.iter_mut().find(|s| s.config.axis == Some(axis))
    }

    /// Drop every stabilizer aligning `axis`.
    pub fn remove_axis(&mut self, axis: Axis) {
        self.0.retain(|s| s.config.axis != Some(axis));
    }

    /// Step all stabilizers, returning how many broke on this tick.
    pub fn step_all<B: RigidBodyHandle + ?Sized>(&mut self, body: &mut B, dt: f32) -> usize {
        let mut newly_broken = 0;
        for stabilizer in &mut self.0 {
            let was_broken = stabilizer.is_broken();
            if stabilizer.step(body, dt) == MotorState::Broken && !was_broken {
                newly_broken += 1;
            }
        }
        newly_broken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::SimBody;
    use std::f32::consts::{FRAC_PI_2, PI};

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn aligned_axis_yields_zero_torque_without_nan() {
        let mut body = SimBody::at(Vec3::ZERO);
        let mut stab = Stabilizer::upright(1.0);
        assert_eq!(stab.compute(&body, DT), StabilizerStep::Aligned);
        assert_eq!(stab.step(&mut body, DT), MotorState::Active);
        assert_eq!(body.torque(), Vec3::ZERO);
        assert!(!stab.last_torque().is_nan());
    }

    #[test]
    fn tilted_body_is_pushed_back_upright() {
        let mut body = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_z(0.3));
        let mut stab = Stabilizer::upright(1.0);
        stab.step(&mut body, DT);
        let torque = body.torque();
        // Rotated +Z, so the correction is about -Z with magnitude θ/dt.
        assert!(torque.z < 0.0);
        assert!((torque.z.abs() - 0.3 / DT).abs() < 1e-2);
        assert!(torque.x.abs() < 1e-4 && torque.y.abs() < 1e-4);
    }

    #[test]
    fn torque_scales_with_principal_inertia() {
        let tilt = Quat::from_rotation_z(0.3);
        let unit = SimBody::at(Vec3::ZERO).with_rotation(tilt);
        let heavy = SimBody::at(Vec3::ZERO)
            .with_rotation(tilt)
            .with_inertia(Vec3::new(1.0, 1.0, 4.0), Quat::IDENTITY);

        let t_unit = Stabilizer::upright(1.0).compute(&unit, DT);
        let t_heavy = Stabilizer::upright(1.0).compute(&heavy, DT);
        let (StabilizerStep::Torque(a), StabilizerStep::Torque(b)) = (t_unit, t_heavy) else {
            panic!("expected torque from both bodies");
        };
        assert!((b.z / a.z - 4.0).abs() < 1e-3);
    }

    #[test]
    fn negative_strength_inverts_the_torque() {
        let body = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_x(0.4));
        let StabilizerStep::Torque(pos) = Stabilizer::upright(1.0).compute(&body, DT) else {
            panic!("expected torque");
        };
        let StabilizerStep::Torque(neg) = Stabilizer::upright(-3.0).compute(&body, DT) else {
            panic!("expected torque");
        };
        assert!((neg + pos * 3.0).length() < 1e-3);
    }

    #[test]
    fn exceeding_break_angle_breaks_without_torque() {
        let mut body = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_x(1.0));
        let mut stab = Stabilizer::new(StabilizerConfig {
            break_angle: 45.0,
            ..Default::default()
        });

        assert_eq!(stab.step(&mut body, DT), MotorState::Broken);
        assert_eq!(body.torque(), Vec3::ZERO);

        // Back within range, still broken.
        body.rotation = Quat::from_rotation_x(0.1);
        assert_eq!(stab.compute(&body, DT), StabilizerStep::Broken);
        assert_eq!(stab.step(&mut body, DT), MotorState::Broken);
        assert_eq!(body.torque(), Vec3::ZERO);
    }

    #[test]
    fn upside_down_body_gets_finite_small_torque() {
        let flipped = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_x(PI));
        let sideways = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_x(FRAC_PI_2 * 0.9));

        let mut stab = Stabilizer::upright(1.0);
        let flipped_torque = match stab.compute(&flipped, DT) {
            StabilizerStep::Torque(t) => t,
            StabilizerStep::Aligned => Vec3::ZERO,
            other => panic!("unexpected {other:?}"),
        };
        let StabilizerStep::Torque(sideways_torque) = stab.compute(&sideways, DT) else {
            panic!("expected torque");
        };

        assert!(flipped_torque.is_finite());
        assert!(flipped_torque.length() < sideways_torque.length());
    }

    #[test]
    fn right_angle_error_stays_finite() {
        let body = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_z(FRAC_PI_2));
        let mut stab = Stabilizer::upright(1.0);
        match stab.compute(&body, DT) {
            StabilizerStep::Torque(t) => assert!(t.is_finite()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn disabled_axis_is_a_no_op() {
        let mut body = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_x(1.0));
        let mut stab = Stabilizer::new(StabilizerConfig {
            axis: None,
            break_angle: 1.0,
            ..Default::default()
        });
        assert_eq!(stab.compute(&body, DT), StabilizerStep::Disabled);
        assert_eq!(stab.step(&mut body, DT), MotorState::Active);
        assert_eq!(body.torque(), Vec3::ZERO);
    }

    #[test]
    fn look_stabilizer_only_yaws() {
        // Facing +X, pitched forward a little; target heading +Z.
        let rotation = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(0.2);
        let body = SimBody::at(Vec3::ZERO).with_rotation(rotation);
        let mut look = Stabilizer::look(1.0, Vec3::Z);
        let StabilizerStep::Torque(t) = look.compute(&body, DT) else {
            panic!("expected torque");
        };
        assert!(t.x.abs() < 1e-3 && t.z.abs() < 1e-3);
        assert!(t.y < 0.0);
    }

    #[test]
    fn set_direction_normalises_and_ignores_zero() {
        let mut stab = Stabilizer::upright(1.0);
        stab.set_direction(Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(stab.config.direction, Vec3::Z);
        stab.set_direction(Vec3::ZERO);
        assert_eq!(stab.config.direction, Vec3::Z);
    }

    #[test]
    fn stabilizer_set_lookup_and_removal() {
        let mut set = Stabilizers(vec![Stabilizer::look(1.0, Vec3::Z), Stabilizer::upright(2.0)]);
        assert_eq!(set.by_axis(Axis::Y).map(|s| s.config.strength), Some(2.0));
        set.remove_axis(Axis::Z);
        assert!(set.by_axis(Axis::Z).is_none());
        assert_eq!(set.0.len(), 1);
    }

    #[test]
    fn step_all_counts_new_breaks_once() {
        let mut body = SimBody::at(Vec3::ZERO).with_rotation(Quat::from_rotation_x(1.0));
        let mut set = Stabilizers(vec![Stabilizer::new(StabilizerConfig {
            break_angle: 10.0,
            ..Default::default()
        })]);
        assert_eq!(set.step_all(&mut body, DT), 1);
        assert_eq!(set.step_all(&mut body, DT), 0);
    }
}
