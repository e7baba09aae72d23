//! Shared vector and angle helpers used by the force generators.

use crate::error::{MotionError, MotionResult};
use bevy::math::{BVec3, EulerRot, Quat, Vec3};

/// Angles closer than this (degrees) to 90°, 180° or 270° are treated as
/// singular by the stabilizer.
pub const SINGULAR_ANGLE_TOLERANCE_DEG: f32 = 1e-3;

/// Body-local principal axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Copy of `v` with this axis' component set to zero.
    pub fn zero_component(self, v: Vec3) -> Vec3 {
        match self {
            Axis::X => Vec3::new(0.0, v.y, v.z),
            Axis::Y => Vec3::new(v.x, 0.0, v.z),
            Axis::Z => Vec3::new(v.x, v.y, 0.0),
        }
    }
}

/// Projection of `v` onto `onto`. Zero when `onto` is (near) zero length.
pub fn vector_projection(v: Vec3, onto: Vec3) -> Vec3 {
    let len_sq = onto.length_squared();
    if len_sq <= f32::EPSILON {
        return Vec3::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Unsigned angle between two vectors in degrees, in `[0, 180]`.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    a.angle_between(b).to_degrees()
}

/// Clamp `value` (degrees) into the arc `[min, max]`, snapping to whichever
/// bound is nearer when it falls outside.
pub fn clamp_angle_deg(value: f32, min: f32, max: f32) -> MotionResult<f32> {
    let span = max - min;
    if min <= -360.0 || max >= 360.0 || span <= 0.0 || span >= 360.0 {
        return Err(MotionError::InvalidAngleRange { min, max });
    }

    let shifted = (value - min).rem_euclid(360.0);
    if shifted <= span {
        return Ok(min + shifted);
    }

    // Midpoint of the excluded arc decides which bound is closer.
    if shifted > (360.0 + span) / 2.0 {
        Ok(min)
    } else {
        Ok(max)
    }
}

/// True when `deg` sits on one of the stabilizer's degenerate angles.
pub fn is_near_singular_angle(deg: f32) -> bool {
    [90.0_f32, 180.0, 270.0]
        .iter()
        .any(|s| (deg - s).abs() <= SINGULAR_ANGLE_TOLERANCE_DEG)
}

/// Effective mass of two coupled bodies: `2 / (1/m1 + 1/m2)`.
///
/// An infinite mass (immovable anchor) yields `2 * m1`.
pub fn harmonic_mass(m1: f32, m2: f32) -> f32 {
    2.0 / (1.0 / m1 + 1.0 / m2)
}

/// Keep only the flagged Euler components of `rotation`.
///
/// Decomposes as yaw (Y), pitch (X), roll (Z), zeroes the unflagged angles and
/// recomposes in the same order.
pub fn filter_rotation(rotation: Quat, follow: BVec3) -> Quat {
    if !follow.any() {
        return Quat::IDENTITY;
    }
    if follow.all() {
        return rotation;
    }
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(
        EulerRot::YXZ,
        if follow.y { yaw } else { 0.0 },
        if follow.x { pitch } else { 0.0 },
        if follow.z { roll } else { 0.0 },
    )
}
