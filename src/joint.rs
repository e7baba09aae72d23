//! Directional anchor joint: a spring between an anchor on this body and an
//! anchor on a connected body (or a fixed world point).
//!
//! In directional mode the joint preserves the whole relative offset captured
//! at activation, so a head stays above its torso even while the torso
//! twists. Individual rotation axes can be allowed to carry the offset with
//! them through `follow_rotation`. In spring mode only the distance is kept
//! inside `[min_length_ratio, max_length_ratio] × initial length`.
//!
//! Forces are equal and opposite at the two anchors. When the spring force
//! exceeds `break_force` the force is still applied for that tick and the
//! joint is broken from the next tick on.

use crate::body::{MotorState, RigidBodyHandle};
use crate::constants::DEFAULT_JOINT_SPRING;
use crate::error::{validate_length_ratios, MotionResult};
use crate::math::{filter_rotation, harmonic_mass, vector_projection};
use bevy::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct JointConfig {
    /// Anchor on the owning body, local space.
    pub anchor: Vec3,
    /// Anchor on the connected body, local space. With no connected body it is
    /// a world offset from the owning anchor's activation position.
    pub connected_anchor: Vec3,
    pub spring: f32,
    pub break_force: f32,
    pub directional: bool,
    pub min_length_ratio: f32,
    pub max_length_ratio: f32,
    /// Axes of the owning body's rotation that carry the offset with them.
    pub follow_rotation: BVec3,
    /// Axes of the connected body's rotation that carry the offset with them.
    pub connected_follow_rotation: BVec3,
    /// Damping ratio; 0 disables damping.
    pub damping: f32,
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            anchor: Vec3::ZERO,
            connected_anchor: Vec3::ZERO,
            spring: DEFAULT_JOINT_SPRING,
            break_force: f32::INFINITY,
            directional: true,
            min_length_ratio: 1.0,
            max_length_ratio: 1.0,
            follow_rotation: BVec3::FALSE,
            connected_follow_rotation: BVec3::FALSE,
            damping: 0.0,
        }
    }
}

impl JointConfig {
    pub fn validate(&self) -> MotionResult<()> {
        validate_length_ratios(self.min_length_ratio, self.max_length_ratio)
    }
}

/// State captured when the joint activates.
#[derive(Debug, Clone, Copy, PartialEq)]
struct JointBaseline {
    initial_alignment: Vec3,
    initial_length: f32,
    min_length: f32,
    max_length: f32,
    own_rotation: Quat,
    connected_rotation: Quat,
    /// Where the connected anchor is pinned when there is no connected body.
    fixed_anchor: Vec3,
}

/// A force applied at a world-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorForce {
    pub force: Vec3,
    pub point: Vec3,
}

/// Forces produced by one joint tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointForces {
    pub own: AnchorForce,
    /// Reaction on the connected body; `None` when it cannot take forces.
    pub connected: Option<AnchorForce>,
    pub spring_delta: Vec3,
    pub spring_force: Vec3,
    /// The spring force exceeded the break threshold on this tick.
    pub breaks: bool,
}

#[derive(Component, Debug, Clone)]
pub struct DirectionalJoint {
    pub config: JointConfig,
    /// Weak reference; may be absent from the start or vanish later.
    pub connected: Option<Entity>,
    baseline: Option<JointBaseline>,
    state: MotorState,
    spring_delta: Vec3,
    last_force: Vec3,
    connected_anchor_position: Vec3,
}

impl DirectionalJoint {
    /// Build an inactive joint. Rejects inverted or negative length ratios.
    pub fn new(config: JointConfig, connected: Option<Entity>) -> MotionResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            connected,
            baseline: None,
            state: MotorState::Active,
            spring_delta: Vec3::ZERO,
            last_force: Vec3::ZERO,
            connected_anchor_position: Vec3::ZERO,
        })
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_broken(&self) -> bool {
        self.state == MotorState::Broken
    }

    pub fn is_activated(&self) -> bool {
        self.baseline.is_some()
    }

    /// Displacement the spring is acting on, from the last tick.
    pub fn spring_delta(&self) -> Vec3 {
        self.spring_delta
    }

    /// Total force (spring plus damping) applied at the own anchor last tick.
    pub fn last_force(&self) -> Vec3 {
        self.last_force
    }

    /// World position of the connected anchor as of the last tick.
    pub fn connected_anchor_position(&self) -> Vec3 {
        self.connected_anchor_position
    }

    /// Length between anchors captured at activation.
    pub fn initial_length(&self) -> Option<f32> {
        self.baseline.map(|b| b.initial_length)
    }

    /// Break the joint from outside (e.g. an appendage was killed directly).
    pub fn break_joint(&mut self) {
        self.state = MotorState::Broken;
    }

    /// Capture the rest offset and rotation baselines from the current poses.
    pub fn activate<B: RigidBodyHandle + ?Sized>(&mut self, own: &B, connected: Option<&B>) {
        let own_anchor = own.transform_point(self.config.anchor);
        let (connected_anchor, connected_rotation) = match connected {
            Some(body) => (
                body.transform_point(self.config.connected_anchor),
                body.rotation(),
            ),
            None => (own_anchor, Quat::IDENTITY),
        };

        let initial_alignment = connected_anchor - own_anchor;
        let initial_length = initial_alignment.length();
        self.baseline = Some(JointBaseline {
            initial_alignment,
            initial_length,
            min_length: initial_length * self.config.min_length_ratio,
            max_length: initial_length * self.config.max_length_ratio,
            own_rotation: own.rotation(),
            connected_rotation,
            fixed_anchor: connected_anchor,
        });
        self.connected_anchor_position = connected_anchor;
    }

    /// Compute this tick's forces without applying them. Activates on first
    /// use; returns `None` once broken.
    pub fn compute<B: RigidBodyHandle + ?Sized>(
        &mut self,
        own: &B,
        connected: Option<&B>,
    ) -> Option<JointForces> {
        if self.state == MotorState::Broken {
            return None;
        }
        if self.baseline.is_none() {
            self.activate(own, connected);
        }
        let baseline = self.baseline.as_mut()?;
        let config = &self.config;

        let own_anchor = own.transform_point(config.anchor);
        let connected_anchor = match connected {
            Some(body) => {
                let point = body.transform_point(config.connected_anchor);
                // Remembered in case the connected body goes away.
                baseline.fixed_anchor = point;
                point
            }
            None => baseline.fixed_anchor,
        };
        let alignment = connected_anchor - own_anchor;

        let spring_delta = if config.directional {
            let own_follow = filter_rotation(
                own.rotation() * baseline.own_rotation.inverse(),
                config.follow_rotation,
            );
            let connected_follow = connected
                .map(|body| {
                    filter_rotation(
                        body.rotation() * baseline.connected_rotation.inverse(),
                        config.connected_follow_rotation,
                    )
                })
                .unwrap_or(Quat::IDENTITY);
            let expected = connected_follow * (own_follow * baseline.initial_alignment);
            alignment - expected
        } else {
            let length = alignment.length();
            let strain =
                (length - baseline.min_length).min(0.0) + (length - baseline.max_length).max(0.0);
            alignment.normalize_or_zero() * strain
        };

        let spring_force = spring_delta * config.spring;
        let mut force = spring_force;

        if config.damping > 0.0 {
            let connected_mass = connected
                .filter(|body| body.accepts_forces())
                .map(|body| body.mass())
                .unwrap_or(f32::INFINITY);
            let effective_mass = harmonic_mass(own.mass(), connected_mass);
            let connected_velocity = connected
                .map(|body| body.velocity_at_point(connected_anchor))
                .unwrap_or(Vec3::ZERO);
            let relative_velocity = vector_projection(
                own.velocity_at_point(own_anchor) - connected_velocity,
                spring_delta,
            );
            let critical = 2.0 * (config.spring * effective_mass).max(0.0).sqrt();
            force -= relative_velocity * critical * config.damping;
        }

        let reaction = connected
            .filter(|body| body.accepts_forces())
            .map(|_| AnchorForce {
                force: -force,
                point: connected_anchor,
            });

        self.spring_delta = spring_delta;
        self.last_force = force;
        self.connected_anchor_position = connected_anchor;

        Some(JointForces {
            own: AnchorForce {
                force,
                point: own_anchor,
            },
            connected: reaction,
            spring_delta,
            spring_force,
            breaks: spring_force.length() > config.break_force,
        })
    }

    /// Compute and apply this tick's forces.
    pub fn step<B: RigidBodyHandle + ?Sized>(
        &mut self,
        own: &mut B,
        mut connected: Option<&mut B>,
    ) -> MotorState {
        let Some(forces) = self.compute(&*own, connected.as_deref()) else {
            return self.state;
        };

        own.apply_force_at_point(forces.own.force, forces.own.point);
        if let (Some(body), Some(reaction)) = (connected.as_deref_mut(), forces.connected) {
            body.apply_force_at_point(reaction.force, reaction.point);
        }

        if forces.breaks {
            self.state = MotorState::Broken;
        }
        self.state
    }
}
