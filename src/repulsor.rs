//! Hover spring: pushes a body away from whatever a short ray from its anchor
//! hits, proportionally to how far inside `max_distance` the hit is.

use crate::body::RigidBodyHandle;
use crate::constants::{DEFAULT_REPULSOR_FORCE, DEFAULT_REPULSOR_MAX_DISTANCE};
use bevy::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct RepulsorConfig {
    pub force: f32,
    pub max_distance: f32,
    /// Ray origin, local space.
    pub anchor: Vec3,
    /// Ray direction, local space.
    pub axis: Vec3,
}

impl Default for RepulsorConfig {
    fn default() -> Self {
        Self {
            force: DEFAULT_REPULSOR_FORCE,
            max_distance: DEFAULT_REPULSOR_MAX_DISTANCE,
            anchor: Vec3::new(0.0, -0.5, 0.0),
            axis: Vec3::NEG_Y,
        }
    }
}

/// World-space probe the host should cast for this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepulsorRay {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
}

/// Where the probe hit, world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
}

#[derive(Component, Debug, Clone)]
pub struct Repulsor {
    pub config: RepulsorConfig,
    repulsion: Vec3,
}

impl Repulsor {
    pub fn new(mut config: RepulsorConfig) -> Self {
        config.axis = config.axis.normalize_or(Vec3::NEG_Y);
        Self {
            config,
            repulsion: Vec3::ZERO,
        }
    }

    /// Displacement the spring acted on last tick.
    pub fn repulsion(&self) -> Vec3 {
        self.repulsion
    }

    pub fn ray<B: RigidBodyHandle + ?Sized>(&self, body: &B) -> RepulsorRay {
        RepulsorRay {
            origin: body.transform_point(self.config.anchor),
            direction: body.transform_direction(self.config.axis),
            max_distance: self.config.max_distance,
        }
    }

    /// Apply the push for this tick. Returns the force applied to `body`.
    pub fn step<B: RigidBodyHandle + ?Sized>(
        &mut self,
        body: &mut B,
        hit: Option<RayHit>,
        hit_body: Option<&mut B>,
    ) -> Vec3 {
        let Some(hit) = hit else {
            self.repulsion = Vec3::ZERO;
            return Vec3::ZERO;
        };

        let hit_vector = body.transform_point(self.config.anchor) - hit.point;
        self.repulsion =
            hit_vector.normalize_or_zero() * (self.config.max_distance - hit_vector.length());
        let force = self.repulsion * self.config.force;

        body.apply_force(force);
        if let Some(other) = hit_body {
            other.apply_force_at_point(-force, hit.point);
        }
        force
    }
}
