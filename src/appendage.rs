//! Detachable limbs. An appendage lives as long as the joint holding it on
//! (its life source); when that joint breaks the limb goes limp, loses most
//! of its mass and is despawned a while later.

use crate::config::ArenaConfig;
use crate::constants::{APPENDAGE_DESPAWN_SECS, DEAD_MASS_SCALE};
use crate::joint::DirectionalJoint;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Whether the joint an appendage hangs from still holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeSource {
    Intact,
    Severed,
}

impl LifeSource {
    /// A missing joint counts as severed.
    pub fn from_joint(joint: Option<&DirectionalJoint>) -> Self {
        match joint {
            Some(joint) if !joint.is_broken() => LifeSource::Intact,
            _ => LifeSource::Severed,
        }
    }
}

/// What the host must do to a limb that just died.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppendageDeath {
    pub mass_scale: f32,
    pub despawn_after: f32,
}

#[derive(Component, Debug, Clone)]
pub struct Appendage {
    alive: bool,
    dead_mass_scale: f32,
    despawn_after: f32,
}

impl Default for Appendage {
    fn default() -> Self {
        Self::new(DEAD_MASS_SCALE, APPENDAGE_DESPAWN_SECS)
    }
}

impl Appendage {
    pub fn new(dead_mass_scale: f32, despawn_after: f32) -> Self {
        Self {
            alive: true,
            dead_mass_scale,
            despawn_after,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(config.dead_mass_scale, config.appendage_despawn_secs)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Only living limbs hurt the player.
    pub fn can_attack(&self) -> bool {
        self.alive
    }

    /// Per-frame check against the life source.
    pub fn update(&mut self, life: LifeSource) -> Option<AppendageDeath> {
        if self.alive && life == LifeSource::Severed {
            self.die()
        } else {
            None
        }
    }

    /// Kill the limb. Only the first call reports a death; callers that kill
    /// it directly must also break its life-source joint.
    pub fn die(&mut self) -> Option<AppendageDeath> {
        if !self.alive {
            return None;
        }
        self.alive = false;
        Some(AppendageDeath {
            mass_scale: self.dead_mass_scale,
            despawn_after: self.despawn_after,
        })
    }
}

/// Despawns the entity when the timer runs out.
#[derive(Component, Debug, Clone)]
pub struct DespawnTimer(pub Timer);

/// Scale a collider's mass (or density) in place.
pub fn scale_collider_mass(props: &mut ColliderMassProperties, scale: f32) {
    match props {
        ColliderMassProperties::Density(density) => *density *= scale,
        ColliderMassProperties::Mass(mass) => *mass *= scale,
        ColliderMassProperties::MassProperties(mprops) => {
            mprops.mass *= scale;
            mprops.principal_inertia *= scale;
        }
    }
}

/// Kill appendages whose joint broke (or vanished), lighten them and queue
/// their despawn.
pub fn appendage_life_system(
    mut commands: Commands,
    mut q_appendages: Query<(
        Entity,
        &mut Appendage,
        Option<&DirectionalJoint>,
        Option<&mut ColliderMassProperties>,
    )>,
) {
    for (entity, mut appendage, joint, mass_props) in q_appendages.iter_mut() {
        let Some(death) = appendage.update(LifeSource::from_joint(joint)) else {
            continue;
        };
        apply_death(&mut commands, entity, death, mass_props);
    }
}

/// Host-side effects of a limb death.
pub fn apply_death(
    commands: &mut Commands,
    entity: Entity,
    death: AppendageDeath,
    mass_props: Option<Mut<ColliderMassProperties>>,
) {
    if let Some(mut props) = mass_props {
        scale_collider_mass(&mut props, death.mass_scale);
    }
    commands.entity(entity).insert(DespawnTimer(Timer::from_seconds(
        death.despawn_after,
        TimerMode::Once,
    )));
    info!("Appendage {:?} severed", entity);
}

pub fn despawn_timer_system(
    mut commands: Commands,
    time: Res<Time>,
    mut q_timers: Query<(Entity, &mut DespawnTimer)>,
) {
    for (entity, mut timer) in q_timers.iter_mut() {
        if timer.0.tick(time.delta()).is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointConfig;

    #[test]
    fn intact_joint_keeps_limb_alive() {
        let joint = DirectionalJoint::new(JointConfig::default(), None).unwrap();
        let mut arm = Appendage::default();
        assert_eq!(arm.update(LifeSource::from_joint(Some(&joint))), None);
        assert!(arm.is_alive() && arm.can_attack());
    }

    #[test]
    fn broken_or_missing_joint_kills_once() {
        let mut joint = DirectionalJoint::new(JointConfig::default(), None).unwrap();
        joint.break_joint();
        let mut arm = Appendage::default();

        let death = arm.update(LifeSource::from_joint(Some(&joint))).unwrap();
        assert!((death.mass_scale - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(death.despawn_after, APPENDAGE_DESPAWN_SECS);
        assert!(!arm.can_attack());

        assert_eq!(arm.update(LifeSource::from_joint(None)), None);
        assert_eq!(arm.die(), None);
    }

    #[test]
    fn mass_scaling_per_variant() {
        let mut density = ColliderMassProperties::Density(3.0);
        scale_collider_mass(&mut density, 1.0 / 3.0);
        assert!(matches!(density, ColliderMassProperties::Density(d) if (d - 1.0).abs() < 1e-6));

        let mut mass = ColliderMassProperties::Mass(6.0);
        scale_collider_mass(&mut mass, 0.5);
        assert!(matches!(mass, ColliderMassProperties::Mass(m) if (m - 3.0).abs() < 1e-6));
    }

    #[test]
    fn life_system_lightens_and_schedules_despawn() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, appendage_life_system);

        let mut joint = DirectionalJoint::new(JointConfig::default(), None).unwrap();
        joint.break_joint();
        let arm = app
            .world_mut()
            .spawn((Appendage::default(), joint, ColliderMassProperties::Density(3.0)))
            .id();

        app.update();

        let world = app.world();
        assert!(!world.get::<Appendage>(arm).unwrap().is_alive());
        assert!(world.get::<DespawnTimer>(arm).is_some());
        assert!(matches!(
            world.get::<ColliderMassProperties>(arm),
            Some(ColliderMassProperties::Density(d)) if (*d - 1.0).abs() < 1e-6
        ));
    }
}
