//! Enemy spawner with a difficulty ramp: batches arrive faster over time and
//! hard variants become likelier the longer a game runs.

use crate::config::ArenaConfig;
use crate::enemy::{spawn_enemy, EnemyController, EnemyVariant};
use crate::math::angle_between_deg;
use crate::player::{Player, PlayerLook};
use crate::session::{GamePhase, GameSession};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Candidate spawn location; its `Transform` is used as the spawn pose.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SpawnPoint;

/// Random source for spawn placement; tests seed it.
#[derive(Resource)]
pub struct SpawnRng(pub StdRng);

impl Default for SpawnRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Viewer whose line of sight spawns avoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub position: Vec3,
    pub forward: Vec3,
}

/// One accepted spawn: which candidate, which variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnChoice {
    pub point: usize,
    pub variant: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct SpawnDirector {
    spawn_time: f32,
    speedup: f32,
    min_spawn_time: f32,
    timer: f32,
    max_enemies: u32,
    batch: u32,
    current: u32,
    clear_radius: f32,
    near_distance: f32,
    look_angle_deg: f32,
    hard_threshold: f32,
    hard_time_scale: f32,
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}

impl SpawnDirector {
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            spawn_time: config.spawn_time,
            speedup: config.spawn_speedup,
            min_spawn_time: config.min_spawn_time,
            timer: 0.0,
            max_enemies: config.max_enemies,
            batch: config.spawn_batch,
            current: 0,
            clear_radius: config.spawn_clear_radius,
            near_distance: config.player_near_distance,
            look_angle_deg: config.player_look_angle_deg,
            hard_threshold: config.hard_mode_threshold,
            hard_time_scale: config.hard_mode_time_scale,
        }
    }

    /// Interval the next batch will wait for.
    pub fn spawn_time(&self) -> f32 {
        self.spawn_time
    }

    /// Live enemies the director knows about.
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn enemy_spawned(&mut self) {
        self.current += 1;
    }

    pub fn enemy_died(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Count the timer down. When it hits zero it restarts from the current
    /// interval, the interval shrinks, and a batch is requested unless the
    /// arena is already full. The first tick always fires.
    pub fn tick(&mut self, dt: f32) -> Option<u32> {
        self.timer = (self.timer - dt).max(0.0);
        if self.timer > 0.0 {
            return None;
        }

        self.timer = self.spawn_time;
        self.spawn_time *= self.speedup;
        if self.spawn_time < self.min_spawn_time {
            self.spawn_time = 0.0;
        }

        (self.current < self.max_enemies).then_some(self.batch)
    }

    /// A point is observed when the viewer stands close to it or faces it.
    pub fn is_observed(&self, point: Vec3, observer: Observer) -> bool {
        point.distance(observer.position) < self.near_distance
            || angle_between_deg(point - observer.position, observer.forward) < self.look_angle_deg
    }

    pub fn is_occupied(&self, point: Vec3, enemies: &[Vec3]) -> bool {
        enemies
            .iter()
            .any(|enemy| enemy.distance(point) < self.clear_radius)
    }

    /// Hard variants unlock as `atan(game_time / scale)` grows towards π/2.
    pub fn roll_hard<R: Rng>(&self, game_time: f32, rng: &mut R) -> bool {
        (game_time / self.hard_time_scale).atan() * rng.gen::<f32>() > self.hard_threshold
    }

    /// Pick up to `count` spawns. Candidates are visited in random order
    /// without repeats; occupied or observed points are dropped. Variants
    /// are split in halves: the first half easy, the second hard.
    #[allow(clippy::too_many_arguments)]
    pub fn choose_spawns<R: Rng>(
        &self,
        candidates: &[Vec3],
        enemies: &[Vec3],
        observer: Observer,
        count: u32,
        game_time: f32,
        variants: usize,
        rng: &mut R,
    ) -> Vec<SpawnChoice> {
        let mut choices = Vec::new();
        if variants == 0 {
            return choices;
        }
        let half = variants / 2;
        let mut remaining: Vec<usize> = (0..candidates.len()).collect();

        while (choices.len() as u32) < count && !remaining.is_empty() {
            let hard = self.roll_hard(game_time, rng);
            let idx = rng.gen_range(0..remaining.len());
            let point = remaining.swap_remove(idx);
            let position = candidates[point];

            if self.is_occupied(position, enemies) || self.is_observed(position, observer) {
                continue;
            }

            let variant = if half == 0 {
                0
            } else {
                rng.gen_range(0..half) + if hard { half } else { 0 }
            };
            choices.push(SpawnChoice { point, variant });
        }
        choices
    }
}

pub struct SpawnerPlugin;

impl Plugin for SpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnDirector>()
            .init_resource::<SpawnRng>()
            .add_systems(Update, enemy_spawn_system);
    }
}

/// Spawns only during active play; wipes hold the timer.
#[allow(clippy::too_many_arguments)]
pub fn enemy_spawn_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<ArenaConfig>,
    session: Res<GameSession>,
    mut director: ResMut<SpawnDirector>,
    mut rng: ResMut<SpawnRng>,
    q_points: Query<&Transform, With<SpawnPoint>>,
    q_enemies: Query<&Transform, With<EnemyController>>,
    q_player: Query<(Entity, &Transform, &PlayerLook), With<Player>>,
) {
    if session.phase() != GamePhase::Game {
        return;
    }
    let Some(batch) = director.tick(time.delta_secs()) else {
        return;
    };
    let Ok((player, player_transform, look)) = q_player.single() else {
        return;
    };

    let points: Vec<&Transform> = q_points.iter().collect();
    let candidates: Vec<Vec3> = points.iter().map(|t| t.translation).collect();
    let enemies: Vec<Vec3> = q_enemies.iter().map(|t| t.translation).collect();
    let observer = Observer {
        position: player_transform.translation,
        forward: look.forward(),
    };

    let choices = director.choose_spawns(
        &candidates,
        &enemies,
        observer,
        batch,
        session.game_time(),
        EnemyVariant::ALL.len(),
        &mut rng.0,
    );
    for choice in choices {
        let variant = EnemyVariant::ALL[choice.variant];
        let spawn = points[choice.point];
        match spawn_enemy(
            &mut commands,
            &config,
            variant,
            spawn.translation,
            spawn.rotation,
            Some(player),
        ) {
            Ok(_) => {
                director.enemy_spawned();
                info!(
                    "Spawned {:?} enemy at {:?} ({} alive)",
                    variant,
                    spawn.translation,
                    director.current()
                );
            }
            Err(e) => warn!("Could not spawn {:?} enemy: {e}", variant),
        }
    }
}
