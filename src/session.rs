//! Game session: a stack of phases (menus push on top of play and pop back
//! off), the game clock, player health and the kill counter.
//!
//! The phase stack lets a pause opened during a wipe resume into the wipe,
//! which a flat state enum cannot express without extra bookkeeping.

use crate::config::ArenaConfig;
use crate::constants::{STARTING_HEALTH, WIPE_RETRY_SECS, WIPE_SECS};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    /// Main menu; the session starts here.
    #[default]
    Main,
    /// Active play.
    Game,
    /// The player was just hit; every enemy dies and spawning pauses.
    Wipe,
    /// Frozen; resuming returns to whatever phase was below.
    Pause,
    /// Out of health.
    End,
}

/// What a player hit turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// A hit was already being resolved.
    Ignored,
    Wipe,
    GameOver,
}

/// A living appendage touched the player.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlayerHit;

/// A wipe began; every enemy should die.
#[derive(Message, Debug, Clone, Copy)]
pub struct WipeStarted;

#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    phases: Vec<GamePhase>,
    game_time: f32,
    health: u32,
    kills: u32,
    hit_in_progress: bool,
    /// Seconds until the running wipe is checked for completion.
    wipe_timer: Option<f32>,
    starting_health: u32,
    wipe_secs: f32,
    wipe_retry_secs: f32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(STARTING_HEALTH, WIPE_SECS, WIPE_RETRY_SECS)
    }
}

impl GameSession {
    pub fn new(starting_health: u32, wipe_secs: f32, wipe_retry_secs: f32) -> Self {
        Self {
            phases: vec![GamePhase::Main],
            game_time: 0.0,
            health: 0,
            kills: 0,
            hit_in_progress: false,
            wipe_timer: None,
            starting_health,
            wipe_secs,
            wipe_retry_secs,
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self::new(
            config.starting_health,
            config.wipe_secs,
            config.wipe_retry_secs,
        )
    }

    /// Top of the phase stack.
    pub fn phase(&self) -> GamePhase {
        self.phases.last().copied().unwrap_or_default()
    }

    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn is_hit_in_progress(&self) -> bool {
        self.hit_in_progress
    }

    /// Game or Wipe: the arena is live.
    pub fn is_playing(&self) -> bool {
        matches!(self.phase(), GamePhase::Game | GamePhase::Wipe)
    }

    /// Pause and End stop the simulation clock.
    pub fn is_time_frozen(&self) -> bool {
        matches!(self.phase(), GamePhase::Pause | GamePhase::End)
    }

    pub fn start_game(&mut self) {
        self.phases.push(GamePhase::Game);
        self.game_time = 0.0;
        self.health = self.starting_health;
        self.kills = 0;
        self.hit_in_progress = false;
        self.wipe_timer = None;
    }

    /// Spend one health on a wipe, or end the game when none is left.
    /// Hits landing while a previous one is still resolving are ignored.
    pub fn player_hit(&mut self) -> HitOutcome {
        if self.hit_in_progress {
            return HitOutcome::Ignored;
        }
        self.hit_in_progress = true;

        if self.health > 0 {
            self.health -= 1;
            self.phases.push(GamePhase::Wipe);
            self.wipe_timer = Some(self.wipe_secs);
            HitOutcome::Wipe
        } else {
            self.phases.push(GamePhase::End);
            HitOutcome::GameOver
        }
    }

    /// Advance the game clock and the wipe timer. Returns `true` on the tick
    /// the wipe ends.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_playing() {
            self.game_time += dt;
        }

        let Some(remaining) = self.wipe_timer.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return false;
        }

        if self.phase() == GamePhase::Wipe {
            self.phases.pop();
            self.hit_in_progress = false;
            self.wipe_timer = None;
            true
        } else {
            // Paused on top of the wipe; check again shortly.
            self.wipe_timer = Some(self.wipe_retry_secs);
            false
        }
    }

    /// Only a live arena can be paused.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.phases.push(GamePhase::Pause);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase() != GamePhase::Pause {
            return false;
        }
        self.phases.pop();
        true
    }

    pub fn back_to_main(&mut self) {
        self.phases.clear();
        self.phases.push(GamePhase::Main);
        self.wipe_timer = None;
        self.hit_in_progress = false;
    }

    /// Kills only count during active play; wipe kills are free.
    pub fn add_kill(&mut self) {
        if self.phase() == GamePhase::Game {
            self.kills += 1;
        }
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameSession>()
            .add_message::<PlayerHit>()
            .add_message::<WipeStarted>()
            .add_systems(
                Update,
                (
                    player_hit_system,
                    session_clock_system,
                    sync_virtual_time_system,
                )
                    .chain(),
            );
    }
}

fn player_hit_system(
    mut hits: MessageReader<PlayerHit>,
    mut session: ResMut<GameSession>,
    mut wipes: MessageWriter<WipeStarted>,
) {
    for _ in hits.read() {
        if !session.is_playing() {
            continue;
        }
        match session.player_hit() {
            HitOutcome::Wipe => {
                info!("Player hit; {} health left", session.health());
                wipes.write(WipeStarted);
            }
            HitOutcome::GameOver => {
                info!(
                    "Game over after {:.1}s with {} kills",
                    session.game_time(),
                    session.kills()
                );
            }
            HitOutcome::Ignored => {}
        }
    }
}

fn session_clock_system(time: Res<Time>, mut session: ResMut<GameSession>) {
    if session.tick(time.delta_secs()) {
        info!("Wipe finished");
    }
}

/// Pause and End freeze virtual time, which also stops the fixed schedule.
fn sync_virtual_time_system(session: Res<GameSession>, mut time: ResMut<Time<Virtual>>) {
    let frozen = session.is_time_frozen();
    if frozen && !time.is_paused() {
        time.pause();
    } else if !frozen && time.is_paused() {
        time.unpause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameSession {
        let mut session = GameSession::default();
        session.start_game();
        session
    }

    #[test]
    fn starts_in_main_menu() {
        let session = GameSession::default();
        assert_eq!(session.phase(), GamePhase::Main);
        assert!(!session.is_playing());
    }

    #[test]
    fn start_game_resets_counters() {
        let mut session = playing();
        session.add_kill();
        session.tick(2.0);
        session.back_to_main();
        session.start_game();
        assert_eq!(session.phase(), GamePhase::Game);
        assert_eq!(session.health(), STARTING_HEALTH);
        assert_eq!(session.kills(), 0);
        assert_eq!(session.game_time(), 0.0);
    }

    #[test]
    fn hit_wipes_then_returns_to_game() {
        let mut session = playing();
        assert_eq!(session.player_hit(), HitOutcome::Wipe);
        assert_eq!(session.phase(), GamePhase::Wipe);
        assert_eq!(session.health(), STARTING_HEALTH - 1);
        assert_eq!(session.player_hit(), HitOutcome::Ignored);

        assert!(!session.tick(WIPE_SECS - 0.5));
        assert!(session.tick(1.0));
        assert_eq!(session.phase(), GamePhase::Game);
        assert!(!session.is_hit_in_progress());
    }

    #[test]
    fn hit_at_zero_health_ends_the_game() {
        let mut session = GameSession::new(0, WIPE_SECS, WIPE_RETRY_SECS);
        session.start_game();
        assert_eq!(session.player_hit(), HitOutcome::GameOver);
        assert_eq!(session.phase(), GamePhase::End);
        assert!(session.is_time_frozen());
        assert!(!session.pause());
    }

    #[test]
    fn wipe_ending_while_paused_retries() {
        let mut session = playing();
        session.player_hit();
        assert!(session.pause());
        assert!(!session.tick(WIPE_SECS + 0.1));
        assert_eq!(session.phase(), GamePhase::Pause);

        assert!(session.resume());
        assert_eq!(session.phase(), GamePhase::Wipe);
        assert!(!session.tick(WIPE_RETRY_SECS * 0.5));
        assert!(session.tick(WIPE_RETRY_SECS));
        assert_eq!(session.phase(), GamePhase::Game);
    }

    #[test]
    fn clock_only_runs_in_play() {
        let mut session = GameSession::default();
        session.tick(1.0);
        assert_eq!(session.game_time(), 0.0);

        session.start_game();
        session.tick(1.0);
        session.pause();
        session.tick(10.0);
        assert!((session.game_time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn kills_count_only_in_game() {
        let mut session = playing();
        session.add_kill();
        session.player_hit();
        session.add_kill();
        assert_eq!(session.kills(), 1);
    }

    #[test]
    fn resume_without_pause_is_a_no_op() {
        let mut session = playing();
        assert!(!session.resume());
        assert_eq!(session.phase(), GamePhase::Game);
    }
}
