//! Pursuer AI: the scatter/chase/frightened/dead state machine and the
//! per-cell direction decision layered on top of [`Mover`].

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use bevy_ecs::event::{EventReader, EventWriter};
use bevy_ecs::system::{Query, Res, ResMut};
use glam::{IVec2, Vec2};
use rand::seq::IndexedRandom;
use smallvec::SmallVec;
use strum_macros::{Display, EnumIter};
use tracing::{debug, trace, warn};

use crate::constants::{DEAD_SPEED_FACTOR, FRIGHTENED_SPEED_FACTOR, RELEASE_FADE_MS};
use crate::direction::{Direction, DIRECTIONS};
use crate::events::{AudioEvent, RunStarted};
use crate::grid::{cell_center, TileSense};
use crate::level::Level;
use crate::movement::{Mover, Position, Velocity};
use crate::player::Player;
use crate::scheduler::{TickScheduler, TimerAction, TimerFired};
use crate::session::{Difficulty, RunState, Wave};

/// The pursuer roster. The index matches the spawn markers and scatter
/// corners in [`Level`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum GhostPersona {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostPersona {
    pub fn index(self) -> usize {
        match self {
            GhostPersona::Blinky => 0,
            GhostPersona::Pinky => 1,
            GhostPersona::Inky => 2,
            GhostPersona::Clyde => 3,
        }
    }

    /// Delay before this pursuer leaves the home area once the run starts.
    /// `None` releases immediately.
    pub fn release_delay_ms(self) -> Option<u64> {
        match self {
            GhostPersona::Blinky => None,
            GhostPersona::Pinky => Some(8000),
            GhostPersona::Inky => Some(10_000),
            GhostPersona::Clyde => Some(12_000),
        }
    }
}

/// Behavior mode. `Dead` is reachable only from `Frightened`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Dead,
}

/// The target-seeking state machine of one pursuer.
#[derive(Component, Debug)]
pub struct GhostBrain {
    pub mode: GhostMode,
    /// Mode restored when frightened/dead ends. Snapshotted only on the
    /// first frightened entry of a vulnerability window.
    recover_mode: GhostMode,
    /// The cell currently steered toward; meaning depends on mode.
    pub target: IVec2,
    scatter_target: IVec2,
    /// Where released and dead pursuers converge, in pixels.
    pub home: Vec2,
    home_marker: IVec2,
    wave_index: usize,
    pub in_play: bool,
    prev_marker: IVec2,
    wave_timer: Option<crate::scheduler::TimerHandle>,
    release_timer: Option<crate::scheduler::TimerHandle>,
}

impl GhostBrain {
    pub fn new(persona: GhostPersona, level: &Level) -> GhostBrain {
        let corner = level.scatter_corners[persona.index()];
        GhostBrain {
            mode: GhostMode::Scatter,
            recover_mode: GhostMode::Scatter,
            target: corner,
            scatter_target: corner,
            home: cell_center(level.home_marker),
            home_marker: level.home_marker,
            wave_index: 0,
            in_play: false,
            prev_marker: IVec2::splat(-1),
            wave_timer: None,
            release_timer: None,
        }
    }

    pub fn recover_mode(&self) -> GhostMode {
        self.recover_mode
    }

    /// Scatter entry: the run start / end-of-release transition. Begins the
    /// wave cycle and moves off leftward by convention.
    pub fn on_start(
        &mut self,
        entity: Entity,
        scheduler: &mut TickScheduler,
        waves: &[Wave],
        mover: &mut Mover,
        velocity: &mut Velocity,
    ) {
        if self.in_play {
            return;
        }
        self.in_play = true;
        self.mode = GhostMode::Scatter;
        self.recover_mode = GhostMode::Scatter;
        self.target = self.scatter_target;

        self.restart_wave_timer(entity, scheduler, waves);
        mover.begin_move(velocity, Direction::Left);
        debug!(ghost = ?entity, "Pursuer entered play in scatter mode");
    }

    fn restart_wave_timer(&mut self, entity: Entity, scheduler: &mut TickScheduler, waves: &[Wave]) {
        if let Some(handle) = self.wave_timer.take() {
            scheduler.cancel(handle);
        }
        if self.wave_index < waves.len() {
            let duration = waves[self.wave_index].scatter_ms;
            self.wave_timer = Some(scheduler.schedule(duration as f64, TimerAction::GhostWave(entity)));
        }
    }

    /// Scatter↔chase toggle on wave-timer expiry. While frightened or dead,
    /// the flip lands on the snapshotted recover mode so the wave clock keeps
    /// honest time without clobbering the vulnerability window.
    pub fn on_wave_timer(
        &mut self,
        entity: Entity,
        scheduler: &mut TickScheduler,
        waves: &[Wave],
        mover: &mut Mover,
        velocity: &mut Velocity,
        sense: &TileSense,
    ) {
        self.wave_timer = None;
        let live = matches!(self.mode, GhostMode::Scatter | GhostMode::Chase);
        let slot = if live { self.mode } else { self.recover_mode };

        match slot {
            GhostMode::Scatter => {
                // Scatter -> chase; counts the transition against the table.
                self.wave_index += 1;
                if live {
                    self.mode = GhostMode::Chase;
                } else {
                    self.recover_mode = GhostMode::Chase;
                }
                if self.wave_index < waves.len() {
                    let duration = waves[self.wave_index - 1].chase_ms;
                    self.wave_timer = Some(scheduler.schedule(duration as f64, TimerAction::GhostWave(entity)));
                }
                trace!(ghost = ?entity, wave = self.wave_index, "Wave: chase");
            }
            GhostMode::Chase => {
                if live {
                    self.mode = GhostMode::Scatter;
                    self.target = self.scatter_target;
                } else {
                    self.recover_mode = GhostMode::Scatter;
                }
                if self.wave_index < waves.len() {
                    let duration = waves[self.wave_index].scatter_ms;
                    self.wave_timer = Some(scheduler.schedule(duration as f64, TimerAction::GhostWave(entity)));
                }
                trace!(ghost = ?entity, wave = self.wave_index, "Wave: scatter");
            }
            _ => {}
        }

        if live {
            force_reversal(mover, velocity, sense);
        }
    }

    /// Frightened entry on a power pickup. No-op while waiting at home or
    /// dead; a re-trigger while already frightened does not overwrite the
    /// snapshotted recover mode.
    pub fn enable_frightened(&mut self, mover: &mut Mover, velocity: &mut Velocity, sense: &TileSense) {
        if !self.in_play {
            return;
        }
        if self.mode != GhostMode::Frightened {
            self.recover_mode = self.mode;
        }
        self.mode = GhostMode::Frightened;
        mover.set_speed(mover.base_speed() * FRIGHTENED_SPEED_FACTOR);
        force_reversal(mover, velocity, sense);
    }

    /// Frightened exit on power expiry.
    pub fn disable_frightened(&mut self, mover: &mut Mover, velocity: &mut Velocity, sense: &TileSense) {
        if !self.in_play || self.mode != GhostMode::Frightened {
            return;
        }
        self.mode = self.recover_mode;
        if self.mode == GhostMode::Scatter {
            self.target = self.scatter_target;
        }
        mover.restore_speed();
        force_reversal(mover, velocity, sense);
    }

    /// Caught while vulnerable. Only a frightened pursuer can die; returns
    /// whether the transition happened.
    pub fn on_eaten(&mut self, mover: &mut Mover, velocity: &mut Velocity, sense: &TileSense) -> bool {
        if self.mode != GhostMode::Frightened {
            return false;
        }
        mover.die();
        self.mode = GhostMode::Dead;
        self.in_play = false;
        self.target = self.home_marker;
        mover.set_speed(mover.base_speed() * DEAD_SPEED_FACTOR);
        force_reversal(mover, velocity, sense);
        true
    }

    /// A dead pursuer that reached the home cell comes back to life in its
    /// recover mode and resumes moving left by convention.
    fn revive_at_home(&mut self, mover: &mut Mover, velocity: &mut Velocity) {
        self.mode = self.recover_mode;
        if self.mode == GhostMode::Scatter {
            self.target = self.scatter_target;
        }
        self.in_play = true;
        mover.restore_speed();
        mover.alive = true;
        mover.begin_move(velocity, Direction::Left);
        debug!("Dead pursuer revived at home");
    }

    /// Freezes the pursuer in place, syncing the decision marker so the next
    /// cell-edge check cannot re-issue movement.
    pub fn halt(&mut self, mover: &mut Mover, velocity: &mut Velocity, sense: &TileSense) {
        mover.stop(velocity);
        self.prev_marker = sense.marker;
    }

    /// Full reset after the player loses a life: back to the spawn point,
    /// scatter mode, waiting for the next release.
    pub fn reset_for_respawn(
        &mut self,
        scheduler: &mut TickScheduler,
        mover: &mut Mover,
        position: &mut Position,
        velocity: &mut Velocity,
    ) {
        if let Some(handle) = self.wave_timer.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.release_timer.take() {
            scheduler.cancel(handle);
        }
        mover.respawn(position, velocity);
        mover.restore_speed();
        self.mode = GhostMode::Scatter;
        self.recover_mode = GhostMode::Scatter;
        self.target = self.scatter_target;
        self.in_play = false;
        self.prev_marker = IVec2::splat(-1);
    }
}

/// Mode switches flip the pursuer around; a reversal request always commits
/// immediately since the lane behind is the one it came from.
fn force_reversal(mover: &mut Mover, velocity: &mut Velocity, sense: &TileSense) {
    if let Some(current) = mover.current {
        mover.request_turn(velocity, sense, current.opposite());
    }
}

/// Picks the open direction whose neighbor cell is nearest the target.
/// Ties go to the first candidate in the fixed Left/Right/Up/Down order.
fn steer_toward(options: &[Direction], marker: IVec2, target: IVec2) -> Direction {
    let mut best = options[0];
    let mut best_distance = f32::MAX;
    for &option in options {
        let neighbor = (marker + option.offset()).as_vec2();
        let distance = neighbor.distance_squared(target.as_vec2());
        if distance < best_distance {
            best = option;
            best_distance = distance;
        }
    }
    best
}

/// Per-tick pursuer update: edge-triggered direction decisions on cell
/// crossings, the dead-at-home revival check, stall recovery, and turn
/// commits.
pub fn ghost_update_system(
    run_state: Res<RunState>,
    mut ghosts: Query<(
        &GhostPersona,
        &mut GhostBrain,
        &mut Mover,
        &mut Position,
        &mut Velocity,
        &TileSense,
    )>,
) {
    if !run_state.active {
        return;
    }

    for (persona, mut brain, mut mover, mut position, mut velocity, sense) in ghosts.iter_mut() {
        // Held at home awaiting release: no movement, no targeting.
        if !brain.in_play && brain.mode != GhostMode::Dead {
            continue;
        }

        // Decide only when crossing into a new cell; re-deciding mid-cell
        // would jitter.
        if sense.marker != brain.prev_marker {
            let behind = mover.current.map(Direction::opposite);
            let options: SmallVec<[Direction; 3]> = DIRECTIONS
                .into_iter()
                .filter(|&d| sense.is_open(d) && Some(d) != behind)
                .collect();

            match options.len() {
                0 => {
                    // True dead end; reversing is the only way out.
                    warn!(ghost = %persona, cell = ?sense.marker, "Pursuer in dead end, reversing");
                    if let Some(back) = behind {
                        mover.request_turn(&mut velocity, sense, back);
                    }
                }
                1 => mover.begin_move(&mut velocity, options[0]),
                _ => {
                    let choice = if brain.mode == GhostMode::Frightened {
                        *options.choose(&mut rand::rng()).unwrap()
                    } else {
                        steer_toward(&options, sense.marker, brain.target)
                    };
                    trace!(ghost = %persona, cell = ?sense.marker, ?choice, "Intersection decision");
                    mover.request_turn(&mut velocity, sense, choice);
                }
            }

            brain.prev_marker = sense.marker;
        }

        if brain.mode == GhostMode::Dead && sense.marker == brain.home_marker {
            brain.revive_at_home(&mut mover, &mut velocity);
        }

        // A wall clamp may have zeroed the velocity; keep pursuers rolling.
        if velocity.0 == Vec2::ZERO {
            if let Some(current) = mover.current {
                mover.begin_move(&mut velocity, current);
            }
        }

        mover.try_commit_turn(&mut position, &mut velocity);
    }
}

/// Feeds each chasing/frightened pursuer the player's current cell as its
/// target. Pursuers never reach into the player entity directly.
pub fn target_feed_system(
    run_state: Res<RunState>,
    players: Query<&TileSense, bevy_ecs::query::With<Player>>,
    mut ghosts: Query<&mut GhostBrain>,
) {
    if !run_state.active {
        return;
    }
    let Ok(player_sense) = players.single() else {
        return;
    };
    for mut brain in ghosts.iter_mut() {
        if brain.in_play && matches!(brain.mode, GhostMode::Chase | GhostMode::Frightened) {
            brain.target = player_sense.marker;
        }
    }
}

/// Schedules the staggered home releases each time the player starts moving.
pub fn release_system(
    mut started: EventReader<RunStarted>,
    difficulty: Res<Difficulty>,
    mut scheduler: ResMut<TickScheduler>,
    mut ghosts: Query<(Entity, &GhostPersona, &mut GhostBrain, &mut Mover, &mut Velocity)>,
) {
    for _ in started.read() {
        for (entity, persona, mut brain, mut mover, mut velocity) in ghosts.iter_mut() {
            match persona.release_delay_ms() {
                None => brain.on_start(entity, &mut scheduler, difficulty.waves, &mut mover, &mut velocity),
                Some(delay) => {
                    if let Some(handle) = brain.release_timer.take() {
                        scheduler.cancel(handle);
                    }
                    let due = (delay + RELEASE_FADE_MS) as f64;
                    brain.release_timer = Some(scheduler.schedule(due, TimerAction::GhostRelocate(entity)));
                    trace!(ghost = %persona, delay, "Release scheduled");
                }
            }
        }
    }
}

/// Handles pursuer timer firings: wave toggles and the two-step
/// fade/relocate/fade release sequence.
pub fn ghost_timer_system(
    mut fired: EventReader<TimerFired>,
    difficulty: Res<Difficulty>,
    mut scheduler: ResMut<TickScheduler>,
    mut audio: EventWriter<AudioEvent>,
    mut ghosts: Query<(
        &mut GhostBrain,
        &mut Mover,
        &mut Position,
        &mut Velocity,
        &TileSense,
    )>,
) {
    for event in fired.read() {
        match event.0 {
            TimerAction::GhostWave(entity) => {
                if let Ok((mut brain, mut mover, _, mut velocity, sense)) = ghosts.get_mut(entity) {
                    brain.on_wave_timer(entity, &mut scheduler, difficulty.waves, &mut mover, &mut velocity, sense);
                }
            }
            TimerAction::GhostRelocate(entity) => {
                if let Ok((mut brain, mut mover, mut position, mut velocity, _)) = ghosts.get_mut(entity) {
                    position.0 = brain.home;
                    mover.stop(&mut velocity);
                    brain.release_timer =
                        Some(scheduler.schedule(RELEASE_FADE_MS as f64, TimerAction::GhostReleased(entity)));
                }
            }
            TimerAction::GhostReleased(entity) => {
                if let Ok((mut brain, mut mover, _, mut velocity, _)) = ghosts.get_mut(entity) {
                    brain.release_timer = None;
                    brain.on_start(entity, &mut scheduler, difficulty.waves, &mut mover, &mut velocity);
                    audio.write(AudioEvent::Regenerate);
                }
            }
            _ => {}
        }
    }
}
