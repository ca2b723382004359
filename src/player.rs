//! Player control: input handling, the power buff, and the death/respawn
//! sequence.

use bevy_ecs::component::Component;
use bevy_ecs::event::{EventReader, EventWriter};
use bevy_ecs::query::Without;
use bevy_ecs::system::{Query, Res};
use tracing::{debug, trace};

use crate::events::{GameCommand, GameEvent, RunStarted};
use crate::ghost::GhostBrain;
use crate::grid::TileSense;
use crate::movement::{Mover, Position, Velocity};
use crate::scheduler::{TickScheduler, TimerAction, TimerFired, TimerHandle};
use crate::session::RunState;

/// Marker plus the player-only lifecycle state.
#[derive(Component, Debug, Default)]
pub struct Player {
    /// Whether this life's first move has been made. The pursuer release
    /// clock starts from that moment, not from the respawn.
    pub started: bool,
    pub powered: bool,
    power_timer: Option<TimerHandle>,
    death_timer: Option<TimerHandle>,
}

impl Player {
    /// Starts or extends the power buff. A pickup while already powered adds
    /// the full duration on top of whatever is left rather than restarting
    /// the clock.
    pub fn enable_power(&mut self, scheduler: &mut TickScheduler, duration_ms: u64) {
        let mut total = duration_ms as f64;
        if let Some(handle) = self.power_timer.take() {
            if let Some(remaining) = scheduler.remaining_ms(handle) {
                total += remaining;
            }
            scheduler.cancel(handle);
        }
        self.powered = true;
        self.power_timer = Some(scheduler.schedule(total, TimerAction::PowerExpiry));
        debug!(window_ms = total, "Power mode window set");
    }

    pub fn clear_power(&mut self, scheduler: &mut TickScheduler) {
        if let Some(handle) = self.power_timer.take() {
            scheduler.cancel(handle);
        }
        self.powered = false;
    }

    pub fn power_remaining_ms(&self, scheduler: &TickScheduler) -> Option<f64> {
        self.power_timer.and_then(|handle| scheduler.remaining_ms(handle))
    }

    /// Kicks off the death sequence: freeze in place, drop the power buff,
    /// and come back after the death animation has played out.
    pub fn begin_death(
        &mut self,
        scheduler: &mut TickScheduler,
        mover: &mut Mover,
        velocity: &mut Velocity,
        respawn_delay_ms: u64,
    ) {
        mover.die();
        mover.stop(velocity);
        self.started = false;
        self.clear_power(scheduler);
        self.death_timer = Some(scheduler.schedule(respawn_delay_ms as f64, TimerAction::PlayerRespawn));
    }
}

/// Applies host move commands. The first committed input of a life flips
/// `started` and announces the run start.
pub fn player_control_system(
    run_state: Res<RunState>,
    mut events: EventReader<GameEvent>,
    mut started: EventWriter<RunStarted>,
    mut players: Query<(&mut Player, &mut Mover, &mut Velocity, &TileSense)>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = *event;
        let GameCommand::MovePlayer(direction) = command else {
            continue;
        };

        if !run_state.active {
            continue;
        }
        let Ok((mut player, mut mover, mut velocity, sense)) = players.single_mut() else {
            continue;
        };
        if !mover.alive || mover.current == Some(direction) {
            continue;
        }

        if mover.current.is_none() {
            // Standing still: only a move into an open lane does anything.
            if sense.is_open(direction) {
                mover.begin_move(&mut velocity, direction);
            } else {
                continue;
            }
        } else {
            mover.request_turn(&mut velocity, sense, direction);
        }

        if !player.started {
            player.started = true;
            started.write(RunStarted);
            trace!(%direction, "First move of the life");
        }
    }
}

/// Commits any pending player turn once the tile center is close enough.
pub fn player_update_system(
    run_state: Res<RunState>,
    mut players: Query<(&mut Mover, &mut Position, &mut Velocity), bevy_ecs::query::With<Player>>,
) {
    if !run_state.active {
        return;
    }
    let Ok((mut mover, mut position, mut velocity)) = players.single_mut() else {
        return;
    };
    if !mover.alive {
        return;
    }
    mover.try_commit_turn(&mut position, &mut velocity);
}

/// Handles the player-owned timers: power expiry (which also snaps every
/// frightened pursuer back) and the post-death respawn. The pursuers were
/// already sent home at the moment of the catch.
pub fn player_timer_system(
    mut fired: EventReader<TimerFired>,
    mut players: Query<(&mut Player, &mut Mover, &mut Position, &mut Velocity), Without<GhostBrain>>,
    mut ghosts: Query<(&mut GhostBrain, &mut Mover, &mut Velocity, &TileSense), Without<Player>>,
) {
    for event in fired.read() {
        match event.0 {
            TimerAction::PowerExpiry => {
                let Ok((mut player, ..)) = players.single_mut() else {
                    continue;
                };
                player.powered = false;
                player.power_timer = None;
                for (mut brain, mut mover, mut velocity, sense) in ghosts.iter_mut() {
                    brain.disable_frightened(&mut mover, &mut velocity, sense);
                }
                debug!("Power mode expired");
            }
            TimerAction::PlayerRespawn => {
                let Ok((mut player, mut mover, mut position, mut velocity)) = players.single_mut() else {
                    continue;
                };
                player.death_timer = None;
                mover.respawn(&mut position, &mut velocity);
                debug!("Player respawned");
            }
            _ => {}
        }
    }
}
