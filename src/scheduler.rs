//! Deterministic one-shot timers driven by simulated time.
//!
//! Every delayed action in the game (wave cycling, power-mode expiry, bonus
//! windows, pursuer releases, the death sequence) runs through this queue so
//! tests can advance time tick by tick instead of sleeping. Handles are
//! cancellable until they fire; reschedule paths cancel the prior handle
//! first so a purpose never has two live timers.

use bevy_ecs::entity::Entity;
use bevy_ecs::event::{Event, EventWriter};
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Res, ResMut};
use tracing::trace;

use crate::session::{DeltaTime, RunState};

/// Cancellation token for a scheduled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// What to do when a timer fires. Closures don't travel well through an ECS
/// schedule, so each delayed callback is a named action dispatched by the
/// system that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Toggle a pursuer between scatter and chase.
    GhostWave(Entity),
    /// Fade-out finished: relocate the pursuer to the home point.
    GhostRelocate(Entity),
    /// Fade-in finished: run the scatter entry transition.
    GhostReleased(Entity),
    /// The player's power buff ran out.
    PowerExpiry,
    /// The bonus score-multiplier window closed.
    BonusExpiry,
    /// The death animation finished; respawn the player.
    PlayerRespawn,
}

/// Emitted once per due timer, in firing order.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired(pub TimerAction);

#[derive(Debug)]
struct Pending {
    handle: TimerHandle,
    due_ms: f64,
    action: TimerAction,
}

/// The timer queue. Time only moves when [`TickScheduler::advance`] is called,
/// which the schedule does once per tick while the run is active.
#[derive(Resource, Debug, Default)]
pub struct TickScheduler {
    now_ms: f64,
    next_id: u64,
    pending: Vec<Pending>,
}

impl TickScheduler {
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Schedules `action` to fire once after `delay_ms` of simulated time.
    pub fn schedule(&mut self, delay_ms: f64, action: TimerAction) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due_ms: self.now_ms + delay_ms.max(0.0),
            action,
        });
        trace!(?handle, ?action, delay_ms, "Timer scheduled");
        handle
    }

    /// Cancels a pending timer. Returns whether it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        before != self.pending.len()
    }

    /// Milliseconds until `handle` fires, if it is still pending.
    pub fn remaining_ms(&self, handle: TimerHandle) -> Option<f64> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| (p.due_ms - self.now_ms).max(0.0))
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Advances simulated time and drains every timer that came due, ordered
    /// by due time (insertion order breaks ties).
    pub fn advance(&mut self, dt_ms: f64) -> Vec<TimerAction> {
        self.now_ms += dt_ms;

        let mut due: Vec<Pending> = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due_ms <= self.now_ms {
                due.push(self.pending.swap_remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.handle.0.cmp(&b.handle.0)));

        due.into_iter()
            .inspect(|p| trace!(handle = ?p.handle, action = ?p.action, "Timer fired"))
            .map(|p| p.action)
            .collect()
    }
}

/// Advances the queue by the frame's delta and publishes fired actions.
/// Timers freeze with the rest of the simulation when the run is inactive.
pub fn scheduler_system(
    run_state: Res<RunState>,
    delta_time: Res<DeltaTime>,
    mut scheduler: ResMut<TickScheduler>,
    mut fired: EventWriter<TimerFired>,
) {
    if !run_state.active {
        return;
    }
    for action in scheduler.advance(delta_time.0 as f64 * 1000.0) {
        fired.write(TimerFired(action));
    }
}
