//! Events crossing the host/core boundary, plus internal lifecycle events.

use bevy_ecs::event::Event;

use crate::direction::Direction;

/// Host-issued commands, fed in before each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    MovePlayer(Direction),
    /// Toggles the pause state; simulated time freezes entirely while paused.
    Pause,
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Command(GameCommand),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// Values pushed out to the score/life/notification sink. Rendering them is
/// entirely the host's concern.
#[derive(Event, Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    ScoreChanged(u32),
    LivesChanged(u8),
    Notification(String),
}

/// Sound triggers for the host's audio playback.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEvent {
    Munch,
    Fruit,
    Intermission,
    Regenerate,
    GhostEaten,
    PlayerDeath,
    Win,
    GameOver,
}

/// Fired once each time the player starts moving after a (re)spawn; the level
/// driver reacts by scheduling the pursuer release timers.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStarted;
