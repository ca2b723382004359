//! Session state and the per-level difficulty table.

use bevy_ecs::resource::Resource;

/// Seconds of simulated time covered by the current tick.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime(pub f32);

/// The last level; clearing it ends the game rather than advancing.
pub const FINAL_LEVEL: u32 = 3;

/// Terminal-per-level outcome, surfaced alongside `active = false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    LevelComplete,
    GameComplete,
    GameOver,
}

/// Mutable per-run session state. `active` gates the whole per-tick
/// simulation; once it drops the world freezes until the host restarts.
#[derive(Resource, Debug)]
pub struct RunState {
    pub score: u32,
    pub lives: u8,
    pub level: u32,
    /// Current score multiplier; temporarily raised by bonuses and reset to
    /// the level's base multiplier when the bonus window closes.
    pub multiplier: u32,
    pub active: bool,
    /// Host-toggled pause; the facade skips the whole tick while set.
    pub paused: bool,
    pub outcome: Option<RunOutcome>,
}

impl RunState {
    pub fn new(params: RestartParams, base_multiplier: u32) -> Self {
        Self {
            score: params.score,
            lives: params.lives,
            level: params.level,
            multiplier: base_multiplier,
            active: true,
            paused: false,
            outcome: None,
        }
    }
}

/// Parameters carried across a level restart, mirroring what a scene restart
/// would pass along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartParams {
    pub level: u32,
    pub lives: u8,
    pub score: u32,
}

impl Default for RestartParams {
    fn default() -> Self {
        Self {
            level: 1,
            lives: 3,
            score: 0,
        }
    }
}

/// One scatter-then-chase duration pair from the difficulty table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wave {
    pub scatter_ms: u64,
    pub chase_ms: u64,
}

/// Per-level tuning. Pursuer wave timing gets tighter and speeds rise with
/// the level; the base multiplier rewards surviving deeper runs.
#[derive(Resource, Debug, Clone)]
pub struct Difficulty {
    pub player_speed: f32,
    pub ghost_speed: f32,
    pub power_mode_ms: u64,
    pub multiplier: u32,
    pub waves: &'static [Wave],
}

const WAVES_EARLY: [Wave; 4] = [
    Wave { scatter_ms: 7000, chase_ms: 20_000 },
    Wave { scatter_ms: 7000, chase_ms: 20_000 },
    Wave { scatter_ms: 5000, chase_ms: 20_000 },
    Wave { scatter_ms: 5000, chase_ms: 20_000 },
];

const WAVES_LATE: [Wave; 4] = [
    Wave { scatter_ms: 5000, chase_ms: 20_000 },
    Wave { scatter_ms: 5000, chase_ms: 20_000 },
    Wave { scatter_ms: 4000, chase_ms: 20_000 },
    Wave { scatter_ms: 4000, chase_ms: 20_000 },
];

impl Difficulty {
    /// Tuning for a 1-based level number; levels past the table reuse the
    /// hardest row.
    pub fn for_level(level: u32) -> Difficulty {
        match level {
            0 | 1 => Difficulty {
                player_speed: 160.0,
                ghost_speed: 150.0,
                power_mode_ms: 7000,
                multiplier: 1,
                waves: &WAVES_EARLY,
            },
            2 => Difficulty {
                player_speed: 170.0,
                ghost_speed: 165.0,
                power_mode_ms: 6000,
                multiplier: 2,
                waves: &WAVES_EARLY,
            },
            _ => Difficulty {
                player_speed: 180.0,
                ghost_speed: 178.0,
                power_mode_ms: 5000,
                multiplier: 3,
                waves: &WAVES_LATE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_has_unit_multiplier() {
        assert_eq!(Difficulty::for_level(1).multiplier, 1);
    }

    #[test]
    fn test_difficulty_clamps_past_table() {
        let deep = Difficulty::for_level(17);
        assert_eq!(deep.power_mode_ms, Difficulty::for_level(3).power_mode_ms);
    }

    #[test]
    fn test_power_window_shrinks_with_level() {
        let times: Vec<u64> = (1..=3).map(|l| Difficulty::for_level(l).power_mode_ms).collect();
        assert!(times.windows(2).all(|w| w[0] > w[1]));
    }
}
