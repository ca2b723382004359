//! The embeddable game facade: owns the ECS world and schedule, takes
//! commands in, ticks simulated time forward, and hands UI/audio events out.

use bevy_ecs::event::Events;
use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule};
use bevy_ecs::world::World;
use glam::Vec2;
use strum::IntoEnumIterator;
use tracing::info;

use crate::encounter::{self, Collectible, CollectibleLedger};
use crate::error::{GameError, GameResult};
use crate::events::{AudioEvent, GameCommand, GameEvent, RunStarted, UiEvent};
use crate::ghost::{self, GhostBrain, GhostMode, GhostPersona};
use crate::grid::TileSense;
use crate::level::Level;
use crate::movement::{self, Mover, Position, Velocity};
use crate::player::{self, Player};
use crate::scheduler::{self, TickScheduler, TimerFired};
use crate::session::{DeltaTime, Difficulty, RestartParams, RunOutcome, RunState};

/// A complete, self-contained run of the game. The host feeds commands and
/// wall-clock deltas in and renders from the state and events it reads back;
/// nothing in here touches a display, a clock, or an input device.
pub struct Game {
    world: World,
    schedule: Schedule,
}

impl Game {
    /// Builds a fresh world for the level named in `params`.
    pub fn new(params: RestartParams) -> GameResult<Game> {
        if params.lives == 0 {
            return Err(GameError::InvalidState("cannot start a run with zero lives".into()));
        }
        let level = Level::bundled()?;
        let difficulty = Difficulty::for_level(params.level);

        let mut world = World::new();
        world.insert_resource(Events::<GameEvent>::default());
        world.insert_resource(Events::<UiEvent>::default());
        world.insert_resource(Events::<AudioEvent>::default());
        world.insert_resource(Events::<RunStarted>::default());
        world.insert_resource(Events::<TimerFired>::default());
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(TickScheduler::default());
        world.insert_resource(CollectibleLedger::new(level.collectible_count() as u32));
        world.insert_resource(RunState::new(params, difficulty.multiplier));

        spawn_player(&mut world, &level, &difficulty);
        spawn_ghosts(&mut world, &level, &difficulty);
        spawn_collectibles(&mut world, &level);

        world.insert_resource(difficulty);
        world.insert_resource(level);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                movement::sense_system,
                player::player_control_system,
                ghost::release_system,
                scheduler::scheduler_system,
                ghost::ghost_timer_system,
                player::player_timer_system,
                encounter::bonus_expiry_system,
                ghost::target_feed_system,
                ghost::ghost_update_system,
                player::player_update_system,
                movement::integration_system,
                movement::portal_system,
                encounter::collect_system,
                encounter::ghost_meeting_system,
            )
                .chain(),
        );

        info!(level = params.level, lives = params.lives, "Game world built");
        Ok(Game { world, schedule })
    }

    /// Queues a host command for the next tick. Pause toggles take effect
    /// immediately rather than travelling through the event queue, so an
    /// unpause can be processed while the simulation is frozen.
    pub fn send_command(&mut self, command: GameCommand) {
        if command == GameCommand::Pause {
            let mut run = self.world.resource_mut::<RunState>();
            run.paused = !run.paused;
            info!(paused = run.paused, "Pause toggled");
            return;
        }
        self.world
            .resource_mut::<Events<GameEvent>>()
            .send(command.into());
    }

    /// Advances the simulation by `dt` seconds of game time. A no-op while
    /// paused; queued commands survive until the next unpaused tick.
    pub fn tick(&mut self, dt: f32) {
        if self.world.resource::<RunState>().paused {
            return;
        }
        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<UiEvent>>().update();
        self.world.resource_mut::<Events<AudioEvent>>().update();
        self.world.resource_mut::<Events<RunStarted>>().update();
        self.world.resource_mut::<Events<TimerFired>>().update();

        self.world.insert_resource(DeltaTime(dt));
        self.schedule.run(&mut self.world);
    }

    /// Tears the world down and rebuilds it, carrying `params` across. Used
    /// for both level advancement and post-game-over restarts.
    pub fn restart(&mut self, params: RestartParams) -> GameResult<()> {
        *self = Game::new(params)?;
        Ok(())
    }

    /// Restart parameters for whatever comes after the current outcome: the
    /// next level on a clear, a fresh run otherwise. `None` while the run is
    /// still live.
    pub fn next_params(&self) -> Option<RestartParams> {
        let run = self.world.resource::<RunState>();
        match run.outcome? {
            RunOutcome::LevelComplete => Some(RestartParams {
                level: run.level + 1,
                lives: run.lives,
                score: run.score,
            }),
            RunOutcome::GameComplete | RunOutcome::GameOver => Some(RestartParams::default()),
        }
    }

    pub fn score(&self) -> u32 {
        self.world.resource::<RunState>().score
    }

    pub fn lives(&self) -> u8 {
        self.world.resource::<RunState>().lives
    }

    pub fn level(&self) -> u32 {
        self.world.resource::<RunState>().level
    }

    pub fn is_active(&self) -> bool {
        self.world.resource::<RunState>().active
    }

    pub fn is_paused(&self) -> bool {
        self.world.resource::<RunState>().paused
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.world.resource::<RunState>().outcome
    }

    pub fn player_position(&mut self) -> Option<Vec2> {
        let mut query = self.world.query_filtered::<&Position, With<Player>>();
        query.single(&self.world).ok().map(|position| position.0)
    }

    pub fn ghost_modes(&mut self) -> Vec<(GhostPersona, GhostMode)> {
        let mut query = self.world.query::<(&GhostPersona, &GhostBrain)>();
        query
            .iter(&self.world)
            .map(|(persona, brain)| (*persona, brain.mode))
            .collect()
    }

    pub fn remaining_collectibles(&self) -> u32 {
        self.world.resource::<CollectibleLedger>().remaining
    }

    /// Pops everything queued for the host's HUD since the last drain.
    pub fn drain_ui_events(&mut self) -> Vec<UiEvent> {
        self.world.resource_mut::<Events<UiEvent>>().drain().collect()
    }

    /// Pops everything queued for the host's audio sink since the last drain.
    pub fn drain_audio_events(&mut self) -> Vec<AudioEvent> {
        self.world.resource_mut::<Events<AudioEvent>>().drain().collect()
    }

    /// Direct world access for tests and bespoke host integrations.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

fn spawn_player(world: &mut World, level: &Level, difficulty: &Difficulty) {
    world.spawn((
        Player::default(),
        Position(level.player_spawn),
        Velocity::default(),
        Mover::new(level.player_spawn, difficulty.player_speed),
        TileSense::new(),
    ));
}

fn spawn_ghosts(world: &mut World, level: &Level, difficulty: &Difficulty) {
    for persona in GhostPersona::iter() {
        let spawn = level.pursuer_spawns[persona.index()];
        world.spawn((
            persona,
            GhostBrain::new(persona, level),
            Position(spawn),
            Velocity::default(),
            Mover::new(spawn, difficulty.ghost_speed),
            TileSense::new(),
        ));
    }
}

fn spawn_collectibles(world: &mut World, level: &Level) {
    for &spot in &level.pellets {
        world.spawn((Position(spot), Collectible::Pellet));
    }
    for &spot in &level.pills {
        world.spawn((Position(spot), Collectible::Pill));
    }
}
