#![allow(dead_code)]

use bevy_ecs::entity::Entity;
use bevy_ecs::query::With;
use glam::Vec2;
use muncher::direction::Direction;
use muncher::events::GameCommand;
use muncher::game::Game;
use muncher::ghost::GhostPersona;
use muncher::movement::Position;
use muncher::player::Player;
use muncher::session::RestartParams;

pub const TICK: f32 = 1.0 / 60.0;

pub fn new_game() -> Game {
    Game::new(RestartParams::default()).expect("bundled level should parse")
}

/// Runs the simulation for roughly `seconds` of game time in 60Hz steps.
pub fn tick_seconds(game: &mut Game, seconds: f32) {
    let steps = (seconds / TICK).round() as usize;
    for _ in 0..steps {
        game.tick(TICK);
    }
}

/// Issues a move and ticks once so the run is started.
pub fn start_run(game: &mut Game, direction: Direction) {
    game.send_command(GameCommand::MovePlayer(direction));
    game.tick(TICK);
}

pub fn player_entity(game: &mut Game) -> Entity {
    let world = game.world_mut();
    let mut query = world.query_filtered::<Entity, With<Player>>();
    query.single(world).expect("exactly one player")
}

pub fn ghost_entity(game: &mut Game, persona: GhostPersona) -> Entity {
    let world = game.world_mut();
    let mut query = world.query::<(Entity, &GhostPersona)>();
    query
        .iter(world)
        .find(|(_, p)| **p == persona)
        .map(|(entity, _)| entity)
        .expect("ghost roster is fixed")
}

pub fn position_of(game: &mut Game, entity: Entity) -> Vec2 {
    game.world().get::<Position>(entity).expect("entity has a position").0
}

pub fn place(game: &mut Game, entity: Entity, spot: Vec2) {
    game.world_mut()
        .get_mut::<Position>(entity)
        .expect("entity has a position")
        .0 = spot;
}
