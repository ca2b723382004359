use glam::{IVec2, Vec2};
use muncher::constants::{DEAD_SPEED_FACTOR, FRIGHTENED_SPEED_FACTOR};
use muncher::direction::Direction;
use pretty_assertions::assert_eq;
use muncher::ghost::{GhostBrain, GhostMode, GhostPersona};
use muncher::grid::{cell_center, cell_of, TileSense};
use muncher::level::Level;
use muncher::movement::{Mover, Velocity};

mod common;
use common::{ghost_entity, new_game, place, player_entity, position_of, start_run, tick_seconds, TICK};

const GHOST_SPEED: f32 = 150.0;

fn ghost_parts() -> (Level, GhostBrain, Mover, Velocity, TileSense) {
    let level = Level::bundled().expect("bundled level parses");
    let brain = GhostBrain::new(GhostPersona::Blinky, &level);
    let spawn = level.pursuer_spawns[0];
    let mover = Mover::new(spawn, GHOST_SPEED);
    let mut sense = TileSense::new();
    sense.refresh(spawn, &level);
    (level, brain, mover, Velocity::default(), sense)
}

#[test]
fn test_frightened_snapshots_and_restores_the_live_mode() {
    let (_level, mut brain, mut mover, mut velocity, sense) = ghost_parts();
    brain.in_play = true;
    brain.mode = GhostMode::Chase;
    mover.begin_move(&mut velocity, Direction::Left);

    brain.enable_frightened(&mut mover, &mut velocity, &sense);
    assert_eq!(brain.mode, GhostMode::Frightened);
    assert_eq!(brain.recover_mode(), GhostMode::Chase);
    assert_eq!(mover.speed(), GHOST_SPEED * FRIGHTENED_SPEED_FACTOR);

    // A second pill must not overwrite the snapshot with Frightened.
    brain.enable_frightened(&mut mover, &mut velocity, &sense);
    assert_eq!(brain.recover_mode(), GhostMode::Chase);

    brain.disable_frightened(&mut mover, &mut velocity, &sense);
    assert_eq!(brain.mode, GhostMode::Chase);
    assert_eq!(mover.speed(), GHOST_SPEED);
}

#[test]
fn test_frightened_flips_the_travel_direction() {
    let (_level, mut brain, mut mover, mut velocity, sense) = ghost_parts();
    brain.in_play = true;
    mover.begin_move(&mut velocity, Direction::Left);
    assert!(velocity.0.x < 0.0);

    brain.enable_frightened(&mut mover, &mut velocity, &sense);
    assert_eq!(mover.current, Some(Direction::Right));
    assert!(velocity.0.x > 0.0);
}

#[test]
fn test_only_frightened_ghosts_can_be_eaten() {
    let (_level, mut brain, mut mover, mut velocity, sense) = ghost_parts();
    brain.in_play = true;
    mover.begin_move(&mut velocity, Direction::Left);

    assert!(!brain.on_eaten(&mut mover, &mut velocity, &sense));
    assert_eq!(brain.mode, GhostMode::Scatter);

    brain.enable_frightened(&mut mover, &mut velocity, &sense);
    assert!(brain.on_eaten(&mut mover, &mut velocity, &sense));
    assert_eq!(brain.mode, GhostMode::Dead);
    assert!(!brain.in_play);
    assert_eq!(mover.speed(), GHOST_SPEED * DEAD_SPEED_FACTOR);
    assert_eq!(brain.target, cell_of(brain.home));
}

#[test]
fn test_ghosts_hold_at_home_before_the_run_starts() {
    let mut game = new_game();
    let blinky = ghost_entity(&mut game, GhostPersona::Blinky);
    let start = common::position_of(&mut game, blinky);

    tick_seconds(&mut game, 2.0);

    assert_eq!(common::position_of(&mut game, blinky), start);
}

#[test]
fn test_blinky_releases_on_the_first_move() {
    let mut game = new_game();
    let blinky = ghost_entity(&mut game, GhostPersona::Blinky);

    start_run(&mut game, Direction::Left);
    tick_seconds(&mut game, 0.5);

    let brain = game.world().get::<GhostBrain>(blinky).expect("blinky has a brain");
    assert!(brain.in_play);
}

#[test]
fn test_releases_are_staggered() {
    let mut game = new_game();
    let pinky = ghost_entity(&mut game, GhostPersona::Pinky);
    let inky = ghost_entity(&mut game, GhostPersona::Inky);
    let clyde = ghost_entity(&mut game, GhostPersona::Clyde);

    start_run(&mut game, Direction::Left);

    // 8000ms delay plus two 300ms fades puts Pinky in play by 9s.
    tick_seconds(&mut game, 9.0);
    assert!(game.world().get::<GhostBrain>(pinky).unwrap().in_play);
    assert!(!game.world().get::<GhostBrain>(inky).unwrap().in_play);
    assert!(!game.world().get::<GhostBrain>(clyde).unwrap().in_play);

    tick_seconds(&mut game, 4.5);
    assert!(game.world().get::<GhostBrain>(inky).unwrap().in_play);
    assert!(game.world().get::<GhostBrain>(clyde).unwrap().in_play);
}

#[test]
fn test_wave_timer_flips_scatter_to_chase() {
    // Level 1 opens with a 7000ms scatter window.
    let mut game = new_game();
    let blinky = ghost_entity(&mut game, GhostPersona::Blinky);

    start_run(&mut game, Direction::Left);
    tick_seconds(&mut game, 6.5);
    assert_eq!(game.world().get::<GhostBrain>(blinky).unwrap().mode, GhostMode::Scatter);

    tick_seconds(&mut game, 1.0);
    assert_eq!(game.world().get::<GhostBrain>(blinky).unwrap().mode, GhostMode::Chase);
}

#[test]
fn test_single_exit_corridor_overrides_the_target() {
    let mut game = new_game();
    let blinky = ghost_entity(&mut game, GhostPersona::Blinky);
    let corner = cell_center(IVec2::new(26, 1));

    // Headed right into the top-right corner with the target behind it. The
    // lane back is excluded, so the lone remaining exit (Down) must be taken
    // even though it increases the distance to the target.
    {
        let world = game.world_mut();
        world.get_mut::<GhostBrain>(blinky).unwrap().in_play = true;
        world.get_mut::<GhostBrain>(blinky).unwrap().target = IVec2::new(1, 1);
        let speed = {
            let mut mover = world.get_mut::<Mover>(blinky).unwrap();
            mover.current = Some(Direction::Right);
            mover.speed()
        };
        world.get_mut::<Velocity>(blinky).unwrap().0 = Vec2::new(speed, 0.0);
    }
    place(&mut game, blinky, corner);

    tick_seconds(&mut game, 0.3);

    let after = position_of(&mut game, blinky);
    assert_eq!(after.x, corner.x);
    assert!(after.y > corner.y, "took the only open corridor downward");
}

#[test]
fn test_dead_pursuer_revives_at_its_home_cell() {
    let mut game = new_game();
    let level = Level::bundled().expect("bundled level parses");
    let player = player_entity(&mut game);
    let blinky = ghost_entity(&mut game, GhostPersona::Blinky);

    start_run(&mut game, Direction::Left);
    tick_seconds(&mut game, 0.5);
    place(&mut game, player, level.pills[0]);
    game.tick(TICK);
    let player_pos = position_of(&mut game, player);
    place(&mut game, blinky, player_pos);
    game.tick(TICK);
    assert_eq!(game.world().get::<GhostBrain>(blinky).unwrap().mode, GhostMode::Dead);

    // Skip the trek back; reaching the home cell revives it on the next tick.
    let home = game.world().get::<GhostBrain>(blinky).unwrap().home;
    place(&mut game, blinky, home);
    game.tick(TICK);

    let brain = game.world().get::<GhostBrain>(blinky).expect("blinky has a brain");
    assert_eq!(brain.mode, GhostMode::Scatter);
    assert!(brain.in_play);
    let mover = game.world().get::<Mover>(blinky).expect("blinky has a mover");
    assert!(mover.alive);
    assert_eq!(mover.speed(), mover.base_speed());
}

#[test]
fn test_wave_flip_while_frightened_lands_on_the_recover_slot() {
    let mut world = bevy_ecs::world::World::new();
    let entity = world.spawn_empty().id();
    let mut scheduler = muncher::scheduler::TickScheduler::default();
    let waves = muncher::session::Difficulty::for_level(1).waves;

    let (_level, mut brain, mut mover, mut velocity, sense) = ghost_parts();
    brain.in_play = true;
    mover.begin_move(&mut velocity, Direction::Left);
    brain.enable_frightened(&mut mover, &mut velocity, &sense);
    assert_eq!(brain.recover_mode(), GhostMode::Scatter);

    brain.on_wave_timer(entity, &mut scheduler, waves, &mut mover, &mut velocity, &sense);

    assert_eq!(brain.mode, GhostMode::Frightened);
    assert_eq!(brain.recover_mode(), GhostMode::Chase);

    brain.disable_frightened(&mut mover, &mut velocity, &sense);
    assert_eq!(brain.mode, GhostMode::Chase);
}
