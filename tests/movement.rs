use glam::Vec2;
use muncher::direction::Direction;
use pretty_assertions::assert_eq;
use muncher::events::GameCommand;
use muncher::grid::cell_center;
use muncher::level::Level;

mod common;
use common::{new_game, place, player_entity, position_of, start_run, tick_seconds};

#[test]
fn test_player_idle_until_first_command() {
    let mut game = new_game();
    let player = player_entity(&mut game);
    let spawn = position_of(&mut game, player);

    tick_seconds(&mut game, 1.0);

    assert_eq!(position_of(&mut game, player), spawn);
    assert!(game.is_active());
}

#[test]
fn test_command_into_wall_is_ignored() {
    // The spawn lane only opens left and right.
    let mut game = new_game();
    let player = player_entity(&mut game);
    let spawn = position_of(&mut game, player);

    game.send_command(GameCommand::MovePlayer(Direction::Up));
    tick_seconds(&mut game, 0.5);

    assert_eq!(position_of(&mut game, player), spawn);
}

#[test]
fn test_moving_left_clamps_at_the_wall() {
    // From the spawn at cell (13, 23) the leftward lane ends at cell (6, 23);
    // the mover must stop pinned to that tile's center.
    let mut game = new_game();
    let player = player_entity(&mut game);

    start_run(&mut game, Direction::Left);
    tick_seconds(&mut game, 1.5);

    let stop = cell_center(glam::IVec2::new(6, 23));
    assert_eq!(position_of(&mut game, player), stop);
}

#[test]
fn test_pellets_eaten_along_the_way() {
    // Cells 6 through 12 of the spawn row hold seven pellets.
    let mut game = new_game();
    let before = game.remaining_collectibles();

    start_run(&mut game, Direction::Left);
    tick_seconds(&mut game, 1.5);

    assert_eq!(game.score(), 70);
    assert_eq!(game.remaining_collectibles(), before - 7);
}

#[test]
fn test_reversal_commits_immediately() {
    let mut game = new_game();
    let player = player_entity(&mut game);

    start_run(&mut game, Direction::Left);
    tick_seconds(&mut game, 0.2);
    let mid = position_of(&mut game, player);

    game.send_command(GameCommand::MovePlayer(Direction::Right));
    tick_seconds(&mut game, 0.2);

    assert!(position_of(&mut game, player).x > mid.x);
}

#[test]
fn test_portal_crossing_wraps_to_the_far_side() {
    // Drop the player just inside the left portal mouth heading left; it must
    // come out near the right edge still travelling left.
    let mut game = new_game();
    let level = Level::bundled().expect("bundled level parses");
    let portal_row_y = level.portals[0].center.y;
    let player = player_entity(&mut game);

    start_run(&mut game, Direction::Left);
    place(&mut game, player, Vec2::new(40.0, portal_row_y));
    tick_seconds(&mut game, 0.5);

    let after = position_of(&mut game, player);
    assert!(after.x > level.portals[0].center.x + 32.0, "wrapped to {after:?}");
}
