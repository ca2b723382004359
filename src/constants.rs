//! Tuning values and the default board layout.

use glam::UVec2;

/// The size of each maze cell, in pixels.
pub const TILE_SIZE: f32 = 16.0;

/// The size of the game board, in cells.
pub const BOARD_CELL_SIZE: UVec2 = UVec2::new(28, 31);

/// How close (per axis, in pixels) a mover must be to a tile center before a
/// buffered turn commits. Wide enough that a frame at full speed cannot step
/// over the window.
pub const TURN_TOLERANCE: f32 = 4.0;

/// Collision body edge length for the player and pursuers (half a tile).
pub const MOVER_BODY: f32 = TILE_SIZE / 2.0;

/// Collision body edge length for pellets, pills, and bonuses.
pub const COLLECTIBLE_BODY: f32 = TILE_SIZE;

pub const PELLET_SCORE: u32 = 10;
pub const PILL_SCORE: u32 = 50;
pub const GHOST_SCORE: u32 = 200;

/// Speed scale applied to a frightened pursuer.
pub const FRIGHTENED_SPEED_FACTOR: f32 = 0.5;
/// Speed scale applied to a dead pursuer crawling home.
pub const DEAD_SPEED_FACTOR: f32 = 0.2;

/// How long a picked-up bonus multiplies the score multiplier.
pub const BONUS_WINDOW_MS: u64 = 3000;

/// Length of the player death animation before the automatic respawn.
pub const PLAYER_DEATH_MS: u64 = 1200;

/// Duration of each fade step in the pursuer home-release sequence.
pub const RELEASE_FADE_MS: u64 = 300;

/// The raw layout of the default board, as a 2D array of characters.
///
/// Legend: `#` wall, `.` pellet, `o` power pill, `P` player spawn,
/// `b`/`p`/`i`/`c` pursuer spawns, `T` a paired teleport endpoint.
pub const RAW_BOARD: [&str; BOARD_CELL_SIZE.y as usize] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "     #.##### ## #####.#     ",
    "     #.##    b     ##.#     ",
    "     #.## ##pic### ##.#     ",
    "######.## ######## ##.######",
    "T     .   ########   .     T",
    "######.## ######## ##.######",
    "     #.## ######## ##.#     ",
    "     #.##          ##.#     ",
    "     #.## ######## ##.#     ",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_board_dimensions() {
        assert_eq!(RAW_BOARD.len(), BOARD_CELL_SIZE.y as usize);
        for row in RAW_BOARD.iter() {
            assert_eq!(row.len(), BOARD_CELL_SIZE.x as usize);
        }
    }

    #[test]
    fn test_raw_board_spawns_present() {
        let all: String = RAW_BOARD.concat();
        for marker in ['P', 'b', 'p', 'i', 'c'] {
            assert_eq!(all.chars().filter(|&ch| ch == marker).count(), 1, "missing {marker}");
        }
    }

    #[test]
    fn test_raw_board_teleports_paired() {
        let all: String = RAW_BOARD.concat();
        assert_eq!(all.chars().filter(|&ch| ch == 'T').count(), 2);
    }

    #[test]
    fn test_turn_tolerance_smaller_than_half_tile() {
        assert!(TURN_TOLERANCE < TILE_SIZE / 2.0);
    }
}
