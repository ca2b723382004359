//! ASCII board parsing and the static tile source.
//!
//! The level is the only asset the core reads. Parsing validates the asset up
//! front: a board with a missing spawn or an unpaired teleport endpoint is
//! corrupt and fails construction loudly ([`LevelError`]), it is never a
//! runtime game condition.

use std::collections::HashMap;

use bevy_ecs::resource::Resource;
use glam::{IVec2, Vec2};
use tracing::debug;

use crate::constants::{RAW_BOARD, TILE_SIZE};
use crate::error::LevelError;
use crate::grid::cell_center;

/// Index order of the pursuer spawn markers `b`, `p`, `i`, `c`.
pub const PURSUER_SPAWN_MARKERS: [char; 4] = ['b', 'p', 'i', 'c'];

/// One resolved teleport endpoint. Overlapping it relocates the mover next to
/// its paired endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    /// Center of this endpoint, in pixels.
    pub center: Vec2,
    /// Collision footprint of this endpoint (one tile).
    pub size: Vec2,
    /// Center of the paired endpoint, in pixels.
    pub exit_center: Vec2,
}

/// Static maze data: the blocking grid plus every named point object.
#[derive(Resource, Debug, Clone)]
pub struct Level {
    width: i32,
    height: i32,
    blocked: Vec<bool>,
    pub pellets: Vec<Vec2>,
    pub pills: Vec<Vec2>,
    pub portals: Vec<Portal>,
    pub player_spawn: Vec2,
    /// Pursuer respawn points, indexed per [`PURSUER_SPAWN_MARKERS`].
    pub pursuer_spawns: [Vec2; 4],
    /// Home corners steered toward in scatter mode, same index order.
    pub scatter_corners: [IVec2; 4],
    /// The cell a dead pursuer walks back to before reviving.
    pub home_marker: IVec2,
}

impl Level {
    /// Parses and validates an ASCII board.
    ///
    /// Legend: `#` wall, `.` pellet, `o` power pill, space open floor, `P`
    /// player spawn, `b`/`p`/`i`/`c` pursuer spawns, `T`..=`W` teleport
    /// endpoints (each letter must appear exactly twice).
    pub fn parse(board: &[&str]) -> Result<Level, LevelError> {
        let height = board.len() as i32;
        let width = board.first().map_or(0, |row| row.len()) as i32;

        let mut blocked = vec![false; (width * height) as usize];
        let mut pellets = Vec::new();
        let mut pills = Vec::new();
        let mut player_spawn = None;
        let mut pursuer_spawns: [Option<Vec2>; 4] = [None; 4];
        let mut portal_cells: HashMap<char, Vec<IVec2>> = HashMap::new();

        for (y, row) in board.iter().enumerate() {
            if row.len() as i32 != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width as usize,
                    found: row.len(),
                });
            }

            for (x, ch) in row.chars().enumerate() {
                let cell = IVec2::new(x as i32, y as i32);
                let center = cell_center(cell);

                match ch {
                    '#' => blocked[(y as i32 * width + x as i32) as usize] = true,
                    ' ' => {}
                    '.' => pellets.push(center),
                    'o' => pills.push(center),
                    'P' => {
                        if player_spawn.replace(center).is_some() {
                            return Err(LevelError::DuplicateSpawn { name: "player", cell });
                        }
                    }
                    'T'..='W' => portal_cells.entry(ch).or_default().push(cell),
                    other => match PURSUER_SPAWN_MARKERS.iter().position(|&m| m == other) {
                        Some(index) => {
                            if pursuer_spawns[index].replace(center).is_some() {
                                return Err(LevelError::DuplicateSpawn {
                                    name: PURSUER_SPAWN_NAMES[index],
                                    cell,
                                });
                            }
                        }
                        None => return Err(LevelError::UnknownCharacter(other)),
                    },
                }
            }
        }

        let player_spawn = player_spawn.ok_or(LevelError::MissingSpawn("player"))?;
        let mut spawns = [Vec2::ZERO; 4];
        for (index, spawn) in pursuer_spawns.into_iter().enumerate() {
            spawns[index] = spawn.ok_or(LevelError::MissingSpawn(PURSUER_SPAWN_NAMES[index]))?;
        }

        let mut portals = Vec::new();
        for (id, cells) in &portal_cells {
            if cells.len() != 2 {
                return Err(LevelError::UnpairedPortal(*id, cells.len()));
            }
            for (cell, paired) in [(cells[0], cells[1]), (cells[1], cells[0])] {
                portals.push(Portal {
                    center: cell_center(cell),
                    size: Vec2::splat(TILE_SIZE),
                    exit_center: cell_center(paired),
                });
            }
        }

        // Scatter corners are the walkable board corners: the first pursuer
        // holds the top-right, then top-left, bottom-right, bottom-left.
        let scatter_corners = [
            IVec2::new(width - 2, 1),
            IVec2::new(1, 1),
            IVec2::new(width - 2, height - 2),
            IVec2::new(1, height - 2),
        ];

        let level = Level {
            width,
            height,
            blocked,
            pellets,
            pills,
            portals,
            player_spawn,
            pursuer_spawns: spawns,
            scatter_corners,
            home_marker: crate::grid::cell_of(spawns[0]),
        };

        debug!(
            width,
            height,
            pellets = level.pellets.len(),
            pills = level.pills.len(),
            portals = level.portals.len(),
            "Level parsed"
        );

        Ok(level)
    }

    /// The default bundled board.
    pub fn bundled() -> Result<Level, LevelError> {
        Level::parse(&RAW_BOARD)
    }

    /// Whether a cell blocks movement. Cells outside the board are blocked,
    /// with the exception that teleport endpoints sit on walkable floor.
    pub fn is_blocked(&self, cell: IVec2) -> bool {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return true;
        }
        self.blocked[(cell.y * self.width + cell.x) as usize]
    }

    pub fn collectible_count(&self) -> usize {
        self.pellets.len() + self.pills.len()
    }
}

const PURSUER_SPAWN_NAMES: [&str; 4] = ["blinky", "pinky", "inky", "clyde"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_board_parses() {
        let level = Level::bundled().unwrap();
        assert!(level.collectible_count() > 150);
        assert_eq!(level.pills.len(), 4);
        assert_eq!(level.portals.len(), 2);
        assert_eq!(level.portals[0].exit_center, level.portals[1].center);
    }

    #[test]
    fn test_missing_player_spawn_fails() {
        let result = Level::parse(&["#####", "#b..#", "#pic#", "#####"]);
        assert_eq!(result.unwrap_err(), LevelError::MissingSpawn("player"));
    }

    #[test]
    fn test_unpaired_portal_fails() {
        let result = Level::parse(&["#####", "#bPT#", "#pic#", "#####"]);
        assert_eq!(result.unwrap_err(), LevelError::UnpairedPortal('T', 1));
    }

    #[test]
    fn test_unknown_character_fails() {
        let result = Level::parse(&["#####", "#bP?#", "#pic#", "#####"]);
        assert_eq!(result.unwrap_err(), LevelError::UnknownCharacter('?'));
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let level = Level::bundled().unwrap();
        assert!(level.is_blocked(IVec2::new(-1, 14)));
        assert!(level.is_blocked(IVec2::new(28, 14)));
        assert!(!level.is_blocked(IVec2::new(0, 14))); // teleport endpoint
    }
}
