//! Continuous-to-grid conversion and neighbor walkability queries.

use bevy_ecs::component::Component;
use glam::{IVec2, Vec2};
use strum::IntoEnumIterator;

use crate::constants::TILE_SIZE;
use crate::direction::Direction;
use crate::level::Level;

/// The grid cell containing a continuous pixel position.
pub fn cell_of(position: Vec2) -> IVec2 {
    IVec2::new(
        (position.x / TILE_SIZE).floor() as i32,
        (position.y / TILE_SIZE).floor() as i32,
    )
}

/// Pixel coordinate of a cell's center, the only turn-eligible point in it.
pub fn cell_center(cell: IVec2) -> Vec2 {
    (cell.as_vec2() + Vec2::splat(0.5)) * TILE_SIZE
}

/// Per-tick snapshot of a mover's grid cell and the openness of its four
/// orthogonal neighbors. Recomputed from the level every tick, never mutated
/// independently.
#[derive(Component, Debug, Clone)]
pub struct TileSense {
    pub marker: IVec2,
    open: [bool; 4],
}

impl TileSense {
    pub fn new() -> Self {
        Self {
            marker: IVec2::splat(-1),
            open: [false; 4],
        }
    }

    pub fn refresh(&mut self, position: Vec2, level: &Level) {
        self.marker = cell_of(position);
        for direction in Direction::iter() {
            self.open[direction.as_usize()] = !level.is_blocked(self.marker + direction.offset());
        }
    }

    pub fn is_open(&self, direction: Direction) -> bool {
        self.open[direction.as_usize()]
    }
}

impl Default for TileSense {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_of_floors_toward_origin() {
        assert_eq!(cell_of(Vec2::new(0.0, 0.0)), IVec2::new(0, 0));
        assert_eq!(cell_of(Vec2::new(15.9, 15.9)), IVec2::new(0, 0));
        assert_eq!(cell_of(Vec2::new(16.0, 31.0)), IVec2::new(1, 1));
        assert_eq!(cell_of(Vec2::new(40.0, 8.0)), IVec2::new(2, 0));
    }

    #[test]
    fn test_cell_center_round_trips() {
        for cell in [IVec2::new(0, 0), IVec2::new(3, 7), IVec2::new(27, 30)] {
            assert_eq!(cell_of(cell_center(cell)), cell);
        }
    }

    #[test]
    fn test_sense_reads_neighbors() {
        let level = Level::parse(&[
            "#####",
            "#...#",
            "#bP.#",
            "#pic#",
            "#####",
        ])
        .unwrap();
        let mut sense = TileSense::new();
        sense.refresh(cell_center(IVec2::new(2, 1)), &level);
        assert_eq!(sense.marker, IVec2::new(2, 1));
        assert!(sense.is_open(Direction::Left));
        assert!(sense.is_open(Direction::Right));
        assert!(sense.is_open(Direction::Down));
        assert!(!sense.is_open(Direction::Up));
    }
}
