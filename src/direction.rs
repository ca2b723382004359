//! The four orthogonal movement directions.

use glam::IVec2;
use strum_macros::{Display, EnumIter};

/// An axis-aligned movement direction. A stopped entity carries
/// `Option::<Direction>::None` rather than a fifth variant, which keeps
/// [`Direction::opposite`] a total function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Decision order used wherever directions are enumerated. The order is a
/// deliberate tie-break: the first open direction closest to the target wins.
pub const DIRECTIONS: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Grid offset of the neighboring cell in this direction.
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Left => IVec2::NEG_X,
            Direction::Right => IVec2::X,
            Direction::Up => IVec2::NEG_Y,
            Direction::Down => IVec2::Y,
        }
    }

    /// Stable index into per-direction tables.
    pub fn as_usize(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Up => 2,
            Direction::Down => 3,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_an_involution() {
        for direction in DIRECTIONS {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    #[test]
    fn test_offsets_are_unit_and_distinct() {
        for direction in DIRECTIONS {
            assert_eq!(direction.offset().abs().element_sum(), 1);
            assert_eq!(direction.offset(), -direction.opposite().offset());
        }
    }

    #[test]
    fn test_as_usize_covers_table() {
        for (index, direction) in DIRECTIONS.iter().enumerate() {
            assert_eq!(direction.as_usize(), index);
        }
    }
}
