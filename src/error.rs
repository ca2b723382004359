//! Centralized error types for the simulation core.
//!
//! Runtime game outcomes ("game over", "level completed") are states, not
//! errors; everything here is a construction-time or wiring fault.

use glam::IVec2;

/// Main error type for the simulation core.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Errors raised while validating a level asset. A malformed board is a
/// corrupt asset and must fail construction, never be papered over at runtime.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("Unknown character in board: {0:?}")]
    UnknownCharacter(char),

    #[error("Board rows must all be {expected} cells wide, row {row} is {found}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("Missing spawn point: {0}")]
    MissingSpawn(&'static str),

    #[error("Duplicate spawn point {name} at {cell}")]
    DuplicateSpawn { name: &'static str, cell: IVec2 },

    #[error("Teleport endpoint {0:?} is unpaired ({1} found, expected exactly 2)")]
    UnpairedPortal(char, usize),
}

/// Result type for core operations.
pub type GameResult<T> = Result<T, GameError>;
