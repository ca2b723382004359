//! Maze-chase simulation core.
//!
//! This crate owns the game logic of a tile-based maze-chase arcade game:
//! grid-constrained movement, pursuer AI, timers, and per-tick encounter
//! resolution. Rendering, input devices, and audio playback live in the host,
//! which feeds [`events::GameCommand`]s in and drains [`events::UiEvent`]s and
//! [`events::AudioEvent`]s out between calls to [`game::Game::tick`].

pub mod constants;
pub mod direction;
pub mod encounter;
pub mod error;
pub mod events;
pub mod game;
pub mod ghost;
pub mod grid;
pub mod level;
pub mod movement;
pub mod player;
pub mod scheduler;
pub mod session;
