//! Hospital Mystery: The Vanishing Ward
//!
//! A detective text adventure game. You play Detective Zhou, investigating
//! a string of disappearances inside a deserted suburban hospital, one
//! locked door and one cipher at a time.
//!
//! # Game Mechanics
//!
//! - **Exploration**: Move between wards, stairwells, and the rooms below
//! - **Puzzles**: Decode ciphers, rewire panels, mix dosages
//! - **Detection Risk**: Wrong answers draw attention; too much ends the run
//! - **Branching**: Misleading clues open survivable but dangerous paths
//!
//! # Architecture
//!
//! - `game` - Core game state, scenes, puzzles, narrative sequences, endings
//! - `save` - Snapshot codec, manual slots and the failure checkpoint
//! - `tui` - Terminal user interface with ratatui
//! - `data` - Shared vocabulary: ids, risk levels, the clue journal

pub mod data;
pub mod game;
pub mod save;
pub mod tui;

pub use data::*;
pub use game::Game;

/// Game version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type for the game
pub type Result<T> = anyhow::Result<T>;

/// Custom error types
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Save data corrupted: {0}")]
    CorruptedSave(String),
}
