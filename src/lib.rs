//! Rogue 2048 - a 2048 engine with roguelike Chance/Fate events
//!
//! The `core` module holds the board and its slide/merge algorithm, `game`
//! the move engine, the event policy and the effect catalog. Everything is
//! deterministic given a seed, which makes games replayable and snapshots
//! resumable.

pub mod core;
pub mod error;
pub mod game;
pub mod history;
pub mod simulation;
pub mod store;

pub use error::{GameError, Result};
