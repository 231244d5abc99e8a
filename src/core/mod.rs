//! Core board types: tiles, directions, the board and randomness

pub mod board;
pub mod direction;
pub mod entity;
pub mod random;
pub mod tile;

pub use board::{Board, CellChange, MergedPositions, SlideOutcome, CELLS, SIZE};
pub use direction::{Direction, EventChoice};
pub use entity::{TileId, TileIdGen};
pub use random::{RandomSource, ScriptedRandom};
pub use tile::{is_power_of_two, merge_value, scale_value, Position, Tile, MAX_TILE_VALUE};
