//! Tile identity with simple integer IDs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple integer ID for tiles
///
/// IDs are handed out in increasing order by the board that owns the tile and
/// survive slides and merges, so a renderer can follow a tile across moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(u32);

impl TileId {
    pub fn new(id: u32) -> Self {
        TileId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic tile ID allocator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileIdGen {
    next_id: u32,
}

impl TileIdGen {
    pub fn new() -> Self {
        TileIdGen { next_id: 0 }
    }

    /// Start allocating after an existing ID (used when rebuilding a board)
    pub fn starting_at(next_id: u32) -> Self {
        TileIdGen { next_id }
    }

    /// Generate a new unique TileId
    pub fn next_id(&mut self) -> TileId {
        let id = TileId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// The ID the next call to `next_id` will return
    pub fn peek(&self) -> TileId {
        TileId::new(self.next_id)
    }
}
