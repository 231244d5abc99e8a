//! Tiles and board positions

use crate::core::TileId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A numbered tile occupying one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub value: u32,
}

impl Tile {
    pub fn new(id: TileId, value: u32) -> Self {
        Tile { id, value }
    }

    /// Same tile, new value (identity is kept)
    pub fn with_value(self, value: u32) -> Self {
        Tile { id: self.id, value }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.value, self.id)
    }
}

/// A (row, col) board coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Largest value a tile can hold
pub const MAX_TILE_VALUE: u32 = 1 << 31;

pub fn is_power_of_two(n: u32) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

/// Value of merging `a` into `b`, if they merge at all
///
/// Two `MAX_TILE_VALUE` tiles do not merge.
pub fn merge_value(a: u32, b: u32) -> Option<u32> {
    if a == b {
        a.checked_mul(2)
    } else {
        None
    }
}

/// `value * factor`, clamped to `MAX_TILE_VALUE`
pub fn scale_value(value: u32, factor: u32) -> u32 {
    value.checked_mul(factor).map_or(MAX_TILE_VALUE, |v| v.min(MAX_TILE_VALUE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_value_keeps_identity() {
        let tile = Tile::new(TileId::new(3), 8);
        let doubled = tile.with_value(16);
        assert_eq!(doubled.id, TileId::new(3));
        assert_eq!(doubled.value, 16);
    }

    #[test]
    fn test_merge_and_scale_stay_in_range() {
        assert_eq!(merge_value(4, 4), Some(8));
        assert_eq!(merge_value(4, 8), None);
        assert_eq!(merge_value(MAX_TILE_VALUE / 2, MAX_TILE_VALUE / 2), Some(MAX_TILE_VALUE));
        assert_eq!(merge_value(MAX_TILE_VALUE, MAX_TILE_VALUE), None);

        assert_eq!(scale_value(8, 4), 32);
        assert_eq!(scale_value(1 << 30, 4), MAX_TILE_VALUE);
        assert!(is_power_of_two(scale_value(u32::MAX / 2, 2)));
    }

    #[test]
    fn test_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2));
        assert!(is_power_of_two(2048));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(12));
        assert!(!is_power_of_two(24));
    }
}
