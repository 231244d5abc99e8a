//! The 4×4 board and the slide/merge algorithm
//!
//! Every direction is reduced to a canonical "slide left" over a line of
//! cells listed in travel order: a row for horizontal moves, a column for
//! vertical ones, reversed for Right/Down. This is the transpose/reverse
//! trick expressed as coordinate lists, so merge positions come back in
//! board coordinates without un-transposing anything.

use crate::core::random::RandomSource;
use crate::core::{is_power_of_two, merge_value, Direction, Position, Tile, TileId, TileIdGen};
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Board edge length
pub const SIZE: usize = 4;

/// Total number of cells
pub const CELLS: usize = SIZE * SIZE;

type Line = [Option<Tile>; SIZE];

/// Merge positions produced by a single move (at most 8 on a 4×4 board)
pub type MergedPositions = SmallVec<[Position; 8]>;

/// Result of sliding the board in one direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideOutcome {
    /// True iff any cell's content changed
    pub moved: bool,
    /// Sum of the values of all merged tiles
    pub gained: u64,
    /// Where the merged tiles ended up
    pub merged_positions: MergedPositions,
}

impl SlideOutcome {
    pub fn merges(&self) -> usize {
        self.merged_positions.len()
    }
}

/// One cell that differs between two boards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub position: Position,
    pub before: Option<Tile>,
    pub after: Option<Tile>,
}

/// Fixed-size grid of optional tiles
///
/// The board also owns tile ID allocation, so every tile it creates gets an
/// ID that is unique for the lifetime of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Tile>; SIZE]; SIZE],
    ids: TileIdGen,
}

impl Board {
    /// Create an empty board
    pub fn new() -> Self {
        Board {
            cells: [[None; SIZE]; SIZE],
            ids: TileIdGen::new(),
        }
    }

    /// Build a board from raw values (0 = empty)
    ///
    /// IDs are assigned in row-major order starting at 0.
    pub fn from_values(values: [[u32; SIZE]; SIZE]) -> Self {
        let mut board = Board::new();
        for (r, row) in values.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v != 0 {
                    board.place(Position::new(r, c), v);
                }
            }
        }
        board
    }

    /// Build a board from untrusted rows (fixtures, hand-written scenarios)
    pub fn try_from_rows(rows: &[Vec<u32>]) -> Result<Self> {
        if rows.len() != SIZE || rows.iter().any(|r| r.len() != SIZE) {
            return Err(GameError::InvalidBoard(format!(
                "expected {SIZE}x{SIZE} rows, got {} rows",
                rows.len()
            )));
        }
        let mut values = [[0u32; SIZE]; SIZE];
        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v != 0 && !is_power_of_two(v) {
                    return Err(GameError::InvalidBoard(format!(
                        "tile value {v} at ({r}, {c}) is not a power of two"
                    )));
                }
                values[r][c] = v;
            }
        }
        Ok(Board::from_values(values))
    }

    /// Raw values (0 = empty)
    pub fn values(&self) -> [[u32; SIZE]; SIZE] {
        let mut out = [[0u32; SIZE]; SIZE];
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                out[r][c] = cell.map_or(0, |t| t.value);
            }
        }
        out
    }

    /// Values of a single row (0 = empty)
    pub fn row_values(&self, row: usize) -> [u32; SIZE] {
        self.values()[row]
    }

    pub fn get(&self, pos: Position) -> Option<Tile> {
        self.cells[pos.row][pos.col]
    }

    /// Put a brand-new tile at `pos`, replacing whatever was there
    pub fn place(&mut self, pos: Position, value: u32) -> Tile {
        let tile = Tile::new(self.ids.next_id(), value);
        self.cells[pos.row][pos.col] = Some(tile);
        tile
    }

    /// Change the value of the tile at `pos`, keeping its identity
    ///
    /// Returns false if the cell is empty.
    pub fn set_value(&mut self, pos: Position, value: u32) -> bool {
        match self.cells[pos.row][pos.col].as_mut() {
            Some(tile) => {
                tile.value = value;
                true
            }
            None => false,
        }
    }

    /// Remove the tile at `pos`; its ID is never handed out again
    pub fn clear(&mut self, pos: Position) -> Option<Tile> {
        self.cells[pos.row][pos.col].take()
    }

    /// All occupied cells in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.cells.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.map(|t| (Position::new(r, c), t)))
        })
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Position, Option<Tile>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, cell)| (Position::new(r, c), *cell)))
    }

    pub fn empty_positions(&self) -> SmallVec<[Position; CELLS]> {
        self.cells()
            .filter(|(_, cell)| cell.is_none())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    pub fn is_empty(&self) -> bool {
        self.tile_count() == 0
    }

    pub fn is_full(&self) -> bool {
        self.tile_count() == CELLS
    }

    /// Highest tile value, 0 on an empty board
    pub fn max_value(&self) -> u32 {
        self.tiles().map(|(_, t)| t.value).max().unwrap_or(0)
    }

    /// Lowest tile value, 0 on an empty board
    pub fn min_value(&self) -> u32 {
        self.tiles().map(|(_, t)| t.value).min().unwrap_or(0)
    }

    /// Next ID this board will allocate
    pub fn next_tile_id(&self) -> TileId {
        self.ids.peek()
    }

    /// True if some move can still change the board
    ///
    /// False exactly when every cell is occupied and no two horizontally or
    /// vertically adjacent cells can merge.
    pub fn can_move(&self) -> bool {
        let merges_with = |tile: Tile, other: Option<Tile>| {
            other.is_some_and(|o| merge_value(tile.value, o.value).is_some())
        };
        for r in 0..SIZE {
            for c in 0..SIZE {
                let Some(tile) = self.cells[r][c] else {
                    return true;
                };
                if r + 1 < SIZE && merges_with(tile, self.cells[r + 1][c]) {
                    return true;
                }
                if c + 1 < SIZE && merges_with(tile, self.cells[r][c + 1]) {
                    return true;
                }
            }
        }
        false
    }

    /// Cells of line `index` in travel order for `dir`
    ///
    /// The first position is the wall tiles slide toward.
    pub fn line_positions(dir: Direction, index: usize) -> [Position; SIZE] {
        let mut out = [Position::new(0, 0); SIZE];
        for (i, slot) in out.iter_mut().enumerate() {
            let along = match dir {
                Direction::Left | Direction::Up => i,
                Direction::Right | Direction::Down => SIZE - 1 - i,
            };
            *slot = if dir.is_vertical() {
                Position::new(along, index)
            } else {
                Position::new(index, along)
            };
        }
        out
    }

    /// Slide and merge every line toward `dir`
    ///
    /// Does not spawn anything; the move engine decides what happens next.
    pub fn slide(&mut self, dir: Direction) -> SlideOutcome {
        let mut outcome = SlideOutcome::default();

        for index in 0..SIZE {
            let positions = Board::line_positions(dir, index);
            let mut line: Line = [None; SIZE];
            for (slot, pos) in line.iter_mut().zip(positions.iter()) {
                *slot = self.get(*pos);
            }

            let (new_line, gained, merged_slots) = slide_line(line);

            if new_line != line {
                outcome.moved = true;
            }
            outcome.gained += gained;
            outcome
                .merged_positions
                .extend(merged_slots.iter().map(|&slot| positions[slot]));

            for (cell, pos) in new_line.iter().zip(positions.iter()) {
                self.cells[pos.row][pos.col] = *cell;
            }
        }

        outcome
    }

    /// Slide a copy of the board without touching this one
    pub fn preview(&self, dir: Direction) -> (Board, SlideOutcome) {
        let mut copy = self.clone();
        let outcome = copy.slide(dir);
        (copy, outcome)
    }

    /// Place a tile of `value` in a uniformly random empty cell
    pub fn place_random<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        value: u32,
    ) -> Option<(Position, Tile)> {
        let empties = self.empty_positions();
        if empties.is_empty() {
            return None;
        }
        let pos = empties[rng.below(empties.len())];
        Some((pos, self.place(pos, value)))
    }

    /// Spawn a 2 (or a 4 with probability `four_probability`) in a random
    /// empty cell
    pub fn spawn_random<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        four_probability: f64,
    ) -> Option<(Position, Tile)> {
        let empties = self.empty_positions();
        if empties.is_empty() {
            return None;
        }
        let pos = empties[rng.below(empties.len())];
        let value = if rng.chance(1.0 - four_probability) { 2 } else { 4 };
        Some((pos, self.place(pos, value)))
    }

    /// Fisher–Yates shuffle over all cells, empty ones included
    ///
    /// Tiles keep their IDs; only their positions change.
    pub fn shuffle<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let mut flat: [Option<Tile>; CELLS] = [None; CELLS];
        for (i, (_, cell)) in self.cells().enumerate() {
            flat[i] = cell;
        }
        for i in (1..CELLS).rev() {
            let j = rng.below(i + 1);
            flat.swap(i, j);
        }
        for (i, cell) in flat.into_iter().enumerate() {
            self.cells[i / SIZE][i % SIZE] = cell;
        }
    }

    /// Cells whose content differs from `other`
    pub fn diff(&self, other: &Board) -> Vec<CellChange> {
        self.cells()
            .zip(other.cells())
            .filter(|((_, before), (_, after))| before != after)
            .map(|((position, before), (_, after))| CellChange {
                position,
                before,
                after,
            })
            .collect()
    }

    /// Check the board's structural invariants
    ///
    /// - every tile value is a power of two
    /// - tile IDs are unique
    /// - every ID is below the allocator's next ID
    pub fn validate(&self) -> Result<()> {
        let mut seen: SmallVec<[TileId; CELLS]> = SmallVec::new();
        let next = self.ids.peek();
        for (pos, tile) in self.tiles() {
            if !is_power_of_two(tile.value) {
                return Err(GameError::InvalidBoard(format!(
                    "tile {} at {pos} has value {}, not a power of two",
                    tile.id, tile.value
                )));
            }
            if tile.id >= next {
                return Err(GameError::InvalidBoard(format!(
                    "tile {} at {pos} was never allocated (next id {next})",
                    tile.id
                )));
            }
            if seen.contains(&tile.id) {
                return Err(GameError::InvalidBoard(format!("duplicate tile id {} at {pos}", tile.id)));
            }
            seen.push(tile.id);
        }
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.values() {
            let cells: Vec<String> = row
                .iter()
                .map(|&v| if v == 0 { format!("{:>5}", ".") } else { format!("{v:>5}") })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Canonical slide-left of one line
///
/// Returns the new line, points gained and the slots (in the new line) that
/// hold merged tiles. A merged tile keeps the ID of the tile nearer the wall
/// and is never merged again in the same pass.
fn slide_line(line: Line) -> (Line, u64, SmallVec<[usize; 2]>) {
    let tiles: SmallVec<[Tile; SIZE]> = line.iter().flatten().copied().collect();
    let mut out: Line = [None; SIZE];
    let mut merged = SmallVec::new();
    let mut gained = 0u64;
    let mut write = 0;
    let mut i = 0;

    while i < tiles.len() {
        let current = tiles[i];
        let merged_value = tiles
            .get(i + 1)
            .and_then(|next| merge_value(current.value, next.value));
        if let Some(value) = merged_value {
            out[write] = Some(current.with_value(value));
            gained += u64::from(value);
            merged.push(write);
            i += 2;
        } else {
            out[write] = Some(current);
            i += 1;
        }
        write += 1;
    }

    (out, gained, merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::ScriptedRandom;
    use crate::core::MAX_TILE_VALUE;

    fn row_board(row: [u32; SIZE]) -> Board {
        Board::from_values([row, [0; SIZE], [0; SIZE], [0; SIZE]])
    }

    #[test]
    fn test_merge_once_per_tile() {
        let mut board = row_board([2, 2, 2, 0]);
        let outcome = board.slide(Direction::Left);

        assert!(outcome.moved);
        assert_eq!(outcome.gained, 4);
        assert_eq!(board.row_values(0), [4, 2, 0, 0]);
        assert_eq!(outcome.merged_positions.as_slice(), &[Position::new(0, 0)]);
    }

    #[test]
    fn test_merged_tile_does_not_chain() {
        let mut board = row_board([4, 4, 8, 0]);
        let outcome = board.slide(Direction::Left);
        assert_eq!(board.row_values(0), [8, 8, 0, 0]);
        assert_eq!(outcome.gained, 8);
    }

    #[test]
    fn test_two_pairs_merge() {
        let mut board = row_board([2, 2, 2, 2]);
        let outcome = board.slide(Direction::Left);
        assert_eq!(board.row_values(0), [4, 4, 0, 0]);
        assert_eq!(outcome.gained, 8);
        assert_eq!(outcome.merges(), 2);
    }

    #[test]
    fn test_gap_then_merge() {
        let mut board = row_board([0, 2, 2, 0]);
        let outcome = board.slide(Direction::Left);
        assert_eq!(board.row_values(0), [4, 0, 0, 0]);
        assert_eq!(outcome.gained, 4);
    }

    #[test]
    fn test_slide_right_merges_from_the_wall() {
        let mut board = row_board([2, 2, 2, 0]);
        let outcome = board.slide(Direction::Right);
        assert_eq!(board.row_values(0), [0, 0, 2, 4]);
        assert_eq!(outcome.merged_positions.as_slice(), &[Position::new(0, 3)]);
    }

    #[test]
    fn test_vertical_moves() {
        let mut board = Board::from_values([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 8]]);
        let outcome = board.slide(Direction::Up);
        assert_eq!(
            board.values(),
            [[4, 0, 0, 8], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
        );
        assert_eq!(outcome.gained, 4);

        let outcome = board.slide(Direction::Down);
        assert_eq!(
            board.values(),
            [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [8, 0, 0, 8]]
        );
        assert_eq!(outcome.merged_positions.as_slice(), &[Position::new(3, 0)]);
    }

    #[test]
    fn test_no_op_slide() {
        let mut board = row_board([2, 4, 8, 16]);
        let before = board.clone();
        let outcome = board.slide(Direction::Left);
        assert!(!outcome.moved);
        assert_eq!(outcome.gained, 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_merge_keeps_wall_side_id() {
        let mut board = row_board([0, 2, 0, 2]);
        let left_id = board.get(Position::new(0, 1)).unwrap().id;
        board.slide(Direction::Left);
        let merged = board.get(Position::new(0, 0)).unwrap();
        assert_eq!(merged.value, 4);
        assert_eq!(merged.id, left_id);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_ids_follow_sliding_tiles() {
        let mut board = row_board([0, 0, 0, 8]);
        let id = board.get(Position::new(0, 3)).unwrap().id;
        board.slide(Direction::Left);
        assert_eq!(board.get(Position::new(0, 0)).unwrap().id, id);
    }

    #[test]
    fn test_can_move() {
        let stuck = Board::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!stuck.can_move());
        for dir in Direction::ALL {
            let (_, outcome) = stuck.preview(dir);
            assert!(!outcome.moved);
        }

        let pair = Board::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 4]]);
        assert!(pair.can_move());

        let vertical_pair = Board::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 8], [4, 2, 4, 8]]);
        assert!(vertical_pair.can_move());

        let hole = Board::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        assert!(hole.can_move());
    }

    #[test]
    fn test_spawn_random_uses_rng() {
        let mut board = Board::new();
        // First draw picks the cell, second the value.
        let mut rng = ScriptedRandom::new(vec![0.0, 0.95]);
        let (pos, tile) = board.spawn_random(&mut rng, 0.1).unwrap();
        assert_eq!(pos, Position::new(0, 0));
        assert_eq!(tile.value, 4);

        let mut rng = ScriptedRandom::new(vec![0.999, 0.5]);
        let (pos, tile) = board.spawn_random(&mut rng, 0.1).unwrap();
        assert_eq!(pos, Position::new(3, 3));
        assert_eq!(tile.value, 2);
    }

    #[test]
    fn test_spawn_on_full_board() {
        let mut board = Board::from_values([[2; SIZE]; SIZE]);
        let mut rng = ScriptedRandom::new(vec![0.5]);
        assert!(board.spawn_random(&mut rng, 0.1).is_none());
    }

    #[test]
    fn test_shuffle_preserves_tiles() {
        let mut board = Board::from_values([[2, 4, 0, 0], [8, 0, 0, 0], [0, 0, 16, 0], [0, 0, 0, 32]]);
        let mut before: Vec<Tile> = board.tiles().map(|(_, t)| t).collect();
        let mut rng = ScriptedRandom::new(vec![0.3, 0.7, 0.1, 0.9, 0.5]);
        board.shuffle(&mut rng);
        let mut after: Vec<Tile> = board.tiles().map(|(_, t)| t).collect();
        before.sort_by_key(|t| t.id);
        after.sort_by_key(|t| t.id);
        assert_eq!(before, after);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_diff_reports_changed_cells() {
        let before = row_board([2, 2, 0, 0]);
        let mut after = before.clone();
        after.slide(Direction::Left);
        let changes = before.diff(&after);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].position, Position::new(0, 0));
        assert_eq!(changes[0].after.map(|t| t.value), Some(4));
        assert_eq!(changes[1].after, None);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut board = row_board([2, 4, 0, 0]);
        let tile = board.get(Position::new(0, 0)).unwrap();
        board.cells[1][1] = Some(tile);
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_power_of_two() {
        let mut board = row_board([2, 4, 0, 0]);
        board.cells[0][1] = board.cells[0][1].map(|t| t.with_value(u32::MAX));
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_largest_tiles_do_not_merge() {
        let mut board = row_board([MAX_TILE_VALUE / 2, MAX_TILE_VALUE / 2, 0, 0]);
        let outcome = board.slide(Direction::Right);
        assert_eq!(board.row_values(0), [0, 0, 0, MAX_TILE_VALUE]);
        assert_eq!(outcome.gained, u64::from(MAX_TILE_VALUE));

        let mut board = row_board([MAX_TILE_VALUE, MAX_TILE_VALUE, 0, 0]);
        let outcome = board.slide(Direction::Right);
        assert_eq!(board.row_values(0), [0, 0, MAX_TILE_VALUE, MAX_TILE_VALUE]);
        assert_eq!(outcome.gained, 0);
        assert!(outcome.merged_positions.is_empty());
        assert!(board.validate().is_ok());

        let full = Board::from_values([[MAX_TILE_VALUE; SIZE]; SIZE]);
        assert!(!full.can_move());
    }

    #[test]
    fn test_try_from_rows() {
        let rows = vec![vec![2, 0, 0, 0], vec![0; 4], vec![0; 4], vec![0, 0, 0, 4]];
        let board = Board::try_from_rows(&rows).unwrap();
        assert_eq!(board.tile_count(), 2);
        assert_eq!(board.max_value(), 4);
        assert_eq!(board.min_value(), 2);

        assert!(Board::try_from_rows(&[vec![2, 0, 0]]).is_err());
        let bad = vec![vec![3, 0, 0, 0], vec![0; 4], vec![0; 4], vec![0; 4]];
        assert!(Board::try_from_rows(&bad).is_err());
    }
}
