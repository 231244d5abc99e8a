//! Chance/Fate effect catalog
//!
//! Each effect is a variant of `EffectKind`; applying one mutates the board
//! (and, for blind mode, the presentation flag) in place. Selection lives in
//! `EffectCatalog`: Chance rolls between a beneficial and a hindrance pool
//! and picks uniformly inside the pool, Fate does a weighted pick over one
//! pool.

use crate::core::{scale_value, Board, EventChoice, Position, RandomSource, Tile, SIZE};
use crate::game::config::EffectConfig;
use crate::game::state::BlindMode;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Blind mode length for the Chance hindrance
const SHORT_BLIND_MOVES: u32 = 3;

/// Ranks `DoubleSmallRank` chooses from
const SMALL_RANKS: [u32; 3] = [2, 4, 8];

/// Most tiles `DoubleLowestTiles` touches
const LOWEST_TILES: usize = 3;

/// Values `HalveSmallSet` halves
const SMALL_SET: [u32; 3] = [4, 8, 16];

/// Threshold for `HalveBigTiles`
const BIG_TILE: u32 = 32;

/// Every board-mutating effect an event can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    AddTileEqualMax,
    DoubleSmallRank,
    SpawnLowTiles,
    DoubleLowestTiles,
    AllBecomeMax,
    Spawn2048,
    HalveOneMax,
    HalveSmallSet,
    HalveBigTiles,
    HalveAll,
    RandomFactor,
    AllBecomeMin,
    ShuffleBoard,
    ClearRow,
    BlindMode,
    ShortBlind,
    Nothing,
}

impl EffectKind {
    /// Stable identifier (matches the serialized form)
    pub fn id(self) -> &'static str {
        match self {
            EffectKind::AddTileEqualMax => "add_tile_equal_max",
            EffectKind::DoubleSmallRank => "double_small_rank",
            EffectKind::SpawnLowTiles => "spawn_low_tiles",
            EffectKind::DoubleLowestTiles => "double_lowest_tiles",
            EffectKind::AllBecomeMax => "all_become_max",
            EffectKind::Spawn2048 => "spawn_2048",
            EffectKind::HalveOneMax => "halve_one_max",
            EffectKind::HalveSmallSet => "halve_small_set",
            EffectKind::HalveBigTiles => "halve_big_tiles",
            EffectKind::HalveAll => "halve_all",
            EffectKind::RandomFactor => "random_factor",
            EffectKind::AllBecomeMin => "all_become_min",
            EffectKind::ShuffleBoard => "shuffle_board",
            EffectKind::ClearRow => "clear_row",
            EffectKind::BlindMode => "blind_mode",
            EffectKind::ShortBlind => "short_blind",
            EffectKind::Nothing => "nothing",
        }
    }

    /// Generic reveal text
    pub fn description(self) -> &'static str {
        match self {
            EffectKind::AddTileEqualMax => "Added a tile equal to current max.",
            EffectKind::DoubleSmallRank => "Doubled all tiles of one small rank.",
            EffectKind::SpawnLowTiles => "Spawned a few low tiles.",
            EffectKind::DoubleLowestTiles => "Doubled the lowest tiles.",
            EffectKind::AllBecomeMax => "All tiles became the current max.",
            EffectKind::Spawn2048 => "Spawned a 2048 tile.",
            EffectKind::HalveOneMax => "Halved a maximum tile.",
            EffectKind::HalveSmallSet => "Halved all 4/8/16 tiles.",
            EffectKind::HalveBigTiles => "Halved every tile of 32 or more.",
            EffectKind::HalveAll => "Halved every tile.",
            EffectKind::RandomFactor => "Applied a random factor ×0.5/×2/×4.",
            EffectKind::AllBecomeMin => "All tiles became the smallest non-zero.",
            EffectKind::ShuffleBoard => "Shuffled the board.",
            EffectKind::ClearRow => "Cleared a row.",
            EffectKind::BlindMode => "Blind mode.",
            EffectKind::ShortBlind => "A short spell of blindness.",
            EffectKind::Nothing => "Nothing happened.",
        }
    }

    /// Apply the effect, returning the specific reveal text
    pub fn apply<R: RandomSource + ?Sized>(
        self,
        board: &mut Board,
        blind: &mut BlindMode,
        config: &EffectConfig,
        rng: &mut R,
    ) -> String {
        match self {
            EffectKind::AddTileEqualMax => {
                let max = board.max_value();
                if max == 0 {
                    return "The board was empty; nothing to copy.".to_string();
                }
                match board.place_random(rng, max) {
                    Some(_) => format!("Added a {max} tile (equal to current max)."),
                    None => "No room for a new tile.".to_string(),
                }
            }
            EffectKind::DoubleSmallRank => {
                let rank = SMALL_RANKS[rng.below(SMALL_RANKS.len())];
                let count = map_tiles(board, |t| (t.value == rank).then(|| scale_value(t.value, 2)));
                format!("Doubled all {rank} tiles ({count} affected).")
            }
            EffectKind::SpawnLowTiles => {
                let wanted = 1 + rng.below(2);
                let mut spawned = 0;
                for _ in 0..wanted {
                    let value = if rng.chance(0.5) { 2 } else { 4 };
                    if board.place_random(rng, value).is_some() {
                        spawned += 1;
                    }
                }
                format!("Spawned {spawned} low tile(s).")
            }
            EffectKind::DoubleLowestTiles => {
                let min = board.min_value();
                if min == 0 {
                    return "The board was empty; nothing to double.".to_string();
                }
                // Row-major, so ties beyond three go to the earliest cells.
                let lowest: SmallVec<[Position; LOWEST_TILES]> = board
                    .tiles()
                    .filter(|(_, t)| t.value == min)
                    .map(|(pos, _)| pos)
                    .take(LOWEST_TILES)
                    .collect();
                for pos in &lowest {
                    board.set_value(*pos, scale_value(min, 2));
                }
                format!("Doubled {} tile(s) of {min}.", lowest.len())
            }
            EffectKind::AllBecomeMax => {
                let max = board.max_value();
                map_tiles(board, |_| Some(max));
                format!("All tiles became {max}.")
            }
            EffectKind::Spawn2048 => {
                if board.place_random(rng, 2048).is_none() {
                    let cell = rng.below(SIZE * SIZE);
                    board.place(Position::new(cell / SIZE, cell % SIZE), 2048);
                }
                self.description().to_string()
            }
            EffectKind::HalveOneMax => {
                let max = board.max_value();
                let candidates: SmallVec<[Position; 16]> =
                    board.tiles().filter(|(_, t)| t.value == max).map(|(p, _)| p).collect();
                if candidates.is_empty() {
                    return "No tile to halve.".to_string();
                }
                let pos = candidates[rng.below(candidates.len())];
                board.set_value(pos, config.halve(max));
                format!("Halved a {max} tile at {pos}.")
            }
            EffectKind::HalveSmallSet => {
                let count = map_tiles(board, |t| SMALL_SET.contains(&t.value).then(|| config.halve(t.value)));
                format!("Halved all 4/8/16 tiles ({count} affected).")
            }
            EffectKind::HalveBigTiles => {
                let count = map_tiles(board, |t| (t.value >= BIG_TILE).then(|| config.halve(t.value)));
                format!("Halved every tile of {BIG_TILE} or more ({count} affected).")
            }
            EffectKind::HalveAll => {
                map_tiles(board, |t| Some(config.halve(t.value)));
                self.description().to_string()
            }
            EffectKind::RandomFactor => match rng.below(3) {
                0 => {
                    map_tiles(board, |t| Some(config.halve(t.value)));
                    "Applied a random factor: ×0.5.".to_string()
                }
                1 => {
                    map_tiles(board, |t| Some(scale_value(t.value, 2)));
                    "Applied a random factor: ×2.".to_string()
                }
                _ => {
                    map_tiles(board, |t| Some(scale_value(t.value, 4)));
                    "Applied a random factor: ×4.".to_string()
                }
            },
            EffectKind::AllBecomeMin => {
                let min = board.min_value();
                if min == 0 {
                    return "The board was empty; nothing changed.".to_string();
                }
                map_tiles(board, |_| Some(min));
                format!("All tiles became {min}.")
            }
            EffectKind::ShuffleBoard => {
                board.shuffle(rng);
                self.description().to_string()
            }
            EffectKind::ClearRow => {
                let row = rng.below(SIZE);
                let cleared = (0..SIZE)
                    .filter_map(|col| board.clear(Position::new(row, col)))
                    .count();
                format!("Cleared row {} ({cleared} tile(s) removed).", row + 1)
            }
            EffectKind::BlindMode => {
                blind.activate(config.blind_moves);
                format!("Blind mode for {} moves.", config.blind_moves)
            }
            EffectKind::ShortBlind => {
                blind.activate(SHORT_BLIND_MOVES);
                format!("Blind mode for {SHORT_BLIND_MOVES} moves.")
            }
            EffectKind::Nothing => self.description().to_string(),
        }
    }
}

/// Rewrite tile values in place; `f` returns the new value or None to skip
///
/// Returns how many tiles were rewritten. Identities are kept.
fn map_tiles<F>(board: &mut Board, mut f: F) -> usize
where
    F: FnMut(Tile) -> Option<u32>,
{
    let updates: SmallVec<[(Position, u32); 16]> = board
        .tiles()
        .filter_map(|(pos, tile)| f(tile).map(|v| (pos, v)))
        .collect();
    for (pos, value) in &updates {
        board.set_value(*pos, *value);
    }
    updates.len()
}

/// A pool entry with its selection weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectEntry {
    pub kind: EffectKind,
    pub weight: f64,
}

impl EffectEntry {
    pub const fn new(kind: EffectKind, weight: f64) -> Self {
        EffectEntry { kind, weight }
    }
}

/// Weighted random pick
///
/// Draws `u` in `[0, total)` and walks the cumulative weights. A draw that
/// lands on or past the last upper bound (floating-point rounding) selects
/// the last entry. Returns None for an empty list or a non-positive total.
pub fn weighted_index<T, R, W>(items: &[T], weight: W, rng: &mut R) -> Option<usize>
where
    R: RandomSource + ?Sized,
    W: Fn(&T) -> f64,
{
    let total: f64 = items.iter().map(&weight).sum();
    if items.is_empty() || total <= 0.0 {
        return None;
    }
    let draw = rng.next_f64() * total;
    let mut acc = 0.0;
    for (i, item) in items.iter().enumerate() {
        acc += weight(item);
        if draw < acc {
            return Some(i);
        }
    }
    Some(items.len() - 1)
}

/// Pools of effects reachable from an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectCatalog {
    /// Chance, beneficial outcomes (uniform)
    pub chance_good: Vec<EffectKind>,
    /// Chance, hindrances (uniform)
    pub chance_bad: Vec<EffectKind>,
    /// Fate, weighted
    pub fate: Vec<EffectEntry>,
}

impl EffectCatalog {
    /// The standard pools
    pub fn standard() -> Self {
        EffectCatalog {
            chance_good: vec![
                EffectKind::AddTileEqualMax,
                EffectKind::DoubleSmallRank,
                EffectKind::SpawnLowTiles,
                EffectKind::DoubleLowestTiles,
                EffectKind::AllBecomeMax,
                EffectKind::Spawn2048,
            ],
            chance_bad: vec![EffectKind::HalveSmallSet, EffectKind::ShortBlind, EffectKind::Nothing],
            fate: vec![
                EffectEntry::new(EffectKind::AllBecomeMax, 5.0),
                EffectEntry::new(EffectKind::Spawn2048, 5.0),
                EffectEntry::new(EffectKind::HalveOneMax, 15.0),
                EffectEntry::new(EffectKind::HalveBigTiles, 10.0),
                EffectEntry::new(EffectKind::HalveAll, 15.0),
                EffectEntry::new(EffectKind::RandomFactor, 10.0),
                EffectEntry::new(EffectKind::ClearRow, 15.0),
                EffectEntry::new(EffectKind::AllBecomeMin, 5.0),
                EffectEntry::new(EffectKind::ShuffleBoard, 10.0),
                EffectEntry::new(EffectKind::BlindMode, 10.0),
            ],
        }
    }

    /// Pick the effect for a player's choice
    pub fn select<R: RandomSource + ?Sized>(
        &self,
        choice: EventChoice,
        config: &EffectConfig,
        rng: &mut R,
    ) -> Option<EffectKind> {
        match choice {
            EventChoice::Chance => {
                let pool = if rng.chance(config.chance_good_ratio) {
                    &self.chance_good
                } else {
                    &self.chance_bad
                };
                if pool.is_empty() {
                    return None;
                }
                Some(pool[rng.below(pool.len())])
            }
            EventChoice::Fate => {
                weighted_index(&self.fate, |e| e.weight, rng).map(|i| self.fate[i].kind)
            }
        }
    }
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedRandom;
    use crate::core::MAX_TILE_VALUE;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn apply(kind: EffectKind, board: &mut Board, rng: &mut ScriptedRandom) -> (String, BlindMode) {
        let mut blind = BlindMode::default();
        let text = kind.apply(board, &mut blind, &EffectConfig::default(), rng);
        assert!(board.validate().is_ok(), "{} left an inconsistent board", kind.id());
        (text, blind)
    }

    fn sample_board() -> Board {
        Board::from_values([[2, 4, 8, 0], [16, 32, 0, 0], [64, 0, 0, 2], [0, 0, 0, 128]])
    }

    #[test]
    fn test_weighted_index_edges() {
        let weights = [1.0, 2.0, 3.0];
        let mut rng = ScriptedRandom::new(vec![0.0]);
        assert_eq!(weighted_index(&weights, |w| *w, &mut rng), Some(0));

        // 0.5 * 6 = 3.0 sits on the boundary between entries 1 and 2.
        let mut rng = ScriptedRandom::new(vec![0.5]);
        assert_eq!(weighted_index(&weights, |w| *w, &mut rng), Some(2));

        let mut rng = ScriptedRandom::new(vec![0.999_999_9]);
        assert_eq!(weighted_index(&weights, |w| *w, &mut rng), Some(2));

        let empty: [f64; 0] = [];
        assert_eq!(weighted_index(&empty, |w| *w, &mut rng), None);
        assert_eq!(weighted_index(&[0.0, 0.0], |w| *w, &mut rng), None);
    }

    #[test]
    fn test_weighted_index_draw_at_upper_bound() {
        // A source that returns exactly 1.0 would overflow the last band.
        struct One;
        impl RandomSource for One {
            fn next_f64(&mut self) -> f64 {
                1.0
            }
        }
        assert_eq!(weighted_index(&[5.0, 5.0], |w| *w, &mut One), Some(1));
    }

    #[test]
    fn test_fate_distribution() {
        let catalog = EffectCatalog::standard();
        let weights: Vec<f64> = catalog.fate.iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![5.0, 5.0, 15.0, 10.0, 15.0, 10.0, 15.0, 5.0, 10.0, 10.0]);

        let total: f64 = weights.iter().sum();
        let draws = 20_000;
        let mut counts = vec![0usize; weights.len()];
        let mut rng = ChaCha12Rng::seed_from_u64(2048);
        for _ in 0..draws {
            let i = weighted_index(&catalog.fate, |e| e.weight, &mut rng).unwrap();
            counts[i] += 1;
        }
        for (i, w) in weights.iter().enumerate() {
            let expected = w / total;
            let observed = counts[i] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.015,
                "entry {i}: expected {expected:.3}, observed {observed:.3}"
            );
        }
    }

    #[test]
    fn test_chance_pool_split() {
        let catalog = EffectCatalog::standard();
        let config = EffectConfig::default();

        // First draw < 0.8 selects the beneficial pool, second picks index 0.
        let mut rng = ScriptedRandom::new(vec![0.1, 0.0]);
        assert_eq!(
            catalog.select(EventChoice::Chance, &config, &mut rng),
            Some(EffectKind::AddTileEqualMax)
        );

        let mut rng = ScriptedRandom::new(vec![0.95, 0.0]);
        assert_eq!(
            catalog.select(EventChoice::Chance, &config, &mut rng),
            Some(EffectKind::HalveSmallSet)
        );
    }

    #[test]
    fn test_add_tile_equal_max() {
        let mut board = sample_board();
        let before = board.tile_count();
        let mut rng = ScriptedRandom::new(vec![0.0]);
        apply(EffectKind::AddTileEqualMax, &mut board, &mut rng);
        assert_eq!(board.tile_count(), before + 1);
        assert_eq!(board.get(Position::new(0, 3)).unwrap().value, 128);
    }

    #[test]
    fn test_double_small_rank() {
        let mut board = sample_board();
        // Index 0 of [2, 4, 8] → doubles both 2s.
        let mut rng = ScriptedRandom::new(vec![0.0]);
        let (text, _) = apply(EffectKind::DoubleSmallRank, &mut board, &mut rng);
        assert_eq!(board.get(Position::new(0, 0)).unwrap().value, 4);
        assert_eq!(board.get(Position::new(2, 3)).unwrap().value, 4);
        assert!(text.contains("2 affected"));
    }

    #[test]
    fn test_double_lowest_tiles() {
        // Only the two 2s hold the lowest value; the 4 and 8 stay put.
        let mut board = sample_board();
        let mut rng = ScriptedRandom::default();
        let (text, _) = apply(EffectKind::DoubleLowestTiles, &mut board, &mut rng);
        assert_eq!(
            board.values(),
            [[4, 4, 8, 0], [16, 32, 0, 0], [64, 0, 0, 4], [0, 0, 0, 128]]
        );
        assert!(text.contains("2 tile(s) of 2"));

        // Four tiles share the lowest value: the first three in row-major order double.
        let mut board = Board::from_values([[8, 4, 16, 4], [4, 0, 0, 0], [0, 0, 4, 0], [0; 4]]);
        apply(EffectKind::DoubleLowestTiles, &mut board, &mut rng);
        assert_eq!(
            board.values(),
            [[8, 8, 16, 8], [8, 0, 0, 0], [0, 0, 4, 0], [0; 4]]
        );

        let mut board = Board::new();
        let (text, _) = apply(EffectKind::DoubleLowestTiles, &mut board, &mut rng);
        assert!(board.is_empty());
        assert!(text.contains("empty"));
    }

    #[test]
    fn test_halving_effects() {
        let mut board = sample_board();
        let mut rng = ScriptedRandom::default();
        apply(EffectKind::HalveBigTiles, &mut board, &mut rng);
        assert_eq!(
            board.values(),
            [[2, 4, 8, 0], [16, 16, 0, 0], [32, 0, 0, 2], [0, 0, 0, 64]]
        );

        let mut board = sample_board();
        apply(EffectKind::HalveAll, &mut board, &mut rng);
        assert_eq!(
            board.values(),
            [[2, 2, 4, 0], [8, 16, 0, 0], [32, 0, 0, 2], [0, 0, 0, 64]]
        );

        let mut board = sample_board();
        apply(EffectKind::HalveSmallSet, &mut board, &mut rng);
        assert_eq!(
            board.values(),
            [[2, 2, 4, 0], [8, 32, 0, 0], [64, 0, 0, 2], [0, 0, 0, 128]]
        );
    }

    #[test]
    fn test_halve_one_max_picks_one() {
        let mut board = Board::from_values([[64, 0, 0, 64], [0; 4], [0; 4], [0; 4]]);
        let mut rng = ScriptedRandom::new(vec![0.9]);
        apply(EffectKind::HalveOneMax, &mut board, &mut rng);
        assert_eq!(board.row_values(0), [64, 0, 0, 32]);
    }

    #[test]
    fn test_all_become_min_and_max() {
        let mut board = sample_board();
        let mut rng = ScriptedRandom::default();
        apply(EffectKind::AllBecomeMin, &mut board, &mut rng);
        assert!(board.tiles().all(|(_, t)| t.value == 2));

        let mut board = sample_board();
        apply(EffectKind::AllBecomeMax, &mut board, &mut rng);
        assert!(board.tiles().all(|(_, t)| t.value == 128));
        assert_eq!(board.tile_count(), 8);
    }

    #[test]
    fn test_clear_row_drops_tiles() {
        let mut board = sample_board();
        let ids_before: Vec<_> = board.tiles().map(|(_, t)| t.id).collect();
        // 0.3 * 4 → row index 1
        let mut rng = ScriptedRandom::new(vec![0.3]);
        let (text, _) = apply(EffectKind::ClearRow, &mut board, &mut rng);
        assert_eq!(board.row_values(1), [0, 0, 0, 0]);
        assert_eq!(board.tile_count(), ids_before.len() - 2);
        assert!(text.contains("2 tile(s)"));
    }

    #[test]
    fn test_spawn_2048_on_full_board_overwrites() {
        let mut board = Board::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut rng = ScriptedRandom::new(vec![0.0]);
        apply(EffectKind::Spawn2048, &mut board, &mut rng);
        assert_eq!(board.get(Position::new(0, 0)).unwrap().value, 2048);
        assert_eq!(board.tile_count(), 16);
        assert_eq!(board.next_tile_id().as_u32(), 17);
    }

    #[test]
    fn test_random_factor() {
        let mut board = sample_board();
        // Index 2 → ×4
        let mut rng = ScriptedRandom::new(vec![0.9]);
        let (text, _) = apply(EffectKind::RandomFactor, &mut board, &mut rng);
        assert!(text.contains("×4"));
        assert_eq!(board.max_value(), 512);
    }

    #[test]
    fn test_random_factor_clamps_huge_tiles() {
        let big = 1u32 << 30;
        let mut board = Board::from_values([[big, big, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let mut rng = ScriptedRandom::new(vec![0.9]);
        apply(EffectKind::RandomFactor, &mut board, &mut rng);
        assert_eq!(board.row_values(0), [MAX_TILE_VALUE, MAX_TILE_VALUE, 0, 0]);

        // Clamped tiles slide without merging or overflowing.
        let outcome = board.slide(crate::core::Direction::Right);
        assert_eq!(outcome.gained, 0);
        assert_eq!(board.row_values(0), [0, 0, MAX_TILE_VALUE, MAX_TILE_VALUE]);
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_blind_effects() {
        let mut board = sample_board();
        let mut rng = ScriptedRandom::default();
        let (_, blind) = apply(EffectKind::BlindMode, &mut board, &mut rng);
        assert!(blind.active);
        assert_eq!(blind.moves_remaining, 5);

        let (_, blind) = apply(EffectKind::ShortBlind, &mut board, &mut rng);
        assert_eq!(blind.moves_remaining, SHORT_BLIND_MOVES);
        assert_eq!(board, sample_board());
    }

    #[test]
    fn test_every_effect_keeps_board_consistent() {
        let kinds = [
            EffectKind::AddTileEqualMax,
            EffectKind::DoubleSmallRank,
            EffectKind::SpawnLowTiles,
            EffectKind::DoubleLowestTiles,
            EffectKind::AllBecomeMax,
            EffectKind::Spawn2048,
            EffectKind::HalveOneMax,
            EffectKind::HalveSmallSet,
            EffectKind::HalveBigTiles,
            EffectKind::HalveAll,
            EffectKind::RandomFactor,
            EffectKind::AllBecomeMin,
            EffectKind::ShuffleBoard,
            EffectKind::ClearRow,
            EffectKind::BlindMode,
            EffectKind::ShortBlind,
            EffectKind::Nothing,
        ];
        let mut rng = ScriptedRandom::new(vec![0.42, 0.13, 0.77, 0.58]);
        for kind in kinds {
            let mut board = sample_board();
            apply(kind, &mut board, &mut rng);
            let mut empty = Board::new();
            apply(kind, &mut empty, &mut rng);
        }
    }
}
