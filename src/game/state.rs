//! Main game state structure

use crate::core::{Board, CellChange, EventChoice, MergedPositions, Position, RandomSource, Tile, TileId, SIZE};
use crate::game::config::GameConfig;
use crate::game::effects::{EffectCatalog, EffectKind};
use crate::game::events::{EventPolicyState, PendingEvent};
use crate::game::logger::GameLogger;
use crate::history::ActionLog;
use crate::{GameError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// A tile reached the win value (win check enabled)
    Won,
    /// Board full with no equal neighbours
    NoMoves,
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Won => f.write_str("You win"),
            GameOutcome::NoMoves => f.write_str("Game Over"),
        }
    }
}

/// Presentation-only flag hiding tile values for a number of moves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindMode {
    pub active: bool,
    pub moves_remaining: u32,
}

impl BlindMode {
    pub fn activate(&mut self, moves: u32) {
        self.active = moves > 0;
        self.moves_remaining = moves;
    }

    /// Count down one completed move; returns true when blind mode just ended
    pub fn tick(&mut self) -> bool {
        if self.moves_remaining == 0 {
            return false;
        }
        self.moves_remaining -= 1;
        if self.moves_remaining == 0 {
            self.active = false;
            return true;
        }
        false
    }
}

/// Complete state of one game
///
/// Pure data: everything needed to resume a session. Randomness, logging and
/// the action log live on `Game`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub score: u64,
    /// Best score across sessions; never decreases
    pub best: u64,
    /// Completed (board-changing) moves
    pub move_count: u32,
    /// Set once the game is over
    pub outcome: Option<GameOutcome>,
    /// Set while an event waits for Chance/Fate
    pub pending_event: Option<PendingEvent>,
    pub blind: BlindMode,
    pub policy: EventPolicyState,
    /// Endless mode: the win tile has already been announced
    #[serde(default)]
    pub win_announced: bool,
}

impl GameState {
    /// Empty board, zero score, carrying over `best`
    pub fn new(best: u64) -> Self {
        GameState {
            board: Board::new(),
            score: 0,
            best,
            move_count: 0,
            outcome: None,
            pending_event: None,
            blind: BlindMode::default(),
            policy: EventPolicyState::new(),
            win_announced: false,
        }
    }

    /// Wrap an existing board (scenarios and tests)
    pub fn with_board(board: Board, best: u64) -> Self {
        GameState {
            board,
            ..GameState::new(best)
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_event_active(&self) -> bool {
        self.pending_event.is_some()
    }

    pub fn max_tile(&self) -> u32 {
        self.board.max_value()
    }

    /// Add to the score and raise `best` if needed; returns true if best moved
    pub fn record_score(&mut self, gained: u64) -> bool {
        self.score += gained;
        if self.score > self.best {
            self.best = self.score;
            return true;
        }
        false
    }

    /// Structural invariants: board consistency and `best >= score`
    pub fn validate(&self) -> Result<()> {
        self.board.validate()?;
        if self.best < self.score {
            return Err(GameError::InvalidBoard(format!(
                "best score {} is below current score {}",
                self.best, self.score
            )));
        }
        Ok(())
    }
}

/// What a call to `Game::apply_move` did
#[derive(Debug, Clone, PartialEq)]
pub struct MoveResult {
    /// False for no-op moves and ignored input; nothing else changed then
    pub moved: bool,
    pub score_delta: u64,
    pub merged_positions: MergedPositions,
    /// Board maximum after the move (spawn included)
    pub new_max_tile: u32,
    pub spawned: Option<(Position, Tile)>,
    pub event_triggered: Option<PendingEvent>,
    pub best_improved: bool,
    pub game_over: bool,
}

impl MoveResult {
    /// Result for an input that changed nothing
    pub fn unchanged(state: &GameState) -> Self {
        MoveResult {
            moved: false,
            score_delta: 0,
            merged_positions: MergedPositions::new(),
            new_max_tile: state.max_tile(),
            spawned: None,
            event_triggered: None,
            best_improved: false,
            game_over: state.is_game_over(),
        }
    }
}

/// What resolving an event did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectApplied {
    pub choice: EventChoice,
    pub id: EffectKind,
    pub description: String,
    pub board_delta: Vec<CellChange>,
}

/// A tile as the renderer may see it (`value` is hidden in blind mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub id: TileId,
    pub value: Option<u32>,
}

/// Read-only snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Row-major, `SIZE * SIZE` entries
    pub cells: Vec<Option<TileView>>,
    pub score: u64,
    pub best: u64,
    pub move_count: u32,
    pub game_over: bool,
    pub outcome: Option<GameOutcome>,
    pub event_active: bool,
    pub pending_event: Option<PendingEvent>,
    pub blind: BlindMode,
}

impl BoardSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let hide = state.blind.active;
        let cells = state
            .board
            .cells()
            .map(|(_, cell)| {
                cell.map(|t| TileView {
                    id: t.id,
                    value: if hide { None } else { Some(t.value) },
                })
            })
            .collect();
        BoardSnapshot {
            cells,
            score: state.score,
            best: state.best,
            move_count: state.move_count,
            game_over: state.is_game_over(),
            outcome: state.outcome,
            event_active: state.is_event_active(),
            pending_event: state.pending_event,
            blind: state.blind,
        }
    }

    pub fn cell(&self, pos: Position) -> Option<TileView> {
        self.cells[pos.row * SIZE + pos.col]
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}  Best: {}  Moves: {}", self.score, self.best, self.move_count)?;
        for row in self.cells.chunks(SIZE) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    None => format!("{:>5}", "."),
                    Some(TileView { value: None, .. }) => format!("{:>5}", "?"),
                    Some(TileView { value: Some(v), .. }) => format!("{v:>5}"),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        if self.blind.active {
            writeln!(f, "Blind mode: {} moves left.", self.blind.moves_remaining)?;
        }
        Ok(())
    }
}

/// A game session: state plus the collaborators that act on it
///
/// `R` is the randomness source. Games default to a seeded, serializable
/// `ChaCha12Rng`; tests plug in `ScriptedRandom` to force outcomes.
pub struct Game<R: RandomSource = ChaCha12Rng> {
    pub state: GameState,
    pub config: GameConfig,
    pub catalog: EffectCatalog,
    pub(crate) rng: R,
    /// Log of everything that happened this game
    pub action_log: ActionLog,
    /// Centralized logger for game events
    pub logger: GameLogger,
}

impl<R: RandomSource> fmt::Debug for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("actions", &self.action_log.len())
            .finish_non_exhaustive()
    }
}

impl Game<ChaCha12Rng> {
    /// Fresh game seeded from `seed`
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Game::with_rng(config, ChaCha12Rng::seed_from_u64(seed), 0)
    }

    /// Fresh game carrying over a persisted best score
    pub fn with_best(config: GameConfig, seed: u64, best: u64) -> Self {
        Game::with_rng(config, ChaCha12Rng::seed_from_u64(seed), best)
    }
}

impl<R: RandomSource> Game<R> {
    /// Fresh game using `rng`, seeded with two random tiles
    pub fn with_rng(config: GameConfig, rng: R, best: u64) -> Self {
        let mut game = Game::from_state(GameState::new(best), config, rng);
        game.seed_tiles();
        game
    }

    /// Wrap an existing state without touching the board
    pub fn from_state(state: GameState, config: GameConfig, rng: R) -> Self {
        Game {
            state,
            config,
            catalog: EffectCatalog::standard(),
            rng,
            action_log: ActionLog::new(),
            logger: GameLogger::new(),
        }
    }

    /// Replace the effect pools
    pub fn with_catalog(mut self, catalog: EffectCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_logger(mut self, logger: GameLogger) -> Self {
        self.logger = logger;
        self
    }

    fn seed_tiles(&mut self) {
        for _ in 0..2 {
            let spawned = self
                .state
                .board
                .spawn_random(&mut self.rng, self.config.spawn_four_probability);
            if let Some((position, tile)) = spawned {
                self.action_log
                    .log(crate::history::GameAction::Spawn { position, tile });
            }
        }
    }

    /// Start over: fresh board with two tiles, best score kept
    pub fn reset(&mut self) -> &GameState {
        self.state = GameState::new(self.state.best);
        self.action_log.clear();
        self.seed_tiles();
        self.logger.verbose("New game.");
        &self.state
    }

    /// Read-only view for the presentation layer
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_state(&self.state)
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn is_over(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn event_pending(&self) -> Option<PendingEvent> {
        self.state.pending_event
    }
}
