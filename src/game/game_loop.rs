//! Game loop implementation
//!
//! Drives a `Game` with a `PlayerController` until the game ends, the
//! controller stops, or a move limit is reached.

use crate::core::RandomSource;
use crate::game::controller::{GameView, PlayerController};
use crate::game::logger::VerbosityLevel;
use crate::game::state::{Game, GameOutcome};
use crate::game::state_hash::{compute_state_hash, format_hash};
use crate::store::BestScoreStore;
use crate::Result;
use rand_chacha::ChaCha12Rng;

/// Result of running the loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Set only if the game itself ended
    pub outcome: Option<GameOutcome>,
    pub end_reason: GameEndReason,
    pub score: u64,
    pub best: u64,
    /// Completed moves over the whole game (resumed moves included)
    pub moves_played: u32,
    pub max_tile: u32,
    /// Events resolved during this run
    pub events_resolved: u32,
}

/// Reason the loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// A tile reached the win value
    Won,
    /// The board locked up
    NoMoves,
    /// Hit the configured move limit
    MaxMoves,
    /// The controller returned no input (quit or script exhausted)
    ControllerStopped,
    /// Paused after the requested number of moves, e.g. to write a snapshot
    StopRequested,
    /// Too many ignored inputs in a row
    Stalled,
}

impl From<GameOutcome> for GameEndReason {
    fn from(outcome: GameOutcome) -> Self {
        match outcome {
            GameOutcome::Won => GameEndReason::Won,
            GameOutcome::NoMoves => GameEndReason::NoMoves,
        }
    }
}

/// Game loop manager
pub struct GameLoop<'a, R: RandomSource = ChaCha12Rng> {
    pub game: &'a mut Game<R>,
    /// Total completed moves after which the game is cut off
    max_moves: u32,
    /// Completed moves in this run after which the loop pauses
    stop_after: Option<u32>,
    /// Consecutive ignored inputs tolerated before giving up
    max_idle_inputs: u32,
    best_store: Option<&'a mut dyn BestScoreStore>,
    moves_this_run: u32,
    events_resolved: u32,
}

impl<'a, R: RandomSource> GameLoop<'a, R> {
    pub fn new(game: &'a mut Game<R>) -> Self {
        GameLoop {
            game,
            max_moves: 100_000,
            stop_after: None,
            max_idle_inputs: 1_000,
            best_store: None,
            moves_this_run: 0,
            events_resolved: 0,
        }
    }

    pub fn with_max_moves(mut self, max_moves: u32) -> Self {
        self.max_moves = max_moves;
        self
    }

    /// Pause after `moves` completed moves in this run
    pub fn with_stop_after(mut self, moves: u32) -> Self {
        self.stop_after = Some(moves);
        self
    }

    pub fn with_max_idle_inputs(mut self, inputs: u32) -> Self {
        self.max_idle_inputs = inputs;
        self
    }

    /// Persist the best score whenever a move raises it
    pub fn with_best_store(mut self, store: &'a mut dyn BestScoreStore) -> Self {
        self.best_store = Some(store);
        self
    }

    /// Set verbosity on the game's logger, which controllers also use
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    fn view(&self) -> GameView<'_> {
        GameView::new(&self.game.state, &self.game.config, &self.game.logger)
    }

    /// Run until the game ends or the loop is cut off
    pub fn run_game(&mut self, controller: &mut dyn PlayerController) -> Result<GameResult> {
        let mut idle = 0u32;

        let end_reason = loop {
            if let Some(outcome) = self.game.state.outcome {
                break GameEndReason::from(outcome);
            }
            if self.game.state.move_count >= self.max_moves {
                break GameEndReason::MaxMoves;
            }
            if self.stop_after.is_some_and(|n| self.moves_this_run >= n) {
                break GameEndReason::StopRequested;
            }

            if let Some(event) = self.game.event_pending() {
                let Some(choice) = controller.choose_event(&self.view(), &event) else {
                    break GameEndReason::ControllerStopped;
                };
                if let Some(applied) = self.game.resolve_event(choice) {
                    self.events_resolved += 1;
                    controller.on_effect(&self.view(), &applied);
                }
                continue;
            }

            let Some(dir) = controller.choose_move(&self.view()) else {
                break GameEndReason::ControllerStopped;
            };
            let result = self.game.apply_move(dir);
            if !result.moved {
                idle += 1;
                if idle >= self.max_idle_inputs {
                    break GameEndReason::Stalled;
                }
                continue;
            }
            idle = 0;
            self.moves_this_run += 1;

            if result.best_improved {
                if let Some(store) = self.best_store.as_deref_mut() {
                    store.save(self.game.state.best)?;
                }
            }
            if self.game.logger.debug_state_hash_enabled() {
                eprintln!(
                    "  [hash {}] after move {}",
                    format_hash(compute_state_hash(&self.game.state)),
                    self.game.state.move_count
                );
            }
        };

        if self.game.state.outcome.is_none() {
            self.game.logger.normal(&format!(
                "Stopped ({end_reason:?}) after {} moves with score {}.",
                self.game.state.move_count, self.game.state.score
            ));
        }
        controller.on_game_end(&self.view(), self.game.state.outcome);

        Ok(GameResult {
            outcome: self.game.state.outcome,
            end_reason,
            score: self.game.state.score,
            best: self.game.state.best,
            moves_played: self.game.state.move_count,
            max_tile: self.game.state.max_tile(),
            events_resolved: self.events_resolved,
        })
    }
}
