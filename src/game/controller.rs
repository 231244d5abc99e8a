//! Player controller trait and game view
//!
//! The game loop asks a controller for a direction after every move and for
//! a Chance/Fate choice while an event is pending. Controllers only ever see
//! a read-only `GameView`.

use crate::core::{Board, Direction, EventChoice};
use crate::game::config::GameConfig;
use crate::game::events::PendingEvent;
use crate::game::logger::GameLogger;
use crate::game::state::{BoardSnapshot, EffectApplied, GameOutcome, GameState};
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// One player input: a slide or an event choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerInput {
    Move(Direction),
    Choose(EventChoice),
}

impl fmt::Display for PlayerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerInput::Move(dir) => f.write_str(dir.name()),
            PlayerInput::Choose(choice) => f.write_str(&choice.name().to_lowercase()),
        }
    }
}

impl FromStr for PlayerInput {
    type Err = GameError;

    /// Direction spellings first (names, l/r/u, WASD), then event choices
    fn from_str(s: &str) -> Result<Self> {
        if let Ok(dir) = s.parse::<Direction>() {
            return Ok(PlayerInput::Move(dir));
        }
        s.parse::<EventChoice>()
            .map(PlayerInput::Choose)
            .map_err(|_| GameError::InvalidInput(format!("'{s}' is neither a direction nor an event choice")))
    }
}

/// Parse a whitespace or comma separated input script, e.g. `"l l u chance r"`
pub fn parse_inputs(script: &str) -> Result<Vec<PlayerInput>> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}

/// Render inputs in the script form `parse_inputs` reads back
pub fn format_inputs(inputs: &[PlayerInput]) -> String {
    inputs.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

/// Read-only view of a game for controllers
pub struct GameView<'a> {
    state: &'a GameState,
    config: &'a GameConfig,
    logger: &'a GameLogger,
}

impl<'a> GameView<'a> {
    pub fn new(state: &'a GameState, config: &'a GameConfig, logger: &'a GameLogger) -> Self {
        GameView { state, config, logger }
    }

    /// Full board, hidden values included
    ///
    /// AI controllers read through blind mode; human-facing code should use
    /// `snapshot()` instead.
    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_state(self.state)
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn best(&self) -> u64 {
        self.state.best
    }

    pub fn move_count(&self) -> u32 {
        self.state.move_count
    }

    pub fn max_tile(&self) -> u32 {
        self.state.max_tile()
    }

    pub fn is_blind(&self) -> bool {
        self.state.blind.active
    }

    pub fn pending_event(&self) -> Option<PendingEvent> {
        self.state.pending_event
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.state.outcome
    }

    pub fn config(&self) -> &GameConfig {
        self.config
    }

    pub fn logger(&self) -> &GameLogger {
        self.logger
    }

    /// Directions that would change the board
    pub fn legal_moves(&self) -> SmallVec<[Direction; 4]> {
        Direction::ALL
            .into_iter()
            .filter(|&dir| self.state.board.preview(dir).1.moved)
            .collect()
    }
}

/// Player controller trait
///
/// Implement this to create AI players or connect a UI. Returning `None`
/// from either choice method stops the game loop.
pub trait PlayerController {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Pick the next slide
    fn choose_move(&mut self, view: &GameView) -> Option<Direction>;

    /// Pick Chance or Fate for the pending event
    fn choose_event(&mut self, view: &GameView, event: &PendingEvent) -> Option<EventChoice>;

    /// Called after an event resolved
    fn on_effect(&mut self, _view: &GameView, _effect: &EffectApplied) {}

    /// Called when the game loop finishes
    fn on_game_end(&mut self, _view: &GameView, _outcome: Option<GameOutcome>) {}
}
