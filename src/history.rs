//! Action log for replay and auditing
//!
//! Every state change a game makes is appended here. The player inputs it
//! contains are enough to replay a seeded game exactly.

use crate::core::{Direction, EventChoice, Position, Tile};
use crate::game::controller::PlayerInput;
use crate::game::effects::EffectKind;
use serde::{Deserialize, Serialize};

/// Atomic game actions in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameAction {
    /// A slide that changed the board
    Move {
        direction: Direction,
        gained: u64,
        merges: u8,
    },

    /// A tile appeared on an empty cell
    Spawn { position: Position, tile: Tile },

    /// The event policy fired
    EventTriggered { trigger_value: u32, move_index: u32 },

    /// A pending event was resolved
    EffectApplied { choice: EventChoice, effect: EffectKind },

    /// The game ended
    GameOver { score: u64, move_count: u32 },
}

/// Append-only log of game actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    /// Most recent at end
    actions: Vec<GameAction>,

    /// Disabled logs drop everything (simulation runs)
    enabled: bool,
}

impl ActionLog {
    pub fn new() -> Self {
        ActionLog {
            actions: Vec::new(),
            enabled: true,
        }
    }

    /// Create a disabled log (for batch simulation and benchmarks)
    pub fn disabled() -> Self {
        ActionLog {
            actions: Vec::new(),
            enabled: false,
        }
    }

    pub fn log(&mut self, action: GameAction) {
        if self.enabled {
            self.actions.push(action);
        }
    }

    /// Get the most recent action without removing it
    pub fn peek(&self) -> Option<&GameAction> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn actions(&self) -> &[GameAction] {
        &self.actions
    }

    /// Player inputs that produced this log, in order
    ///
    /// Only board-changing moves are logged, so ignored inputs never show up.
    pub fn inputs(&self) -> Vec<PlayerInput> {
        self.actions
            .iter()
            .filter_map(|action| match action {
                GameAction::Move { direction, .. } => Some(PlayerInput::Move(*direction)),
                GameAction::EffectApplied { choice, .. } => Some(PlayerInput::Choose(*choice)),
                _ => None,
            })
            .collect()
    }

    /// Number of events triggered so far
    pub fn event_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, GameAction::EventTriggered { .. }))
            .count()
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}
