//! Fixed script controller for deterministic testing and replay
//!
//! Follows a predetermined list of inputs. Once the script is exhausted the
//! controller returns `None` and the game loop stops.

use crate::core::{Direction, EventChoice};
use crate::game::controller::{GameView, PlayerController, PlayerInput};
use crate::game::events::PendingEvent;

/// A controller that follows a fixed script of inputs
///
/// Entries of the wrong kind (a Chance/Fate where a move is expected, or the
/// reverse) are skipped. Serializable so the script position can be saved in
/// snapshots.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FixedScriptController {
    script: Vec<PlayerInput>,
    /// Current position in the script
    pub current_index: usize,
}

impl FixedScriptController {
    pub fn new(script: Vec<PlayerInput>) -> Self {
        FixedScriptController {
            script,
            current_index: 0,
        }
    }

    /// Inputs not consumed yet
    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.current_index)
    }

    fn next_matching<T>(&mut self, view: &GameView, pick: impl Fn(PlayerInput) -> Option<T>) -> Option<T> {
        while let Some(&input) = self.script.get(self.current_index) {
            self.current_index += 1;
            if let Some(value) = pick(input) {
                return Some(value);
            }
            view.logger()
                .verbose(&format!("script: skipped '{input}' at position {}", self.current_index - 1));
        }
        None
    }
}

impl PlayerController for FixedScriptController {
    fn name(&self) -> &str {
        "fixed"
    }

    fn choose_move(&mut self, view: &GameView) -> Option<Direction> {
        let dir = self.next_matching(view, |input| match input {
            PlayerInput::Move(dir) => Some(dir),
            PlayerInput::Choose(_) => None,
        })?;
        view.logger().controller_choice(self.name(), &format!("chose {dir}"));
        Some(dir)
    }

    fn choose_event(&mut self, view: &GameView, _event: &PendingEvent) -> Option<EventChoice> {
        let choice = self.next_matching(view, |input| match input {
            PlayerInput::Choose(choice) => Some(choice),
            PlayerInput::Move(_) => None,
        })?;
        view.logger().controller_choice(self.name(), &format!("chose {choice}"));
        Some(choice)
    }
}
