//! Interactive controller for human players
//!
//! Reads moves from a line-based input (stdin by default) and prints the
//! board snapshot, so blind mode hides values from the player too.

use crate::core::{Direction, EventChoice};
use crate::game::controller::{GameView, PlayerController};
use crate::game::events::PendingEvent;
use crate::game::state::{EffectApplied, GameOutcome};
use std::io::{self, BufRead, Write};

/// A controller that prompts a human player for decisions
pub struct InteractiveController {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

impl InteractiveController {
    /// Read from stdin, write to stdout
    pub fn new() -> Self {
        Self::with_io(Box::new(io::BufReader::new(io::stdin())), Box::new(io::stdout()))
    }

    pub fn with_io(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        InteractiveController { input, output }
    }

    /// Prompt until `parse` accepts a line; None on EOF or quit
    fn prompt<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        loop {
            let _ = write!(self.output, "{prompt} ");
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error reading input: {e}");
                    return None;
                }
            }

            let trimmed = line.trim();
            match trimmed {
                "" => continue,
                "q" | "quit" => return None,
                "?" | "help" => {
                    self.display_help();
                    continue;
                }
                _ => {}
            }
            match parse(trimmed) {
                Some(value) => return Some(value),
                None => {
                    let _ = writeln!(self.output, "Didn't understand '{trimmed}'. Type ? for help.");
                }
            }
        }
    }

    fn display_help(&mut self) {
        let _ = writeln!(self.output, "\n=== Help ===");
        let _ = writeln!(self.output, "  w/a/s/d or up/left/down/right - slide the board");
        let _ = writeln!(self.output, "  c / 1 - Chance (mostly helpful)");
        let _ = writeln!(self.output, "  f / 2 - Fate (risky)");
        let _ = writeln!(self.output, "  q     - quit");
    }
}

impl Default for InteractiveController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerController for InteractiveController {
    fn name(&self) -> &str {
        "human"
    }

    fn choose_move(&mut self, view: &GameView) -> Option<Direction> {
        let _ = write!(self.output, "\n{}", view.snapshot());
        self.prompt("Move (w/a/s/d, ? for help):", |s| s.parse::<Direction>().ok())
    }

    fn choose_event(&mut self, view: &GameView, event: &PendingEvent) -> Option<EventChoice> {
        let _ = write!(self.output, "\n{}", view.snapshot());
        let _ = writeln!(
            self.output,
            "Event! New max tile {}. [1] Chance  [2] Fate",
            event.trigger_value
        );
        self.prompt("Choose:", |s| s.parse::<EventChoice>().ok())
    }

    fn on_effect(&mut self, _view: &GameView, effect: &EffectApplied) {
        let _ = writeln!(self.output, "{}: {}", effect.choice, effect.description);
    }

    fn on_game_end(&mut self, view: &GameView, outcome: Option<GameOutcome>) {
        let _ = write!(self.output, "\n{}", view.snapshot());
        match outcome {
            Some(outcome) => {
                let _ = writeln!(self.output, "{outcome}! Final score {}.", view.score());
            }
            None => {
                let _ = writeln!(self.output, "Stopped with score {}.", view.score());
            }
        }
    }
}
