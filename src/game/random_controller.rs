//! Random AI controller for testing and baseline gameplay
//!
//! Picks uniformly among the directions that change the board and flips a
//! coin for events. Serves as a baseline for smarter controllers.

use crate::core::{Direction, EventChoice};
use crate::game::controller::{GameView, PlayerController};
use crate::game::events::PendingEvent;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// A controller that makes random choices
///
/// Serializable so its RNG position survives snapshot/resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomController {
    rng: Xoshiro256PlusPlus,
}

impl RandomController {
    /// Create a random controller with a seeded RNG (for deterministic runs)
    pub fn with_seed(seed: u64) -> Self {
        RandomController {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl PlayerController for RandomController {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, view: &GameView) -> Option<Direction> {
        let legal = view.legal_moves();
        if legal.is_empty() {
            return None;
        }
        let dir = legal[self.rng.gen_range(0..legal.len())];
        view.logger().controller_choice(self.name(), &format!("chose {dir}"));
        Some(dir)
    }

    fn choose_event(&mut self, view: &GameView, _event: &PendingEvent) -> Option<EventChoice> {
        let choice = if self.rng.gen_bool(0.5) {
            EventChoice::Chance
        } else {
            EventChoice::Fate
        };
        view.logger().controller_choice(self.name(), &format!("chose {choice}"));
        Some(choice)
    }
}
