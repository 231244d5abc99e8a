//! Event trigger policy
//!
//! After every completed move the policy decides whether a Chance/Fate event
//! interrupts play. The state machine has two states: idle, and active while
//! a `PendingEvent` waits for the player's choice. Only `Game::resolve_event`
//! moves it back to idle.

use crate::core::{is_power_of_two, RandomSource};
use crate::game::config::{EventConfig, TriggerMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An event waiting for the player to pick Chance or Fate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEvent {
    /// Board maximum that fired the event
    pub trigger_value: u32,
    /// Move count at which it fired
    pub move_index: u32,
}

/// Bookkeeping the policy carries between moves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPolicyState {
    /// Maxima already used to fire (once-per-value modes)
    pub triggered_values: BTreeSet<u32>,
    /// Move count of the last fired event
    pub last_event_move: Option<u32>,
    /// Highest maximum seen by `EveryIncrement`, lowered when the board max drops
    pub last_max_seen: u32,
    /// Every maximum that fired under `EveryIncrement`
    pub history: Vec<u32>,
}

impl EventPolicyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// At least `cooldown` moves since the last event (always true before the first)
    pub fn cooldown_elapsed(&self, move_count: u32, cooldown: u32) -> bool {
        match self.last_event_move {
            Some(last) => move_count.saturating_sub(last) >= cooldown,
            None => true,
        }
    }

    /// Trigger-mode predicate
    ///
    /// Accepting a value records it, so once-per-value modes never accept the
    /// same maximum twice.
    pub fn accepts(&mut self, max_tile: u32, mode: TriggerMode) -> bool {
        match mode {
            TriggerMode::EachMax => self.triggered_values.insert(max_tile),
            TriggerMode::PowerOfTwo => is_power_of_two(max_tile) && self.triggered_values.insert(max_tile),
            TriggerMode::MultipleOf8 => max_tile % 8 == 0 && self.triggered_values.insert(max_tile),
            TriggerMode::EveryIncrement => {
                if max_tile > self.last_max_seen {
                    self.last_max_seen = max_tile;
                    self.history.push(max_tile);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Decide whether an event fires after a completed move
    ///
    /// The mode predicate runs before the probability gate, so a maximum that
    /// loses the draw is still consumed.
    pub fn evaluate<R: RandomSource + ?Sized>(
        &mut self,
        event_active: bool,
        move_count: u32,
        max_tile: u32,
        config: &EventConfig,
        rng: &mut R,
    ) -> Option<PendingEvent> {
        if event_active {
            return None;
        }

        // Follow the board down so a revisited maximum counts as an increase again.
        if max_tile < self.last_max_seen {
            self.last_max_seen = max_tile;
        }

        if !self.cooldown_elapsed(move_count, config.cooldown) {
            return None;
        }
        if max_tile < config.min_trigger_value {
            return None;
        }
        if config.powers_only && !is_power_of_two(max_tile) {
            return None;
        }
        if !self.accepts(max_tile, config.trigger_mode) {
            return None;
        }
        if config.probability < 1.0 && !rng.chance(config.probability) {
            return None;
        }

        self.last_event_move = Some(move_count);
        Some(PendingEvent {
            trigger_value: max_tile,
            move_index: move_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScriptedRandom;

    fn config(mode: TriggerMode) -> EventConfig {
        EventConfig {
            trigger_mode: mode,
            ..EventConfig::default()
        }
    }

    #[test]
    fn test_below_threshold_never_fires() {
        let mut policy = EventPolicyState::new();
        let mut rng = ScriptedRandom::default();
        assert!(policy
            .evaluate(false, 5, 4, &config(TriggerMode::EachMax), &mut rng)
            .is_none());
        assert!(policy.triggered_values.is_empty());
    }

    #[test]
    fn test_each_max_fires_once_per_value() {
        let cfg = config(TriggerMode::EachMax);
        let mut policy = EventPolicyState::new();
        let mut rng = ScriptedRandom::default();

        let event = policy.evaluate(false, 10, 8, &cfg, &mut rng).unwrap();
        assert_eq!(event.trigger_value, 8);
        assert_eq!(event.move_index, 10);
        assert_eq!(policy.last_event_move, Some(10));

        // Max dropped to 4 and came back to 8: no second event.
        assert!(policy.evaluate(false, 20, 4, &cfg, &mut rng).is_none());
        assert!(policy.evaluate(false, 30, 8, &cfg, &mut rng).is_none());

        assert!(policy.evaluate(false, 40, 16, &cfg, &mut rng).is_some());
    }

    #[test]
    fn test_every_increment_refires_on_revisit() {
        let cfg = config(TriggerMode::EveryIncrement);
        let mut policy = EventPolicyState::new();
        let mut rng = ScriptedRandom::default();

        assert!(policy.evaluate(false, 10, 8, &cfg, &mut rng).is_some());
        assert!(policy.evaluate(false, 20, 8, &cfg, &mut rng).is_none());

        // A halving effect dropped the max to 4; reaching 8 again fires.
        assert!(policy.evaluate(false, 30, 4, &cfg, &mut rng).is_none());
        assert!(policy.evaluate(false, 40, 8, &cfg, &mut rng).is_some());
        assert_eq!(policy.history, vec![8, 8]);
    }

    #[test]
    fn test_cooldown() {
        let cfg = config(TriggerMode::EachMax);
        let mut policy = EventPolicyState::new();
        let mut rng = ScriptedRandom::default();

        assert!(policy.evaluate(false, 3, 8, &cfg, &mut rng).is_some());
        // One move later a new max shows up, but the cooldown blocks it.
        assert!(policy.evaluate(false, 4, 16, &cfg, &mut rng).is_none());
        assert!(!policy.triggered_values.contains(&16));
        assert!(policy.evaluate(false, 5, 16, &cfg, &mut rng).is_some());
    }

    #[test]
    fn test_active_event_blocks_trigger() {
        let cfg = config(TriggerMode::EachMax);
        let mut policy = EventPolicyState::new();
        let mut rng = ScriptedRandom::default();
        assert!(policy.evaluate(true, 10, 8, &cfg, &mut rng).is_none());
        assert!(policy.triggered_values.is_empty());
    }

    #[test]
    fn test_mode_filters() {
        let mut rng = ScriptedRandom::default();

        let mut policy = EventPolicyState::new();
        let cfg = config(TriggerMode::MultipleOf8);
        assert!(policy.evaluate(false, 10, 12, &cfg, &mut rng).is_none());
        assert!(policy.evaluate(false, 20, 24, &cfg, &mut rng).is_some());

        let mut policy = EventPolicyState::new();
        let cfg = config(TriggerMode::PowerOfTwo);
        assert!(policy.evaluate(false, 10, 24, &cfg, &mut rng).is_none());
        assert!(policy.evaluate(false, 20, 32, &cfg, &mut rng).is_some());

        let mut policy = EventPolicyState::new();
        let cfg = EventConfig {
            powers_only: true,
            ..config(TriggerMode::EachMax)
        };
        assert!(policy.evaluate(false, 10, 12, &cfg, &mut rng).is_none());
        assert!(!policy.triggered_values.contains(&12));
    }

    #[test]
    fn test_probability_gate_consumes_value() {
        let cfg = EventConfig {
            probability: 0.5,
            ..config(TriggerMode::EachMax)
        };
        let mut policy = EventPolicyState::new();
        let mut rng = ScriptedRandom::new(vec![0.9]);

        assert!(policy.evaluate(false, 10, 8, &cfg, &mut rng).is_none());
        assert!(policy.triggered_values.contains(&8));
        assert_eq!(policy.last_event_move, None);

        let mut rng = ScriptedRandom::new(vec![0.1]);
        assert!(policy.evaluate(false, 11, 8, &cfg, &mut rng).is_none());
        assert!(policy.evaluate(false, 12, 16, &cfg, &mut rng).is_some());
    }
}
