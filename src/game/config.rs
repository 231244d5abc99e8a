//! Game configuration
//!
//! The browser variants of this game disagreed on win/endless mode, trigger
//! policy and probabilities, so all of them are knobs here. Every field has a
//! default, so a JSON config file only needs the fields it overrides.

use crate::core::is_power_of_two;
use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// When a new board maximum is allowed to fire an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerMode {
    /// Once per distinct maximum value ever reached
    #[default]
    EachMax,
    /// Once per distinct power-of-two maximum
    PowerOfTwo,
    /// Once per distinct multiple-of-8 maximum
    MultipleOf8,
    /// Every time the maximum strictly increases, revisits included
    EveryIncrement,
}

impl FromStr for TriggerMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "eachmax" => Ok(TriggerMode::EachMax),
            "poweroftwo" => Ok(TriggerMode::PowerOfTwo),
            "multipleof8" => Ok(TriggerMode::MultipleOf8),
            "everyincrement" => Ok(TriggerMode::EveryIncrement),
            _ => Err(GameError::InvalidConfig(format!(
                "unknown trigger mode '{s}' (expected: each-max, power-of-two, multiple-of-8, every-increment)"
            ))),
        }
    }
}

/// Event trigger policy knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub trigger_mode: TriggerMode,
    /// Probability an accepted trigger actually fires (1.0 = always)
    pub probability: f64,
    /// Minimum completed moves between two events
    pub cooldown: u32,
    /// Board maximum below which no event fires
    pub min_trigger_value: u32,
    /// Only fire on power-of-two maxima, whatever the mode
    pub powers_only: bool,
}

impl Default for EventConfig {
    fn default() -> Self {
        EventConfig {
            trigger_mode: TriggerMode::EachMax,
            probability: 1.0,
            cooldown: 2,
            min_trigger_value: 8,
            powers_only: false,
        }
    }
}

/// Effect catalog knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Probability that Chance draws from the beneficial pool
    pub chance_good_ratio: f64,
    /// Lowest value a halving effect may produce
    pub halving_floor: u32,
    /// Length of the Fate blind mode, in moves
    pub blind_moves: u32,
}

impl Default for EffectConfig {
    fn default() -> Self {
        EffectConfig {
            chance_good_ratio: 0.8,
            halving_floor: 2,
            blind_moves: 5,
        }
    }
}

impl EffectConfig {
    /// Halve `value`, never going below the configured floor
    pub fn halve(&self, value: u32) -> u32 {
        (value / 2).max(self.halving_floor)
    }
}

/// Complete game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// End the game when a tile reaches `win_value` (false = endless mode)
    pub win_enabled: bool,
    pub win_value: u32,
    /// Probability a spawned tile is a 4 instead of a 2
    pub spawn_four_probability: f64,
    pub events: EventConfig,
    pub effects: EffectConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            win_enabled: false,
            win_value: 2048,
            spawn_four_probability: 0.1,
            events: EventConfig::default(),
            effects: EffectConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load a JSON config file; missing fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: GameConfig = serde_json::from_str(&json)
            .map_err(|e| GameError::InvalidConfig(format!("{}: {e}", path.as_ref().display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let probabilities = [
            ("spawn_four_probability", self.spawn_four_probability),
            ("events.probability", self.events.probability),
            ("effects.chance_good_ratio", self.effects.chance_good_ratio),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(GameError::InvalidConfig(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        if self.win_value == 0 {
            return Err(GameError::InvalidConfig("win_value must be positive".to_string()));
        }
        if !is_power_of_two(self.effects.halving_floor) {
            return Err(GameError::InvalidConfig(format!(
                "effects.halving_floor must be a power of two, got {}",
                self.effects.halving_floor
            )));
        }
        Ok(())
    }
}
