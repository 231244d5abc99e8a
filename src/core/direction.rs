//! Move directions and event choices
//!
//! Both are parsed from free-form text so any input layer (stdin, scripts,
//! key bindings) can feed the engine. Unknown input yields `None` / an error
//! and the caller simply ignores it.

use crate::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A direction to slide/merge tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];

    /// Map the numeric direction codes used by the browser build
    /// (0 = left, 1 = down, 2 = right, 3 = up)
    pub fn from_code(code: i64) -> Option<Direction> {
        match code {
            0 => Some(Direction::Left),
            1 => Some(Direction::Down),
            2 => Some(Direction::Right),
            3 => Some(Direction::Up),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Direction::Left => 0,
            Direction::Down => 1,
            Direction::Right => 2,
            Direction::Up => 3,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = GameError;

    /// Accepts names, the initials l/r/u and WASD keys
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" | "a" => Ok(Direction::Left),
            "right" | "r" | "d" => Ok(Direction::Right),
            "up" | "u" | "w" => Ok(Direction::Up),
            "down" | "s" => Ok(Direction::Down),
            other => Err(GameError::InvalidInput(format!("unknown direction '{other}'"))),
        }
    }
}

/// The two branches offered when an event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventChoice {
    /// Mostly beneficial outcomes
    Chance,
    /// High variance, weighted toward punishing outcomes
    Fate,
}

impl EventChoice {
    pub fn name(self) -> &'static str {
        match self {
            EventChoice::Chance => "Chance",
            EventChoice::Fate => "Fate",
        }
    }
}

impl fmt::Display for EventChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventChoice {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chance" | "c" | "1" => Ok(EventChoice::Chance),
            "fate" | "f" | "2" => Ok(EventChoice::Fate),
            other => Err(GameError::InvalidInput(format!("unknown event choice '{other}'"))),
        }
    }
}
