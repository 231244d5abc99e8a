//! Game snapshots for stop-and-resume play
//!
//! A snapshot holds everything needed to continue a game exactly where it
//! stopped: the state, the configuration, the RNG stream position and,
//! optionally, the controller's own state. Snapshots are taken between
//! inputs, so there is nothing to replay on resume.

use crate::game::config::GameConfig;
use crate::game::controller::PlayerInput;
use crate::game::state::{Game, GameState};
use crate::game::{FixedScriptController, RandomController};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Controller state that can be preserved across snapshot/resume
///
/// Heuristic and interactive controllers carry no state worth saving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "controller_type")]
pub enum ControllerState {
    /// Fixed script controller with its position in the script
    Fixed(FixedScriptController),

    /// Random controller with its own RNG state
    Random(RandomController),
}

/// A resumable game snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub game_state: GameState,
    pub config: GameConfig,
    /// Engine RNG, so spawns and effects continue the same stream
    pub rng: ChaCha12Rng,
    /// Inputs played so far, in script form order
    #[serde(default)]
    pub inputs: Vec<PlayerInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_state: Option<ControllerState>,
}

impl GameSnapshot {
    /// Capture a running game
    pub fn capture(game: &Game) -> Self {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            game_state: game.state.clone(),
            config: game.config.clone(),
            rng: game.rng().clone(),
            inputs: game.action_log.inputs(),
            controller_state: None,
        }
    }

    pub fn with_controller_state(mut self, controller_state: Option<ControllerState>) -> Self {
        self.controller_state = controller_state;
        self
    }

    /// Rebuild the game; the action log starts empty
    pub fn into_game(self) -> Game {
        Game::from_state(self.game_state, self.config, self.rng)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        std::fs::write(path.as_ref(), json).map_err(|e| SnapshotError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a snapshot
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| SnapshotError::Io(e.to_string()))?;
        let snapshot: GameSnapshot =
            serde_json::from_str(&json).map_err(|e| SnapshotError::Deserialization(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Reject snapshots from other format versions or with broken invariants
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        self.game_state
            .validate()
            .map_err(|e| SnapshotError::InvalidState(e.to_string()))?;
        self.config
            .validate()
            .map_err(|e| SnapshotError::InvalidState(e.to_string()))?;
        Ok(())
    }
}

/// Outcome of `load_or_fresh`
#[derive(Debug)]
pub struct Resumed {
    pub game: Game,
    pub controller_state: Option<ControllerState>,
    /// Why the snapshot was not used, if it was not
    pub error: Option<SnapshotError>,
}

/// Resume from `path`, or start a fresh seeded game if the snapshot is
/// missing, unreadable or invalid
pub fn load_or_fresh<P: AsRef<Path>>(path: P, config: GameConfig, seed: u64, best: u64) -> Resumed {
    match GameSnapshot::load_from_file(path) {
        Ok(snapshot) => {
            let controller_state = snapshot.controller_state.clone();
            Resumed {
                game: snapshot.into_game(),
                controller_state,
                error: None,
            }
        }
        Err(e) => Resumed {
            game: Game::with_best(config, seed, best),
            controller_state: None,
            error: Some(e),
        },
    }
}

/// Errors that can occur during snapshot operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),

    #[error("Failed to deserialize snapshot: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid snapshot state: {0}")]
    InvalidState(String),

    #[error("Unsupported snapshot version {0} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion(u32),
}
