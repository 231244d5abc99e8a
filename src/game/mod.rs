//! Game state, the move engine, events and the loop that drives them

pub mod config;
pub mod controller;
pub mod effects;
pub mod engine;
pub mod events;
pub mod fixed_script_controller;
pub mod game_loop;
pub mod heuristic_controller;
pub mod interactive_controller;
pub mod logger;
pub mod random_controller;
pub mod snapshot;
pub mod state;
pub mod state_hash;

pub use config::{EffectConfig, EventConfig, GameConfig, TriggerMode};
pub use controller::{format_inputs, parse_inputs, GameView, PlayerController, PlayerInput};
pub use effects::{EffectCatalog, EffectEntry, EffectKind};
pub use events::{EventPolicyState, PendingEvent};
pub use fixed_script_controller::FixedScriptController;
pub use game_loop::{GameEndReason, GameLoop, GameResult};
pub use heuristic_controller::HeuristicController;
pub use interactive_controller::InteractiveController;
pub use logger::{GameLogger, OutputFormat, OutputMode, VerbosityLevel};
pub use random_controller::RandomController;
pub use snapshot::{ControllerState, GameSnapshot, SnapshotError};
pub use state::{BlindMode, BoardSnapshot, EffectApplied, Game, GameOutcome, GameState, MoveResult, TileView};
