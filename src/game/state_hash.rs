//! Deterministic state hashing for debugging snapshot/resume
//!
//! Hashes the gameplay-relevant part of a `GameState` so two runs (or a run
//! and its resumed copy) can be compared move by move.

use crate::game::state::GameState;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fields that do not affect how the game continues
///
/// - best: carried across sessions
/// - win_announced: endless-mode message flag
/// - history: trigger bookkeeping kept for display
const EXCLUDED_FIELDS: &[&str] = &["best", "win_announced", "history"];

/// Compute a deterministic hash of game state
///
/// Serializes to JSON, strips the excluded fields, then hashes the canonical
/// string. Returns 0 if the state cannot be serialized.
pub fn compute_state_hash(state: &GameState) -> u64 {
    let json_value = match serde_json::to_value(state) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Warning: Failed to serialize game state for hashing: {e}");
            return 0;
        }
    };

    let canonical = strip_metadata(json_value).to_string();

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    hasher.finish()
}

/// Recursively strip excluded fields from a JSON value
fn strip_metadata(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(k, _)| !EXCLUDED_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k, strip_metadata(v)))
                .collect(),
        ),
        serde_json::Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(strip_metadata).collect()),
        other => other,
    }
}

/// Format a hash for display (first 8 hex digits)
pub fn format_hash(hash: u64) -> String {
    format!("{:08x}", (hash >> 32) as u32)
}
