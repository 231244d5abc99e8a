//! Error types for Rogue 2048

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] crate::game::snapshot::SnapshotError),
}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
