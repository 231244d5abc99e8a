//! Best-score persistence
//!
//! The best score outlives a game session. The game loop saves it whenever a
//! move raises it; `reset` keeps it in memory.

use crate::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Somewhere to keep the best score between sessions
pub trait BestScoreStore {
    /// Stored best, 0 if nothing was stored yet
    fn load(&self) -> Result<u64>;

    fn save(&mut self, best: u64) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct BestRecord {
    best: u64,
}

/// JSON file store: `{"best": 1234}`
#[derive(Debug, Clone)]
pub struct FileBestStore {
    path: PathBuf,
}

impl FileBestStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileBestStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestScoreStore for FileBestStore {
    fn load(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        let json = std::fs::read_to_string(&self.path)?;
        let record: BestRecord = serde_json::from_str(&json)
            .map_err(|e| GameError::ParseError(format!("{}: {e}", self.path.display())))?;
        Ok(record.best)
    }

    /// Never lowers the stored value
    fn save(&mut self, best: u64) -> Result<()> {
        let current = self.load().unwrap_or(0);
        if best <= current && self.path.exists() {
            return Ok(());
        }
        let json = serde_json::to_string(&BestRecord { best })?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store for tests and simulations
#[derive(Debug, Clone, Default)]
pub struct MemoryBestStore {
    best: u64,
    pub saves: usize,
}

impl MemoryBestStore {
    pub fn new(best: u64) -> Self {
        MemoryBestStore { best, saves: 0 }
    }
}

impl BestScoreStore for MemoryBestStore {
    fn load(&self) -> Result<u64> {
        Ok(self.best)
    }

    fn save(&mut self, best: u64) -> Result<()> {
        self.best = self.best.max(best);
        self.saves += 1;
        Ok(())
    }
}
