//! Batch simulation: many seeded games in parallel with aggregate statistics
//!
//! Games run concurrently on rayon's pool. Every game derives its own seed
//! from the master seed and its index, so a report depends only on the
//! configuration, never on thread scheduling.

use crate::game::config::GameConfig;
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::game::{Game, GameEndReason, GameLoop, HeuristicController, PlayerController, RandomController};
use crate::history::ActionLog;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Controller used for simulated games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerType {
    Random,
    Heuristic,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub games: usize,
    pub seed: u64,
    pub controller: ControllerType,
    pub game_config: GameConfig,
    /// Per-game cut-off
    pub max_moves: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            games: 100,
            seed: 42,
            controller: ControllerType::Heuristic,
            game_config: GameConfig::default(),
            max_moves: 10_000,
        }
    }
}

/// Aggregate statistics over a batch
#[derive(Debug, Default, Clone)]
pub struct SimulationReport {
    pub games: usize,
    pub total_moves: u64,
    pub total_score: u64,
    pub best_score: u64,
    pub events_resolved: u64,
    /// Games that ended by hitting the move cap
    pub cut_off: usize,
    /// Final max tile -> number of games
    pub max_tile_histogram: FxHashMap<u32, usize>,
    pub elapsed: Duration,
}

impl SimulationReport {
    pub fn mean_score(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_score as f64 / self.games as f64
    }

    pub fn mean_moves(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_moves as f64 / self.games as f64
    }

    /// Share of games whose final max tile reached `value`
    pub fn reach_rate(&self, value: u32) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let reached: usize = self
            .max_tile_histogram
            .iter()
            .filter(|(&tile, _)| tile >= value)
            .map(|(_, &count)| count)
            .sum();
        reached as f64 / self.games as f64
    }

    pub fn print(&self) {
        println!("\n=== Simulation Complete ===");
        println!("Games played: {}", self.games);
        println!("Elapsed time: {:.2}s", self.elapsed.as_secs_f64());
        if self.elapsed.as_secs_f64() > 0.0 {
            println!("Games per second: {:.2}", self.games as f64 / self.elapsed.as_secs_f64());
        }
        println!("Mean score: {:.1}", self.mean_score());
        println!("Mean moves: {:.1}", self.mean_moves());
        println!("Best score: {}", self.best_score);
        println!("Events resolved: {}", self.events_resolved);
        if self.cut_off > 0 {
            println!("Cut off at move limit: {}", self.cut_off);
        }

        println!("\n=== Final Max Tile ===");
        let mut tiles: Vec<_> = self.max_tile_histogram.iter().collect();
        tiles.sort_by_key(|(&tile, _)| tile);
        for (tile, count) in tiles {
            println!(
                "{:>6}: {:>5} ({:.1}%)",
                tile,
                count,
                100.0 * *count as f64 / self.games as f64
            );
        }
    }
}

/// Seed of game `index` under `master`
pub fn game_seed(master: u64, index: usize) -> u64 {
    master.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Run the batch and collect statistics
pub fn run_simulation(config: &SimulationConfig) -> SimulationReport {
    let stats = Arc::new(Mutex::new(SimulationReport::default()));
    let start_time = Instant::now();

    (0..config.games).into_par_iter().for_each(|index| {
        let seed = game_seed(config.seed, index);
        let mut game = Game::new(config.game_config.clone(), seed)
            .with_logger(GameLogger::with_verbosity(VerbosityLevel::Silent));
        game.action_log = ActionLog::disabled();

        let mut controller: Box<dyn PlayerController> = match config.controller {
            ControllerType::Random => Box::new(RandomController::with_seed(seed.wrapping_add(0x1234_5678_9ABC_DEF0))),
            ControllerType::Heuristic => Box::new(HeuristicController::new()),
        };

        let result = GameLoop::new(&mut game)
            .with_max_moves(config.max_moves)
            .run_game(&mut *controller);

        match result {
            Ok(result) => {
                let Ok(mut stats) = stats.lock() else {
                    return;
                };
                stats.games += 1;
                stats.total_moves += u64::from(result.moves_played);
                stats.total_score += result.score;
                stats.best_score = stats.best_score.max(result.score);
                stats.events_resolved += u64::from(result.events_resolved);
                if result.end_reason == GameEndReason::MaxMoves {
                    stats.cut_off += 1;
                }
                *stats.max_tile_histogram.entry(result.max_tile).or_insert(0) += 1;
            }
            Err(e) => eprintln!("Warning: Game {index} failed: {e}"),
        }
    });

    let mut report = match Arc::try_unwrap(stats) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        Err(shared) => shared.lock().map(|r| r.clone()).unwrap_or_default(),
    };
    report.elapsed = start_time.elapsed();
    report
}
