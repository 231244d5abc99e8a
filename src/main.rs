//! Rogue 2048 - Main Binary
//!
//! Terminal driver: play a game (human or AI) or run batch simulations

use clap::{Parser, Subcommand, ValueEnum};
use rogue2048::{
    game::{
        snapshot::{load_or_fresh, ControllerState, GameSnapshot},
        FixedScriptController, Game, GameConfig, GameEndReason, GameLoop, HeuristicController,
        InteractiveController, OutputFormat, PlayerController, RandomController, TriggerMode, VerbosityLevel,
    },
    game::controller::{format_inputs, parse_inputs},
    simulation::{self, SimulationConfig},
    store::{BestScoreStore, FileBestStore},
    GameError, Result,
};
use std::path::PathBuf;

/// Controller type for the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ControllerType {
    /// Human player via stdin
    Human,
    /// Uniformly random legal moves
    Random,
    /// Greedy one-move lookahead
    Heuristic,
    /// Fixed script of inputs (requires --inputs)
    Fixed,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl From<LogFormat> for OutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Text => OutputFormat::Text,
            LogFormat::Json => OutputFormat::Json,
        }
    }
}

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "rogue2048")]
#[command(about = "Rogue 2048 - 2048 with Chance/Fate events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game
    Play {
        /// Who makes the moves
        #[arg(long, value_enum, default_value = "human")]
        controller: ControllerType,

        /// Script for the fixed controller, e.g. "l l u chance r" (space or comma separated)
        #[arg(long, value_name = "INPUTS")]
        inputs: Option<String>,

        /// Random seed for a reproducible game (default: from the clock)
        #[arg(long)]
        seed: Option<u64>,

        /// JSON game configuration; flags below override it (ignored with --resume,
        /// which keeps the snapshot's configuration)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// End the game when the win tile appears
        #[arg(long, conflicts_with = "endless")]
        win: bool,

        /// Keep playing past the win tile
        #[arg(long)]
        endless: bool,

        /// Event trigger mode (each-max, power-of-two, multiple-of-8, every-increment)
        #[arg(long, value_name = "MODE")]
        trigger_mode: Option<TriggerMode>,

        /// Probability an accepted trigger fires
        #[arg(long, value_name = "P")]
        event_probability: Option<f64>,

        /// Minimum moves between events
        #[arg(long, value_name = "MOVES")]
        cooldown: Option<u32>,

        /// Cut the game off after this many moves
        #[arg(long, default_value_t = 100_000)]
        max_moves: u32,

        /// Pause after N moves and write a snapshot
        #[arg(long, value_name = "MOVES")]
        stop_after: Option<u32>,

        /// Where --stop-after writes the snapshot
        #[arg(long, default_value = "game.snapshot")]
        snapshot_output: PathBuf,

        /// Resume from a snapshot file (falls back to a fresh game)
        #[arg(long, value_name = "SNAPSHOT_FILE")]
        resume: Option<PathBuf>,

        /// Best score file
        #[arg(long, default_value = "rogue2048-best.json")]
        best_file: PathBuf,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Format of game log lines
        #[arg(long, value_enum, default_value = "text")]
        log_format: LogFormat,

        /// Print the state hash after every move (stderr)
        #[arg(long)]
        debug_state_hash: bool,
    },

    /// Run many seeded games in parallel and print statistics
    Sim {
        /// Number of games to run
        #[arg(long, short = 'g', default_value_t = 1000)]
        games: usize,

        /// Master seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, value_enum, default_value = "heuristic")]
        controller: ControllerType,

        /// JSON game configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Per-game move cap
        #[arg(long, default_value_t = 10_000)]
        max_moves: u32,
    },
}

/// The controller in use, kept concrete so its state can go into snapshots
enum ActiveController {
    Human(InteractiveController),
    Random(RandomController),
    Heuristic(HeuristicController),
    Fixed(FixedScriptController),
}

impl ActiveController {
    fn as_dyn(&mut self) -> &mut dyn PlayerController {
        match self {
            ActiveController::Human(c) => c,
            ActiveController::Random(c) => c,
            ActiveController::Heuristic(c) => c,
            ActiveController::Fixed(c) => c,
        }
    }

    fn saved_state(&self) -> Option<ControllerState> {
        match self {
            ActiveController::Random(c) => Some(ControllerState::Random(c.clone())),
            ActiveController::Fixed(c) => Some(ControllerState::Fixed(c.clone())),
            ActiveController::Human(_) | ActiveController::Heuristic(_) => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            controller,
            inputs,
            seed,
            config,
            win,
            endless,
            trigger_mode,
            event_probability,
            cooldown,
            max_moves,
            stop_after,
            snapshot_output,
            resume,
            best_file,
            verbosity,
            log_format,
            debug_state_hash,
        } => {
            let overrides_given = config.is_some()
                || win
                || endless
                || trigger_mode.is_some()
                || event_probability.is_some()
                || cooldown.is_some();
            let mut config = load_config(config)?;
            if win {
                config.win_enabled = true;
            }
            if endless {
                config.win_enabled = false;
            }
            if let Some(mode) = trigger_mode {
                config.events.trigger_mode = mode;
            }
            if let Some(p) = event_probability {
                config.events.probability = p;
            }
            if let Some(n) = cooldown {
                config.events.cooldown = n;
            }
            config.validate()?;

            let options = PlayOptions {
                controller,
                inputs,
                seed,
                max_moves,
                stop_after,
                snapshot_output,
                resume,
                best_file,
                verbosity: verbosity.0,
                log_format: log_format.into(),
                debug_state_hash,
                overrides_given,
            };
            run_play(config, options)?
        }
        Commands::Sim {
            games,
            seed,
            controller,
            config,
            max_moves,
        } => {
            let controller = match controller {
                ControllerType::Random => simulation::ControllerType::Random,
                ControllerType::Heuristic => simulation::ControllerType::Heuristic,
                other => {
                    return Err(GameError::InvalidInput(format!(
                        "{other:?} controller cannot be simulated (use random or heuristic)"
                    )))
                }
            };
            let sim = SimulationConfig {
                games,
                seed,
                controller,
                game_config: load_config(config)?,
                max_moves,
            };
            println!("=== Rogue 2048 - Simulation ===");
            println!("Games: {games}, seed: {seed}, controller: {controller:?}");
            simulation::run_simulation(&sim).print();
        }
    }

    Ok(())
}

struct PlayOptions {
    controller: ControllerType,
    inputs: Option<String>,
    seed: Option<u64>,
    max_moves: u32,
    stop_after: Option<u32>,
    snapshot_output: PathBuf,
    resume: Option<PathBuf>,
    best_file: PathBuf,
    verbosity: VerbosityLevel,
    log_format: OutputFormat,
    debug_state_hash: bool,
    /// Config file or rule flags were passed
    overrides_given: bool,
}

fn load_config(path: Option<PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load_from_file(path),
        None => Ok(GameConfig::default()),
    }
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

fn run_play(config: GameConfig, options: PlayOptions) -> Result<()> {
    let mut store = FileBestStore::new(&options.best_file);
    let stored_best = store.load().unwrap_or_else(|e| {
        eprintln!("Warning: could not read best score ({e}); starting from 0");
        0
    });

    let seed = options.seed.unwrap_or_else(clock_seed);
    if options.verbosity >= VerbosityLevel::Normal {
        println!("Using seed: {seed}");
    }

    let (mut game, restored_controller): (Game, Option<ControllerState>) = match &options.resume {
        Some(path) => {
            let resumed = load_or_fresh(path, config, seed, stored_best);
            if let Some(e) = &resumed.error {
                eprintln!("Warning: could not resume from {} ({e}); starting a new game", path.display());
            } else {
                if options.overrides_given {
                    eprintln!(
                        "Warning: --config and rule flags are ignored when resuming; {} keeps its own configuration",
                        path.display()
                    );
                }
                if options.verbosity >= VerbosityLevel::Normal {
                    println!("Resumed from {} at move {}", path.display(), resumed.game.state.move_count);
                }
            }
            (resumed.game, resumed.controller_state)
        }
        None => (Game::with_best(config, seed, stored_best), None),
    };
    game.state.best = game.state.best.max(stored_best);
    game.logger.set_verbosity(options.verbosity);
    game.logger.set_output_format(options.log_format);
    game.logger.set_debug_state_hash(options.debug_state_hash);

    let mut controller = match (options.controller, restored_controller) {
        (ControllerType::Fixed, Some(ControllerState::Fixed(c))) => ActiveController::Fixed(c),
        (ControllerType::Random, Some(ControllerState::Random(c))) => ActiveController::Random(c),
        (ControllerType::Fixed, _) => {
            let script = options.inputs.as_deref().ok_or_else(|| {
                GameError::InvalidInput("--controller fixed requires --inputs".to_string())
            })?;
            ActiveController::Fixed(FixedScriptController::new(parse_inputs(script)?))
        }
        (ControllerType::Random, _) => ActiveController::Random(RandomController::with_seed(seed.wrapping_add(1))),
        (ControllerType::Heuristic, _) => ActiveController::Heuristic(HeuristicController::new()),
        (ControllerType::Human, _) => ActiveController::Human(InteractiveController::new()),
    };

    let mut game_loop = GameLoop::new(&mut game)
        .with_max_moves(options.max_moves)
        .with_best_store(&mut store);
    if let Some(n) = options.stop_after {
        game_loop = game_loop.with_stop_after(n);
    }
    let result = game_loop.run_game(controller.as_dyn())?;

    if result.end_reason == GameEndReason::StopRequested {
        GameSnapshot::capture(&game)
            .with_controller_state(controller.saved_state())
            .save_to_file(&options.snapshot_output)?;
        println!("Snapshot saved to {}", options.snapshot_output.display());
    }

    if options.verbosity >= VerbosityLevel::Minimal {
        println!(
            "Final score {} (best {}), {} moves, max tile {}, {} event(s).",
            result.score, result.best, result.moves_played, result.max_tile, result.events_resolved
        );
    }
    if options.verbosity >= VerbosityLevel::Verbose {
        println!("Inputs: {}", format_inputs(&game.action_log.inputs()));
    }

    Ok(())
}
