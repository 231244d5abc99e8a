//! Centralized game logger
//!
//! Messages go to stdout, to an in-memory buffer, or both. Tests capture the
//! buffer to assert on what a game reported.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Verbosity level for game output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game outcome
    Minimal = 1,
    /// Normal - moves, events and effects (default)
    #[default]
    Normal = 2,
    /// Verbose - spawns, ignored input and policy decisions
    Verbose = 3,
}

impl VerbosityLevel {
    /// Map a `-v` count (or numeric flag) onto a level, saturating at Verbose
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Silent,
            1 => VerbosityLevel::Minimal,
            2 => VerbosityLevel::Normal,
            _ => VerbosityLevel::Verbose,
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A captured log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g. "controller_choice", "event")
    pub category: Option<String>,
}

/// Read-only access to captured log entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }

    /// True if any captured message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.guard.iter().any(|entry| entry.message.contains(needle))
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Centralized logger shared by the engine and the game loop
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,
    /// Print the state hash before each logged action
    debug_state_hash: bool,
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_format: OutputFormat::default(),
            output_mode: OutputMode::default(),
            debug_state_hash: false,
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    /// Logger that captures everything to memory and prints nothing
    pub fn capturing() -> Self {
        let mut logger = Self::with_verbosity(VerbosityLevel::Verbose);
        logger.enable_capture();
        logger
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Capture to memory only (suppresses stdout)
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn disable_capture(&mut self) {
        self.output_mode = OutputMode::Stdout;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    /// Print buffered logs allowed by the current verbosity, then clear the buffer
    pub fn flush_buffer(&mut self) {
        for entry in self.log_buffer.borrow().iter() {
            if entry.level <= self.verbosity {
                self.log_to_stdout(entry);
            }
        }
        self.clear_logs();
    }

    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn set_debug_state_hash(&mut self, enabled: bool) {
        self.debug_state_hash = enabled;
    }

    pub fn debug_state_hash_enabled(&self) -> bool {
        self.debug_state_hash
    }

    #[inline]
    fn log_to_stdout(&self, entry: &LogEntry) {
        match self.output_format {
            OutputFormat::Json => {
                let line = serde_json::json!({
                    "level": entry.level,
                    "category": entry.category,
                    "message": entry.message,
                });
                println!("{line}");
            }
            OutputFormat::Text if entry.level == VerbosityLevel::Minimal => println!("{}", entry.message),
            OutputFormat::Text => println!("  {}", entry.message),
        }
    }

    fn emit(&self, level: VerbosityLevel, category: Option<&str>, message: &str) {
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);

        if level > self.verbosity && !should_capture {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            category: category.map(str::to_string),
        };
        if should_output && level <= self.verbosity {
            self.log_to_stdout(&entry);
        }
        if should_capture {
            self.log_buffer.borrow_mut().push(entry);
        }
    }

    /// Log at Minimal level
    #[inline]
    pub fn minimal(&self, message: &str) {
        self.emit(VerbosityLevel::Minimal, None, message);
    }

    /// Log at Normal level
    #[inline]
    pub fn normal(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, None, message);
    }

    /// Log at Verbose level
    #[inline]
    pub fn verbose(&self, message: &str) {
        self.emit(VerbosityLevel::Verbose, None, message);
    }

    /// Event and effect announcements, tagged so tests can filter them
    pub fn event(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, Some("event"), message);
    }

    /// Log a controller decision at Normal level
    ///
    /// The controller name only goes to stderr (with state hash debugging on)
    /// so logs match whichever controller made the choice.
    pub fn controller_choice(&self, controller_name: &str, message: &str) {
        if self.debug_state_hash {
            eprintln!("  >>> {controller_name}: {message}");
        }
        self.emit(VerbosityLevel::Normal, Some("controller_choice"), message);
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        assert!(!logger.is_capturing());
    }

    #[test]
    fn test_log_capture() {
        let mut logger = GameLogger::new();
        logger.enable_capture();

        logger.normal("merged two tiles");
        logger.minimal("Game Over");

        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "merged two tiles");
        assert_eq!(logs[1].level, VerbosityLevel::Minimal);
    }

    #[test]
    fn test_capture_ignores_verbosity() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
        logger.enable_capture();
        logger.verbose("spawned 2 at (0, 0)");
        assert_eq!(logger.logs().len(), 1);
    }

    #[test]
    fn test_categories() {
        let logger = GameLogger::capturing();
        logger.event("Event! Choose Chance or Fate.");
        logger.controller_choice("random", "chose left");

        let logs = logger.logs();
        assert_eq!(logs[0].category.as_deref(), Some("event"));
        assert_eq!(logs[1].category.as_deref(), Some("controller_choice"));
        assert!(logs.contains("Chance or Fate"));
    }

    #[test]
    fn test_flush_buffer_clears() {
        let mut logger = GameLogger::new();
        logger.set_output_mode(OutputMode::Memory);
        logger.normal("message 1");
        logger.normal("message 2");
        assert_eq!(logger.logs().len(), 2);

        logger.flush_buffer();
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_verbosity_from_count() {
        assert_eq!(VerbosityLevel::from_count(0), VerbosityLevel::Silent);
        assert_eq!(VerbosityLevel::from_count(2), VerbosityLevel::Normal);
        assert_eq!(VerbosityLevel::from_count(9), VerbosityLevel::Verbose);
        assert!(VerbosityLevel::Minimal < VerbosityLevel::Verbose);
    }
}
