//! Move engine and event resolution
//!
//! A move is one transaction: slide, score, blind countdown, spawn, end
//! checks, then the event policy. Input arriving while the game is over or
//! an event is pending is ignored without touching any state.

/// Macro for conditional logging that avoids allocation when feature is disabled
///
/// When verbose-logging feature is disabled, this becomes a no-op at compile time,
/// eliminating the format! allocations on the move hot path.
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::core::{Direction, EventChoice, RandomSource};
use crate::game::effects::EffectKind;
use crate::game::state::{EffectApplied, Game, GameOutcome, MoveResult};
use crate::history::GameAction;

impl<R: RandomSource> Game<R> {
    /// Slide the board in `dir` and run everything that follows a move
    ///
    /// Returns `moved == false` (and changes nothing) for no-op slides, when
    /// the game is over, or while an event waits for a choice.
    pub fn apply_move(&mut self, dir: Direction) -> MoveResult {
        if self.state.is_game_over() {
            log_if_verbose!(self, "Ignored {dir}: game is over");
            return MoveResult::unchanged(&self.state);
        }
        if self.state.is_event_active() {
            log_if_verbose!(self, "Ignored {dir}: choose Chance or Fate first");
            return MoveResult::unchanged(&self.state);
        }

        let slide = self.state.board.slide(dir);
        if !slide.moved {
            log_if_verbose!(self, "Ignored {dir}: nothing moves");
            return MoveResult::unchanged(&self.state);
        }

        let best_improved = self.state.record_score(slide.gained);
        self.action_log.log(GameAction::Move {
            direction: dir,
            gained: slide.gained,
            merges: slide.merges() as u8,
        });
        log_if_verbose!(
            self,
            "Move {}: {} merge(s), +{} (score {})",
            dir,
            slide.merges(),
            slide.gained,
            self.state.score
        );

        if self.state.blind.active {
            if self.state.blind.tick() {
                self.logger.normal("Blind mode ended.");
            } else {
                log_if_verbose!(self, "Blind mode: {} moves left.", self.state.blind.moves_remaining);
            }
        }

        let spawned = self
            .state
            .board
            .spawn_random(&mut self.rng, self.config.spawn_four_probability);
        if let Some((position, tile)) = spawned {
            log_if_verbose!(self, "Spawned {} at {}", tile.value, position);
            self.action_log.log(GameAction::Spawn { position, tile });
        }

        self.state.move_count += 1;
        self.check_game_end();

        let event_triggered = if self.state.is_game_over() {
            None
        } else {
            let active = self.state.is_event_active();
            let max_tile = self.state.max_tile();
            self.state
                .policy
                .evaluate(active, self.state.move_count, max_tile, &self.config.events, &mut self.rng)
        };
        if let Some(event) = event_triggered {
            self.state.pending_event = Some(event);
            self.action_log.log(GameAction::EventTriggered {
                trigger_value: event.trigger_value,
                move_index: event.move_index,
            });
            self.logger.event(&format!(
                "Event! New max tile {}. Choose Chance or Fate.",
                event.trigger_value
            ));
        }

        debug_assert!(self.state.validate().is_ok(), "invalid state after move {dir}");

        MoveResult {
            moved: true,
            score_delta: slide.gained,
            merged_positions: slide.merged_positions,
            new_max_tile: self.state.max_tile(),
            spawned,
            event_triggered,
            best_improved,
            game_over: self.state.is_game_over(),
        }
    }

    /// Apply a move given as a numeric code (0 left, 1 down, 2 right, 3 up)
    ///
    /// Unknown codes are ignored like any other no-op input.
    pub fn apply_move_code(&mut self, code: i64) -> MoveResult {
        match Direction::from_code(code) {
            Some(dir) => self.apply_move(dir),
            None => {
                log_if_verbose!(self, "Ignored unknown direction code {code}");
                MoveResult::unchanged(&self.state)
            }
        }
    }

    /// Resolve the pending event with the player's choice
    ///
    /// Returns `None` and changes nothing when no event is pending.
    pub fn resolve_event(&mut self, choice: EventChoice) -> Option<EffectApplied> {
        let event = self.state.pending_event?;

        let before = self.state.board.clone();
        let kind = self
            .catalog
            .select(choice, &self.config.effects, &mut self.rng)
            .unwrap_or(EffectKind::Nothing);
        let description = kind.apply(
            &mut self.state.board,
            &mut self.state.blind,
            &self.config.effects,
            &mut self.rng,
        );
        self.state.pending_event = None;

        self.action_log.log(GameAction::EffectApplied { choice, effect: kind });
        self.logger.event(&format!("{choice} (max {}): {description}", event.trigger_value));

        // An effect can fill the board or create the win tile.
        self.check_game_end();

        debug_assert!(self.state.validate().is_ok(), "invalid state after {}", kind.id());

        Some(EffectApplied {
            choice,
            id: kind,
            board_delta: before.diff(&self.state.board),
            description,
        })
    }

    /// Win and no-moves checks; sets the outcome at most once
    fn check_game_end(&mut self) {
        if self.state.is_game_over() {
            return;
        }

        let max = self.state.max_tile();
        if max >= self.config.win_value {
            if self.config.win_enabled {
                self.state.outcome = Some(GameOutcome::Won);
            } else if !self.state.win_announced {
                self.state.win_announced = true;
                self.logger.normal(&format!("{max} reached! Keep going..."));
            }
        }

        if self.state.outcome.is_none() && !self.state.board.can_move() {
            self.state.outcome = Some(GameOutcome::NoMoves);
        }

        if let Some(outcome) = self.state.outcome {
            self.state.pending_event = None;
            self.action_log.log(GameAction::GameOver {
                score: self.state.score,
                move_count: self.state.move_count,
            });
            self.logger.minimal(&format!(
                "{outcome}: You scored {} in {} moves. (Best: {})",
                self.state.score, self.state.move_count, self.state.best
            ));
        }
    }
}
