//! Greedy heuristic controller
//!
//! Looks one move ahead with `Board::preview` and picks the direction whose
//! resulting board scores best. Ties go to the earlier direction in
//! `Direction::ALL`, so the controller is fully deterministic.

use crate::core::{Board, Direction, EventChoice, Position, SIZE};
use crate::game::controller::{GameView, PlayerController};
use crate::game::events::PendingEvent;

/// Weight of one empty cell relative to one point of score
const EMPTY_CELL_WEIGHT: u64 = 16;

/// Free cells at or below which the controller gambles on Fate
const FATE_THRESHOLD: usize = 2;

const CORNERS: [Position; 4] = [
    Position::new(0, 0),
    Position::new(0, SIZE - 1),
    Position::new(SIZE - 1, 0),
    Position::new(SIZE - 1, SIZE - 1),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicController;

impl HeuristicController {
    pub fn new() -> Self {
        HeuristicController
    }

    /// Score of a board reached by a move that gained `gained` points
    pub fn evaluate(board: &Board, gained: u64) -> u64 {
        let empties = board.empty_positions().len() as u64;
        let max = board.max_value();
        let corner_bonus = if CORNERS
            .iter()
            .any(|&pos| board.get(pos).map(|t| t.value) == Some(max))
        {
            u64::from(max)
        } else {
            0
        };
        gained + empties * EMPTY_CELL_WEIGHT + corner_bonus
    }

    /// Best direction for `board`, or None if nothing moves
    pub fn best_move(board: &Board) -> Option<Direction> {
        let mut best: Option<(Direction, u64)> = None;
        for dir in Direction::ALL {
            let (next, outcome) = board.preview(dir);
            if !outcome.moved {
                continue;
            }
            let score = Self::evaluate(&next, outcome.gained);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((dir, score));
            }
        }
        best.map(|(dir, _)| dir)
    }
}

impl PlayerController for HeuristicController {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn choose_move(&mut self, view: &GameView) -> Option<Direction> {
        let dir = Self::best_move(view.board())?;
        view.logger().controller_choice(self.name(), &format!("chose {dir}"));
        Some(dir)
    }

    /// Chance while the board has room, Fate when it is nearly full
    fn choose_event(&mut self, view: &GameView, _event: &PendingEvent) -> Option<EventChoice> {
        let choice = if view.board().empty_positions().len() <= FATE_THRESHOLD {
            EventChoice::Fate
        } else {
            EventChoice::Chance
        };
        view.logger().controller_choice(self.name(), &format!("chose {choice}"));
        Some(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_merges() {
        // Left and right score the same; the tie goes to the earlier direction.
        let board = Board::from_values([[8, 8, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]]);
        assert_eq!(HeuristicController::best_move(&board), Some(Direction::Left));
    }

    #[test]
    fn test_no_move_on_locked_board() {
        let board = Board::from_values([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert_eq!(HeuristicController::best_move(&board), None);
    }

    #[test]
    fn test_evaluate_counts_space() {
        let sparse = Board::from_values([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let crowded = Board::from_values([[2, 4, 8, 0], [0; 4], [0; 4], [0; 4]]);
        assert!(HeuristicController::evaluate(&sparse, 0) > HeuristicController::evaluate(&crowded, 0));
    }
}
