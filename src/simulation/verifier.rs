//! Replaying solutions against a puzzle

use log::info;
use thiserror::Error;

use super::engine::apply_move;
use super::error::{MoveError, SnapshotError};
use super::moves::Move;
use super::puzzle::ShuntingPuzzle;
use super::snapshot::SolutionHistorySnapshot;
use super::state::PuzzleState;

/// An ordered list of moves
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Solution {
    pub moves: Vec<Move>,
}

impl Solution {
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }
}

/// Outcome of replaying a solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    /// Every move was applied
    pub is_valid: bool,
    /// Every move was applied and the final state meets the goal
    pub is_solved: bool,
    pub applied_move_count: usize,
    pub failed_move_index: Option<usize>,
    pub error: Option<MoveError>,
    pub message: Option<String>,
    /// Only present when every move was applied
    pub final_state: Option<PuzzleState>,
}

/// Replays `solution` from the puzzle's initial state
pub fn verify(puzzle: &ShuntingPuzzle, solution: &Solution) -> VerificationResult {
    let mut state = puzzle.initial_state().clone();

    for (index, mv) in solution.moves.iter().enumerate() {
        match apply_move(puzzle, &state, mv) {
            Ok(next) => state = next,
            Err(failure) => {
                info!("move {index} ({mv}) failed: {failure}");
                return VerificationResult {
                    is_valid: false,
                    is_solved: false,
                    applied_move_count: index,
                    failed_move_index: Some(index),
                    error: Some(failure.kind),
                    message: Some(failure.message),
                    final_state: None,
                };
            }
        }
    }

    let solved = puzzle.is_solved(&state);
    info!(
        "replayed {} moves, goal {}",
        solution.moves.len(),
        if solved { "satisfied" } else { "not satisfied" }
    );
    VerificationResult {
        is_valid: true,
        is_solved: solved,
        applied_move_count: solution.moves.len(),
        failed_move_index: None,
        error: None,
        message: (!solved)
            .then(|| "solution executed successfully but did not satisfy the goal".to_string()),
        final_state: Some(state),
    }
}

/// Why a puzzle could not be accepted as verified
#[derive(Debug, Error)]
pub enum VerifiedPuzzleError {
    #[error(transparent)]
    History(#[from] SnapshotError),
    #[error("solution rejected: {}", .0.message.as_deref().unwrap_or("goal not satisfied"))]
    Rejected(Box<VerificationResult>),
}

/// A puzzle whose current solution version is known to solve it
#[derive(Debug, Clone)]
pub struct VerifiedPuzzle {
    puzzle: ShuntingPuzzle,
    solution_history: SolutionHistorySnapshot,
    verification: VerificationResult,
}

impl VerifiedPuzzle {
    /// Accepts the puzzle only if the history's current solution is valid
    /// and solves it
    pub fn try_create(
        puzzle: &ShuntingPuzzle,
        solution_history: &SolutionHistorySnapshot,
    ) -> Result<Self, VerifiedPuzzleError> {
        let history = solution_history.to_history()?;
        let verification = verify(puzzle, history.current_solution());
        if !verification.is_valid || !verification.is_solved {
            return Err(VerifiedPuzzleError::Rejected(Box::new(verification)));
        }

        Ok(Self {
            puzzle: puzzle.clone(),
            solution_history: solution_history.clone(),
            verification,
        })
    }

    pub fn puzzle(&self) -> &ShuntingPuzzle {
        &self.puzzle
    }

    pub fn solution_history(&self) -> &SolutionHistorySnapshot {
        &self.solution_history
    }

    pub fn verification(&self) -> &VerificationResult {
        &self.verification
    }
}
