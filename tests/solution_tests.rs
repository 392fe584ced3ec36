//! Solution replay, verified puzzles and edit history

use shunting_sim::simulation::{
    sample_history, sample_puzzle, sample_solution, sample_switch, verify, EngineDirection,
    HistoryError, Move, MoveError, Solution, SolutionHistory, SolutionHistorySnapshot,
    VehicleEnd, VerifiedPuzzle, VerifiedPuzzleError, SAMPLE_CAR, SAMPLE_ENGINE,
};

fn nudge(direction: EngineDirection) -> Move {
    Move::MoveEngine {
        engine: SAMPLE_ENGINE,
        direction,
    }
}

#[test]
fn test_sample_solution_solves_sample_puzzle() {
    let puzzle = sample_puzzle().unwrap();
    let result = verify(&puzzle, &sample_solution());

    assert!(result.is_valid, "unexpected failure: {:?}", result.message);
    assert!(result.is_solved);
    assert_eq!(result.applied_move_count, 4);
    assert_eq!(result.failed_move_index, None);
    assert_eq!(result.error, None);

    let final_state = result.final_state.expect("valid runs keep the final state");
    assert!(final_state.coupling(SAMPLE_CAR, VehicleEnd::Back).is_none());
    assert!(puzzle.is_solved(&final_state));
}

#[test]
fn test_partial_solution_is_valid_but_unsolved() {
    let puzzle = sample_puzzle().unwrap();
    let partial = Solution::new(sample_solution().moves[..2].to_vec());
    let result = verify(&puzzle, &partial);

    assert!(result.is_valid);
    assert!(!result.is_solved);
    assert_eq!(result.applied_move_count, 2);
    assert!(result.message.is_some());
    assert!(result.final_state.is_some());
}

#[test]
fn test_verification_stops_at_first_failure() {
    let puzzle = sample_puzzle().unwrap();
    let solution = Solution::new(vec![
        Move::ToggleSwitch(sample_switch()),
        Move::ToggleCoupling {
            vehicle: SAMPLE_CAR,
            end: VehicleEnd::Front,
        },
        nudge(EngineDirection::Forward),
    ]);
    let result = verify(&puzzle, &solution);

    assert!(!result.is_valid);
    assert!(!result.is_solved);
    assert_eq!(result.applied_move_count, 1);
    assert_eq!(result.failed_move_index, Some(1));
    assert_eq!(result.error, Some(MoveError::InvalidCoupling));
    assert!(result.final_state.is_none());
}

#[test]
fn test_empty_solution_on_unsolved_puzzle() {
    let puzzle = sample_puzzle().unwrap();
    let result = verify(&puzzle, &Solution::default());
    assert!(result.is_valid);
    assert!(!result.is_solved);
    assert_eq!(result.final_state.as_ref(), Some(puzzle.initial_state()));
}

#[test]
fn test_verified_puzzle_accepts_solving_history() {
    let puzzle = sample_puzzle().unwrap();
    let snapshot = SolutionHistorySnapshot::from_history(&sample_history());

    let verified = VerifiedPuzzle::try_create(&puzzle, &snapshot).expect("sample verifies");
    assert_eq!(verified.solution_history(), &snapshot);
    assert!(verified.verification().is_solved);
    assert_eq!(verified.puzzle().goal(), puzzle.goal());
}

#[test]
fn test_verified_puzzle_rejects_unsolving_history() {
    let puzzle = sample_puzzle().unwrap();
    let mut history = sample_history();
    history.undo().unwrap();
    let snapshot = SolutionHistorySnapshot::from_history(&history);

    match VerifiedPuzzle::try_create(&puzzle, &snapshot) {
        Err(VerifiedPuzzleError::Rejected(result)) => {
            assert!(result.is_valid);
            assert!(!result.is_solved);
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    let mut broken = SolutionHistorySnapshot::from_history(&sample_history());
    broken.current_version = 7;
    assert!(matches!(
        VerifiedPuzzle::try_create(&puzzle, &broken),
        Err(VerifiedPuzzleError::History(_))
    ));
}

#[test]
fn test_history_undo_redo() {
    let first = Solution::new(vec![Move::ToggleSwitch(sample_switch())]);
    let second = sample_solution();

    let mut history = SolutionHistory::new(Solution::default());
    assert_eq!(history.current_version(), 0);
    assert_eq!(history.undo(), Err(HistoryError::NothingToUndo));
    assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));

    history.add(first.clone());
    history.add(second.clone());
    assert_eq!(history.current_version(), 2);
    assert_eq!(history.latest_version(), 2);
    assert_eq!(history.current_solution(), &second);

    assert_eq!(history.undo(), Ok(&first));
    assert_eq!(history.undo(), Ok(&Solution::default()));
    assert_eq!(history.iter().count(), 1, "iteration stops at the current version");
    assert_eq!(history.redo(), Ok(&first));
    assert_eq!(history.latest_version(), 2, "undo keeps redo-able versions");
}

#[test]
fn test_history_add_discards_redo_versions() {
    let mut history = SolutionHistory::new(Solution::default());
    history.add(sample_solution());
    history.undo().unwrap();

    let replacement = Solution::new(vec![nudge(EngineDirection::Backward)]);
    history.add(replacement.clone());
    assert_eq!(history.current_version(), 1);
    assert_eq!(history.latest_version(), 1);
    assert_eq!(history.current_solution(), &replacement);
    assert_eq!(history.redo(), Err(HistoryError::NothingToRedo));

    let versions: Vec<_> = history.iter().cloned().collect();
    assert_eq!(versions, vec![Solution::default(), replacement]);
}
