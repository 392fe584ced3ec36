//! Move application: validate, clone, mutate, re-validate
//!
//! The caller's state is never touched. A move either yields a fresh state
//! that passes validation or a [`MoveFailure`] describing why it was refused.

use log::{debug, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::error::{MoveError, MoveFailure};
use super::moves::Move;
use super::puzzle::ShuntingPuzzle;
use super::state::PuzzleState;
use super::track::TrackState;
use super::train;
use super::types::{VehicleEnd, VehicleId};
use super::validation::validate_state;

/// Applies one move to `state` and returns the resulting state
pub fn apply_move(
    puzzle: &ShuntingPuzzle,
    state: &PuzzleState,
    mv: &Move,
) -> Result<PuzzleState, MoveFailure> {
    validate_state(puzzle, state)?;

    let working = state.clone();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| dispatch(puzzle, working, mv)));
    let next = match outcome {
        Ok(result) => result?,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!("{mv} raised an unexpected fault: {message}");
            return Err(MoveFailure::new(MoveError::Unknown, message));
        }
    };

    validate_state(puzzle, &next).map_err(|failure| {
        MoveFailure::invalid_state(format!(
            "move produced an invalid state: {}",
            failure.message
        ))
    })?;

    debug!("applied {mv}");
    Ok(next)
}

fn dispatch(
    puzzle: &ShuntingPuzzle,
    mut state: PuzzleState,
    mv: &Move,
) -> Result<PuzzleState, MoveFailure> {
    match mv {
        Move::ToggleSwitch(switch) => toggle_switch(puzzle, &mut state, *switch)?,
        Move::ToggleCoupling { vehicle, end } => toggle_coupling(&mut state, *vehicle, *end)?,
        Move::RotateTurntable(table_id) => rotate_turntable(puzzle, &mut state, table_id)?,
        Move::MoveEngine { engine, direction } => {
            train::move_engine(puzzle, &mut state, *engine, *direction)?
        }
    }
    Ok(state)
}

fn toggle_switch(
    puzzle: &ShuntingPuzzle,
    state: &mut PuzzleState,
    switch: TrackState,
) -> Result<(), MoveFailure> {
    let options = puzzle
        .topology()
        .outgoing_edges(&switch, &state.turntable_states);
    if options.len() < 2 {
        return Err(MoveFailure::new(
            MoveError::InvalidSwitch,
            format!("no switch at {switch}"),
        ));
    }

    let current = state.switch_states.get(&switch).copied().unwrap_or(0) % options.len();
    state
        .switch_states
        .insert(switch, (current + 1) % options.len());
    Ok(())
}

fn toggle_coupling(
    state: &mut PuzzleState,
    vehicle: VehicleId,
    end: VehicleEnd,
) -> Result<(), MoveFailure> {
    let Some(placement) = state.placements.get(&vehicle) else {
        return Err(MoveFailure::new(
            MoveError::UnknownVehicle,
            format!("vehicle {vehicle} has no placement"),
        ));
    };
    let node = placement.end_node(end);
    let outward = placement.outward_heading(end);

    if let Some(link) = state.coupling(vehicle, end) {
        let reciprocal = state.coupling(link.other_vehicle, link.other_end);
        if !reciprocal.is_some_and(|r| r.other_vehicle == vehicle && r.other_end == end) {
            return Err(MoveFailure::new(
                MoveError::InvalidCoupling,
                format!(
                    "coupling {vehicle}:{end:?} -> {}:{:?} has no reciprocal link",
                    link.other_vehicle, link.other_end
                ),
            ));
        }
        state.set_coupling(vehicle, end, None);
        state.set_coupling(link.other_vehicle, link.other_end, None);
        return Ok(());
    }

    let candidates: Vec<(VehicleId, VehicleEnd)> = state
        .placements
        .iter()
        .filter(|(other, _)| **other != vehicle)
        .flat_map(|(other, other_placement)| {
            VehicleEnd::BOTH
                .into_iter()
                .filter(move |other_end| {
                    other_placement.end_node(*other_end) == node
                        && other_placement.inward_heading(*other_end) == outward
                })
                .map(move |other_end| (*other, other_end))
        })
        .collect();

    let (other, other_end) = match candidates.as_slice() {
        [] => {
            return Err(MoveFailure::new(
                MoveError::InvalidCoupling,
                format!("no adjacent vehicle at the {end:?} end of {vehicle}"),
            ))
        }
        [single] => *single,
        _ => {
            return Err(MoveFailure::new(
                MoveError::InvalidCoupling,
                format!("ambiguous coupling at the {end:?} end of {vehicle}"),
            ))
        }
    };

    if state.coupling(other, other_end).is_some() {
        return Err(MoveFailure::new(
            MoveError::InvalidCoupling,
            format!("the {other_end:?} end of vehicle {other} is already coupled"),
        ));
    }

    state.couple(vehicle, end, other, other_end);
    Ok(())
}

fn rotate_turntable(
    puzzle: &ShuntingPuzzle,
    state: &mut PuzzleState,
    table_id: &str,
) -> Result<(), MoveFailure> {
    let topology = puzzle.topology();
    let Some(table) = topology.turntable(table_id) else {
        return Err(MoveFailure::new(
            MoveError::InvalidTurntable,
            format!("unknown turntable '{table_id}'"),
        ));
    };

    let current = state.turntable_states.get(table_id).copied().unwrap_or(0);
    let occupancy = state.segment_occupancy().map_err(|conflict| {
        MoveFailure::invalid_state(format!(
            "segment '{}' is occupied by both {} and {}",
            conflict.segment_id, conflict.first, conflict.second
        ))
    })?;
    let bridge = table.edges_for_alignment(current).unwrap_or_default();
    if let Some((edge, vehicle)) = bridge
        .iter()
        .find_map(|edge| occupancy.get(&edge.segment_id).map(|v| (edge, v)))
    {
        return Err(MoveFailure::new(
            MoveError::InvalidTurntable,
            format!(
                "turntable '{table_id}' is loaded: vehicle {vehicle} is on '{}'",
                edge.segment_id
            ),
        ));
    }

    let next = (current + 1) % table.alignment_count();
    state.turntable_states.insert(table_id.to_string(), next);

    // Bridge ends may have been switches under the old alignment.
    let turntable_states = &state.turntable_states;
    state.switch_states.retain(|switch, index| {
        let options = topology.outgoing_edges(switch, turntable_states).len();
        let keep = options >= 2 && *index < options;
        if !keep {
            debug!("dropping stale switch selection at {switch}");
        }
        keep
    });
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("unexpected fault: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("unexpected fault: {message}")
    } else {
        "unexpected fault during move".to_string()
    }
}
