//! Global state invariants, checked before and after every move

use std::collections::BTreeMap;

use super::error::MoveFailure;
use super::puzzle::ShuntingPuzzle;
use super::state::PuzzleState;
use super::track::find_discontinuity;
use super::types::{VehicleEnd, VehicleId};

/// Checks every invariant of `state` against `puzzle`
///
/// Failures are reported as `InvalidState` with the first violation found.
pub fn validate_state(puzzle: &ShuntingPuzzle, state: &PuzzleState) -> Result<(), MoveFailure> {
    let topology = puzzle.topology();

    for (table_id, alignment) in &state.turntable_states {
        let Some(table) = topology.turntable(table_id) else {
            return Err(MoveFailure::invalid_state(format!(
                "turntable state refers to unknown turntable '{table_id}'"
            )));
        };
        if *alignment >= table.alignment_count() {
            return Err(MoveFailure::invalid_state(format!(
                "turntable '{table_id}' alignment index {alignment} is out of range (0..{})",
                table.alignment_count()
            )));
        }
    }

    for (switch, index) in &state.switch_states {
        let options = topology.outgoing_edges(switch, &state.turntable_states);
        if options.len() < 2 {
            return Err(MoveFailure::invalid_state(format!(
                "switch state stored for {switch} but there is no switch there"
            )));
        }
        if *index >= options.len() {
            return Err(MoveFailure::invalid_state(format!(
                "switch index {index} at {switch} is out of range ({} options)",
                options.len()
            )));
        }
    }

    for (vehicle, placement) in &state.placements {
        let Some(spec) = puzzle.rolling_stock(*vehicle) else {
            return Err(MoveFailure::invalid_state(format!(
                "unknown vehicle id {vehicle}"
            )));
        };
        let units = placement.unit_length();
        if units != spec.length() {
            return Err(MoveFailure::invalid_state(format!(
                "vehicle {vehicle} covers {units} unit segments but requires {}",
                spec.length()
            )));
        }
        if let Some(index) = find_discontinuity(placement.edges()) {
            return Err(MoveFailure::invalid_state(format!(
                "vehicle {vehicle} has a broken edge chain at edge {index}"
            )));
        }
        for edge in placement.edges() {
            let options = topology.outgoing_edges(&edge.from_state(), &state.turntable_states);
            if !options.contains(edge) {
                return Err(MoveFailure::invalid_state(format!(
                    "vehicle {vehicle} uses an invalid edge on segment '{}'",
                    edge.segment_id
                )));
            }
        }
    }

    if let Err(conflict) = state.segment_occupancy() {
        return Err(MoveFailure::invalid_state(format!(
            "segment '{}' is occupied by both {} and {}",
            conflict.segment_id, conflict.first, conflict.second
        )));
    }

    let blocked = state.blocked_nodes(puzzle);
    for (vehicle, placement) in &state.placements {
        for edge in placement.edges() {
            for node in [edge.from_node, edge.to_node] {
                if let Some(blocker) = blocked.get(&node).filter(|b| *b != vehicle) {
                    return Err(MoveFailure::invalid_state(format!(
                        "vehicle {vehicle} passes through node {node} blocked by vehicle {blocker}"
                    )));
                }
            }
        }
    }

    validate_couplings(state)
}

fn validate_couplings(state: &PuzzleState) -> Result<(), MoveFailure> {
    for (vehicle, links) in &state.couplings {
        let Some(placement) = state.placements.get(vehicle) else {
            return Err(MoveFailure::invalid_state(format!(
                "vehicle {vehicle} has couplings but no placement"
            )));
        };

        for (end, link) in [(VehicleEnd::Back, links.back), (VehicleEnd::Front, links.front)] {
            let Some(link) = link else {
                continue;
            };
            if link.other_vehicle == *vehicle {
                return Err(MoveFailure::invalid_state(format!(
                    "vehicle {vehicle} is coupled to itself"
                )));
            }
            let Some(other) = state.placements.get(&link.other_vehicle) else {
                return Err(MoveFailure::invalid_state(format!(
                    "vehicle {vehicle} is coupled to {} which has no placement",
                    link.other_vehicle
                )));
            };

            let back_link = state.coupling(link.other_vehicle, link.other_end);
            let symmetric = back_link
                .is_some_and(|b| b.other_vehicle == *vehicle && b.other_end == end);
            if !symmetric {
                return Err(MoveFailure::invalid_state(format!(
                    "coupling {vehicle}:{end:?} -> {}:{:?} is not symmetric",
                    link.other_vehicle, link.other_end
                )));
            }

            if placement.end_node(end) != other.end_node(link.other_end) {
                return Err(MoveFailure::invalid_state(format!(
                    "coupled ends of {vehicle} and {} do not touch",
                    link.other_vehicle
                )));
            }
            if placement.outward_heading(end) != other.inward_heading(link.other_end) {
                return Err(MoveFailure::invalid_state(format!(
                    "coupled ends of {vehicle} and {} are not aligned",
                    link.other_vehicle
                )));
            }
        }
    }
    Ok(())
}

/// Vehicles grouped by the segment ids they hold; handy for diagnostics
pub fn occupancy_by_vehicle(state: &PuzzleState) -> BTreeMap<VehicleId, Vec<String>> {
    state
        .placements
        .iter()
        .map(|(vehicle, placement)| {
            let segments = placement
                .edges()
                .iter()
                .map(|edge| edge.segment_id.clone())
                .collect();
            (*vehicle, segments)
        })
        .collect()
}
