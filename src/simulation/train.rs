//! Engine movement: chain discovery, orientation and the unit advance
//!
//! A train moves like a snake. The head advances exactly one unit of
//! distance while the tail retreats one unit, and the head may enter the
//! segment the tail vacates in the same step.

use log::debug;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::Bfs;
use std::collections::{BTreeMap, HashSet};

use super::error::{MoveError, MoveFailure};
use super::geometry::GridPoint;
use super::puzzle::ShuntingPuzzle;
use super::state::{PuzzleState, VehiclePlacement};
use super::track::{find_discontinuity, DirectedTrackEdge, TrackState};
use super::types::{EngineDirection, VehicleEnd, VehicleId};

/// Vehicles of a train from tail to head, each with the end facing the head
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientedTrain {
    pub vehicles: Vec<(VehicleId, VehicleEnd)>,
}

impl OrientedTrain {
    pub fn contains(&self, vehicle: VehicleId) -> bool {
        self.vehicles.iter().any(|(id, _)| *id == vehicle)
    }
}

/// Moves `engine` and everything coupled to it one unit in `direction`
pub fn move_engine(
    puzzle: &ShuntingPuzzle,
    state: &mut PuzzleState,
    engine: VehicleId,
    direction: EngineDirection,
) -> Result<(), MoveFailure> {
    let Some(spec) = puzzle.rolling_stock(engine) else {
        return Err(MoveFailure::new(
            MoveError::UnknownVehicle,
            format!("unknown vehicle id {engine}"),
        ));
    };
    if !spec.is_engine() {
        return Err(MoveFailure::new(
            MoveError::NotAnEngine,
            format!("vehicle {engine} is not an engine"),
        ));
    }
    if !state.placements.contains_key(&engine) {
        return Err(MoveFailure::invalid_state(format!(
            "engine {engine} has no placement"
        )));
    }

    let component = coupled_component(state, engine)?;
    let train = orient_train(state, engine, direction, &component)?;
    check_power(puzzle, &train)?;

    let path = flatten(state, &train)?;
    let moving: HashSet<VehicleId> = component.iter().copied().collect();

    let occupancy = state.segment_occupancy().map_err(|conflict| {
        MoveFailure::invalid_state(format!(
            "segment '{}' is occupied by both {} and {}",
            conflict.segment_id, conflict.first, conflict.second
        ))
    })?;
    let obstacles = Obstacles {
        segments: occupancy
            .into_iter()
            .filter(|(_, vehicle)| !moving.contains(vehicle))
            .map(|(segment, _)| segment)
            .collect(),
        nodes: state
            .blocked_nodes(puzzle)
            .into_iter()
            .filter(|(_, vehicle)| !moving.contains(vehicle))
            .map(|(node, _)| node)
            .collect(),
    };

    let cut = tail_cut(&path)?;
    let remaining = &path[cut..];

    let mut switch_states = state.switch_states.clone();
    let head = path[path.len() - 1].to_state();
    let appended = advance_head(
        puzzle,
        &state.turntable_states,
        &mut switch_states,
        head,
        &obstacles,
        remaining,
    )?;

    let mut new_path = remaining.to_vec();
    new_path.extend(appended);
    let placements = assign_to_vehicles(puzzle, &train, new_path)?;

    for (vehicle, placement) in placements {
        state.placements.insert(vehicle, placement);
    }
    state.switch_states = switch_states;
    Ok(())
}

/// Vehicles reachable from `engine` through couplings, in breadth-first order
///
/// The component must form a simple path: no vehicle linked to more than two
/// others and, for more than one vehicle, exactly two endpoints.
pub fn coupled_component(
    state: &PuzzleState,
    engine: VehicleId,
) -> Result<Vec<VehicleId>, MoveFailure> {
    let mut graph = UnGraphMap::<VehicleId, ()>::new();
    graph.add_node(engine);
    for (vehicle, links) in &state.couplings {
        for link in [links.back, links.front].into_iter().flatten() {
            graph.add_edge(*vehicle, link.other_vehicle, ());
        }
    }

    let mut component = Vec::new();
    let mut bfs = Bfs::new(&graph, engine);
    while let Some(vehicle) = bfs.next(&graph) {
        component.push(vehicle);
    }

    let mut endpoints = 0;
    for vehicle in &component {
        // Slots catch a double link between one pair; neighbours catch
        // vehicles claimed by more than two others.
        let slots = state.couplings.get(vehicle).map_or(0, |c| c.degree());
        let degree = slots.max(graph.neighbors(*vehicle).count());
        if degree > 2 {
            return Err(MoveFailure::new(
                MoveError::NonLinearTrain,
                format!("train is not linear: vehicle {vehicle} branches"),
            ));
        }
        if slots <= 1 {
            endpoints += 1;
        }
    }

    if component.len() > 1 && endpoints != 2 {
        return Err(MoveFailure::new(
            MoveError::NonLinearTrain,
            "train is not a simple chain (cycle or disconnected coupling data)",
        ));
    }
    Ok(component)
}

/// Orders the component tail to head for a move in `direction`
pub fn orient_train(
    state: &PuzzleState,
    engine: VehicleId,
    direction: EngineDirection,
    component: &[VehicleId],
) -> Result<OrientedTrain, MoveFailure> {
    let non_linear = |reason: &str| {
        MoveFailure::new(
            MoveError::NonLinearTrain,
            format!("train ordering failed: {reason}"),
        )
    };

    // Walk tailward from the engine. The end we arrive through faces the head.
    let mut current = engine;
    let mut head_end = direction.head_end();
    let mut steps = 0;
    while let Some(link) = state.coupling(current, head_end.opposite()) {
        steps += 1;
        if steps > component.len() {
            return Err(non_linear("possible cycle behind the engine"));
        }
        current = link.other_vehicle;
        head_end = link.other_end;
    }

    // Walk headward from the tail-most vehicle.
    let mut vehicles = Vec::with_capacity(component.len());
    let mut seen = HashSet::new();
    loop {
        if !seen.insert(current) {
            return Err(non_linear("possible cycle"));
        }
        vehicles.push((current, head_end));
        let Some(link) = state.coupling(current, head_end) else {
            break;
        };
        current = link.other_vehicle;
        head_end = link.other_end.opposite();
    }

    let train = OrientedTrain { vehicles };
    if train.vehicles.len() != component.len()
        || !component.iter().all(|vehicle| train.contains(*vehicle))
    {
        return Err(non_linear("ordered chain does not cover the coupled vehicles"));
    }
    Ok(train)
}

fn check_power(puzzle: &ShuntingPuzzle, train: &OrientedTrain) -> Result<(), MoveFailure> {
    let mut total_weight = 0u64;
    let mut total_power = 0u64;
    for (vehicle, head_end) in &train.vehicles {
        let spec = puzzle.rolling_stock(*vehicle).ok_or_else(|| {
            MoveFailure::new(
                MoveError::UnknownVehicle,
                format!("unknown vehicle id {vehicle}"),
            )
        })?;
        total_weight += u64::from(spec.weight());
        if spec.is_engine() {
            total_power += u64::from(spec.power_toward(*head_end));
        }
    }

    if total_power < total_weight {
        return Err(MoveFailure::new(
            MoveError::InsufficientPower,
            format!("insufficient power: {total_power} < {total_weight}"),
        ));
    }
    Ok(())
}

/// The whole train as one tail-to-head edge path
fn flatten(
    state: &PuzzleState,
    train: &OrientedTrain,
) -> Result<Vec<DirectedTrackEdge>, MoveFailure> {
    let mut path = Vec::new();
    for (vehicle, head_end) in &train.vehicles {
        let placement = state.placements.get(vehicle).ok_or_else(|| {
            MoveFailure::invalid_state(format!("vehicle {vehicle} has no placement"))
        })?;
        path.extend(placement.edges_toward(*head_end));
    }

    if let Some(index) = find_discontinuity(&path) {
        return Err(MoveFailure::new(
            MoveError::Unknown,
            format!("internal invariant violated: train path breaks at edge {index}"),
        ));
    }
    if path.is_empty() {
        return Err(MoveFailure::invalid_state("train has no track edges"));
    }
    Ok(path)
}

/// Number of leading edges the tail gives up: one unit of distance, plus
/// any zero-distance edges right behind it
fn tail_cut(path: &[DirectedTrackEdge]) -> Result<usize, MoveFailure> {
    let mut cut = 0;
    let mut consumed = 0;
    while consumed < 1 {
        let edge = path.get(cut).ok_or_else(|| {
            MoveFailure::invalid_state("train is shorter than one distance unit")
        })?;
        consumed += edge.distance;
        cut += 1;
    }
    while path.get(cut).is_some_and(|edge| edge.distance == 0) {
        cut += 1;
    }
    Ok(cut)
}

/// Segments and nodes held by vehicles outside the moving train
struct Obstacles {
    segments: HashSet<String>,
    nodes: HashSet<GridPoint>,
}

/// Extends the head by one unit of distance and returns the new edges
///
/// Curves are free: the head keeps taking zero-distance edges after the
/// budget is spent and stops only before an edge that costs distance.
/// Every junction with two or more options springs to its next option
/// once the head has passed.
fn advance_head(
    puzzle: &ShuntingPuzzle,
    turntable_states: &BTreeMap<String, usize>,
    switch_states: &mut BTreeMap<TrackState, usize>,
    head: TrackState,
    obstacles: &Obstacles,
    remaining_train: &[DirectedTrackEdge],
) -> Result<Vec<DirectedTrackEdge>, MoveFailure> {
    let topology = puzzle.topology();
    let mut own_segments: HashSet<String> = remaining_train
        .iter()
        .map(|edge| edge.segment_id.clone())
        .collect();
    let mut visited = HashSet::new();
    let mut appended = Vec::new();
    let mut cursor = head;
    let mut budget = 1u32;

    loop {
        let options = topology.outgoing_edges(&cursor, turntable_states);
        if options.is_empty() {
            if budget == 0 {
                break;
            }
            return Err(MoveFailure::new(
                MoveError::NoTrackAhead,
                format!("no track ahead of {cursor}"),
            ));
        }

        let index = if options.len() > 1 {
            switch_states.get(&cursor).copied().unwrap_or(0)
        } else {
            0
        };
        let Some(edge) = options.get(index) else {
            return Err(MoveFailure::new(
                MoveError::InvalidSwitch,
                format!(
                    "switch index {index} at {cursor} is out of range ({} options)",
                    options.len()
                ),
            ));
        };

        if budget == 0 && edge.distance != 0 {
            break;
        }
        if !visited.insert((cursor, budget)) {
            return Err(MoveFailure::new(
                MoveError::LoopDetected,
                format!("routing cycle through {cursor}"),
            ));
        }

        if obstacles.segments.contains(&edge.segment_id) {
            return Err(MoveFailure::new(
                MoveError::Collision,
                format!("collision on segment '{}'", edge.segment_id),
            ));
        }
        if obstacles.nodes.contains(&edge.from_node) || obstacles.nodes.contains(&edge.to_node) {
            return Err(MoveFailure::new(
                MoveError::Collision,
                format!(
                    "segment '{}' passes a node blocked by a long vehicle",
                    edge.segment_id
                ),
            ));
        }
        if !own_segments.insert(edge.segment_id.clone()) {
            return Err(MoveFailure::new(
                MoveError::LoopDetected,
                format!("train would run into itself on segment '{}'", edge.segment_id),
            ));
        }

        if options.len() >= 2 {
            let next = (index + 1) % options.len();
            debug!("switch at {cursor} springs from option {index} to {next}");
            switch_states.insert(cursor, next);
        }

        budget = budget.saturating_sub(edge.distance);
        cursor = edge.to_state();
        appended.push(edge.clone());
    }

    Ok(appended)
}

/// Splits a tail-to-head path back into per-vehicle placements
///
/// Each vehicle takes edges until it covers its length in unit segments;
/// trailing zero-distance edges go to the head-most vehicle.
fn assign_to_vehicles(
    puzzle: &ShuntingPuzzle,
    train: &OrientedTrain,
    path: Vec<DirectedTrackEdge>,
) -> Result<Vec<(VehicleId, VehiclePlacement)>, MoveFailure> {
    let mut edges_iter = path.into_iter();
    let mut placements = Vec::with_capacity(train.vehicles.len());
    let last = train.vehicles.len().saturating_sub(1);

    for (position, (vehicle, head_end)) in train.vehicles.iter().enumerate() {
        let length = puzzle
            .rolling_stock(*vehicle)
            .map(|spec| spec.length())
            .ok_or_else(|| MoveFailure::invalid_state(format!("unknown vehicle id {vehicle}")))?;

        let mut edges = Vec::new();
        let mut units = 0;
        while units < length {
            let Some(edge) = edges_iter.next() else {
                break;
            };
            units += edge.distance;
            edges.push(edge);
        }
        if units != length {
            return Err(MoveFailure::invalid_state(format!(
                "unable to assign {length} unit segments to vehicle {vehicle}"
            )));
        }

        if position == last {
            for edge in edges_iter.by_ref() {
                if edge.distance != 0 {
                    return Err(MoveFailure::invalid_state(format!(
                        "unexpected extra unit segment '{}' after assigning all vehicles",
                        edge.segment_id
                    )));
                }
                edges.push(edge);
            }
        }

        let edges = match head_end {
            VehicleEnd::Front => edges,
            VehicleEnd::Back => edges.iter().rev().map(DirectedTrackEdge::reverse).collect(),
        };
        let placement = VehiclePlacement::new(edges).map_err(|err| {
            MoveFailure::new(
                MoveError::Unknown,
                format!("internal invariant violated for vehicle {vehicle}: {err}"),
            )
        })?;
        placements.push((*vehicle, placement));
    }

    Ok(placements)
}
