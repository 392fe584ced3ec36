//! Built-in demo puzzle: shunt a car into a siding
//!
//! ```text
//!             B0
//!             |
//!            /
//! A0--A1--(2,0)--A2--A3
//! ```
//!
//! The engine (1) starts on A0 pushing the car (0) on A1. The car must end
//! up on B0 with the engine back on A0 and A1 clear.

use super::error::DefinitionError;
use super::geometry::{Direction, GridPoint};
use super::goal::{Goal, SegmentGoal};
use super::history::SolutionHistory;
use super::moves::Move;
use super::puzzle::ShuntingPuzzle;
use super::rolling_stock::RollingStockSpec;
use super::state::{PuzzleState, VehiclePlacement};
use super::topology::TrackTopology;
use super::track::{CurveBias, TrackSegment, TrackState};
use super::types::{EngineDirection, VehicleEnd, VehicleId};
use super::verifier::Solution;

pub const SAMPLE_CAR: VehicleId = VehicleId(0);
pub const SAMPLE_ENGINE: VehicleId = VehicleId(1);

/// The switch in front of the siding
pub fn sample_switch() -> TrackState {
    TrackState::new(GridPoint::new(2, 0), Direction::East)
}

pub fn sample_puzzle() -> Result<ShuntingPuzzle, DefinitionError> {
    let p = GridPoint::new;
    let segments = vec![
        TrackSegment::straight("A0", p(0, 0), p(1, 0))?,
        TrackSegment::straight("A1", p(1, 0), p(2, 0))?,
        TrackSegment::straight("A2", p(2, 0), p(3, 0))?,
        TrackSegment::straight("A3", p(3, 0), p(4, 0))?,
        TrackSegment::curved("C0", p(2, 0), p(3, 1), CurveBias::XFirst)?,
        TrackSegment::straight("B0", p(3, 1), p(3, 2))?,
    ];
    let a0 = segments[0].directed_edges()[0].clone();
    let a1 = segments[1].directed_edges()[0].clone();
    let topology = TrackTopology::new(segments, Vec::new())?;

    let mut initial = PuzzleState::new();
    initial
        .placements
        .insert(SAMPLE_ENGINE, VehiclePlacement::new(vec![a0])?);
    initial
        .placements
        .insert(SAMPLE_CAR, VehiclePlacement::new(vec![a1])?);
    initial.couple(SAMPLE_ENGINE, VehicleEnd::Front, SAMPLE_CAR, VehicleEnd::Back);

    let rolling_stock = vec![
        RollingStockSpec::car(SAMPLE_CAR.0, 1, 1)?,
        RollingStockSpec::engine(SAMPLE_ENGINE.0, 1, 1, 2, 2)?,
    ];
    let goal = Goal::new(vec![
        SegmentGoal::occupied_by("B0", [SAMPLE_CAR]),
        SegmentGoal::occupied_by("A0", [SAMPLE_ENGINE]),
        SegmentGoal::empty("A1"),
    ]);

    ShuntingPuzzle::new(topology, rolling_stock, initial, goal)
}

/// Set the switch, push the car into the siding, uncouple, back away
pub fn sample_solution() -> Solution {
    Solution::new(vec![
        Move::ToggleSwitch(sample_switch()),
        Move::MoveEngine {
            engine: SAMPLE_ENGINE,
            direction: EngineDirection::Forward,
        },
        Move::ToggleCoupling {
            vehicle: SAMPLE_CAR,
            end: VehicleEnd::Back,
        },
        Move::MoveEngine {
            engine: SAMPLE_ENGINE,
            direction: EngineDirection::Backward,
        },
    ])
}

/// A two-version history: an empty first attempt, then the reference solution
pub fn sample_history() -> SolutionHistory {
    let mut history = SolutionHistory::new(Solution::default());
    history.add(sample_solution());
    history
}
