//! Standalone shunting puzzle simulation
//!
//! Track topology, rolling stock and puzzle state, plus the move engine that
//! turns a state and a move into a new state or a typed failure. Nothing here
//! performs I/O; callers own storage and serialise access to a session.

mod engine;
mod error;
mod geometry;
mod goal;
mod history;
mod moves;
mod puzzle;
mod rolling_stock;
mod sample;
mod snapshot;
mod state;
mod topology;
mod track;
mod train;
mod turntable;
mod types;
mod validation;
mod verifier;

// Re-export public types for external use
pub use engine::apply_move;
pub use error::{DefinitionError, HistoryError, MoveError, MoveFailure, SnapshotError};
pub use geometry::{Direction, GridPoint};
pub use goal::{Goal, SegmentGoal};
pub use history::SolutionHistory;
pub use moves::Move;
pub use puzzle::ShuntingPuzzle;
pub use rolling_stock::{RollingStockKind, RollingStockSpec};
pub use sample::{
    sample_history, sample_puzzle, sample_solution, sample_switch, SAMPLE_CAR, SAMPLE_ENGINE,
};
pub use snapshot::{
    CouplingLinkSnapshot, CouplingSnapshot, GoalSnapshot, MoveRecord, PlacementSnapshot,
    PuzzleSnapshot, PuzzleStateSnapshot, RollingStockSpecSnapshot, SegmentGoalSnapshot,
    SegmentKind, SegmentSnapshot, SolutionHistorySnapshot, SolutionSnapshot, SwitchStateSnapshot,
    TrackLayoutSnapshot, TrackStateSnapshot, TurntableSnapshot, CURRENT_SCHEMA_VERSION,
};
pub use state::{
    OccupancyConflict, PuzzleState, VehicleCoupling, VehicleCouplings, VehiclePlacement,
};
pub use topology::{TrackTopology, MAX_SWITCH_OPTIONS};
pub use track::{
    find_discontinuity, path_distance, CurveBias, DirectedTrackEdge, SegmentShape, TrackSegment,
    TrackState,
};
pub use train::{coupled_component, orient_train, OrientedTrain};
pub use turntable::{
    Turntable, TurntableAlignment, TurntablePort, MAX_TURNTABLE_RADIUS, TURNTABLE_SEGMENT_PREFIX,
};
pub use types::{EngineDirection, VehicleEnd, VehicleId};
pub use validation::{occupancy_by_vehicle, validate_state};
pub use verifier::{verify, Solution, VerificationResult, VerifiedPuzzle, VerifiedPuzzleError};
