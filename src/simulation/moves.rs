//! The closed set of player moves

use super::track::TrackState;
use super::types::{EngineDirection, VehicleEnd, VehicleId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    /// Cycle the selected option of the switch at this state
    ToggleSwitch(TrackState),
    /// Connect or disconnect one end of a vehicle
    ToggleCoupling { vehicle: VehicleId, end: VehicleEnd },
    /// Cycle a turntable to its next alignment
    RotateTurntable(String),
    /// Drive an engine (and everything coupled to it) one unit
    MoveEngine {
        engine: VehicleId,
        direction: EngineDirection,
    },
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::ToggleSwitch(state) => write!(f, "toggle switch at {state}"),
            Move::ToggleCoupling { vehicle, end } => {
                write!(f, "toggle coupling of vehicle {vehicle} at {end:?}")
            }
            Move::RotateTurntable(id) => write!(f, "rotate turntable '{id}'"),
            Move::MoveEngine { engine, direction } => {
                write!(f, "move engine {engine} {direction:?}")
            }
        }
    }
}
