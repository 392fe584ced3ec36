//! Core identifier and orientation types for the shunting simulation

use serde::{Deserialize, Serialize};

/// Identifier of a piece of rolling stock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u32);

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two ends of a vehicle, relative to its own placement
///
/// Front and Back are not compass directions: the front is wherever the
/// last edge of the placement ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleEnd {
    Back,
    Front,
}

impl VehicleEnd {
    pub const BOTH: [VehicleEnd; 2] = [VehicleEnd::Back, VehicleEnd::Front];

    pub fn opposite(self) -> VehicleEnd {
        match self {
            VehicleEnd::Back => VehicleEnd::Front,
            VehicleEnd::Front => VehicleEnd::Back,
        }
    }
}

/// Which end of the engine leads the train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineDirection {
    Forward,
    Backward,
}

impl EngineDirection {
    /// The engine end that becomes the head of the train
    pub fn head_end(self) -> VehicleEnd {
        match self {
            EngineDirection::Forward => VehicleEnd::Front,
            EngineDirection::Backward => VehicleEnd::Back,
        }
    }
}
