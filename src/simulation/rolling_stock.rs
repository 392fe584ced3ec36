//! Rolling stock definitions

use super::error::DefinitionError;
use super::types::{VehicleEnd, VehicleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingStockKind {
    Car,
    Engine {
        forward_power: u32,
        backward_power: u32,
    },
}

/// Immutable definition of one vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollingStockSpec {
    id: VehicleId,
    /// Length in unit segments (edges with distance 1)
    length: u32,
    weight: u32,
    kind: RollingStockKind,
}

impl RollingStockSpec {
    pub fn car(id: u32, length: u32, weight: u32) -> Result<Self, DefinitionError> {
        Self::new(id, length, weight, RollingStockKind::Car)
    }

    pub fn engine(
        id: u32,
        length: u32,
        weight: u32,
        forward_power: u32,
        backward_power: u32,
    ) -> Result<Self, DefinitionError> {
        Self::new(
            id,
            length,
            weight,
            RollingStockKind::Engine {
                forward_power,
                backward_power,
            },
        )
    }

    fn new(
        id: u32,
        length: u32,
        weight: u32,
        kind: RollingStockKind,
    ) -> Result<Self, DefinitionError> {
        if length == 0 {
            return Err(DefinitionError::InvalidRollingStock {
                id,
                reason: "length must be positive".to_string(),
            });
        }
        Ok(Self {
            id: VehicleId(id),
            length,
            weight,
            kind,
        })
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn kind(&self) -> RollingStockKind {
        self.kind
    }

    pub fn forward_power(&self) -> u32 {
        match self.kind {
            RollingStockKind::Engine { forward_power, .. } => forward_power,
            RollingStockKind::Car => 0,
        }
    }

    pub fn backward_power(&self) -> u32 {
        match self.kind {
            RollingStockKind::Engine { backward_power, .. } => backward_power,
            RollingStockKind::Car => 0,
        }
    }

    /// An engine with both powers at zero is just a heavy car
    pub fn is_engine(&self) -> bool {
        self.forward_power() != 0 || self.backward_power() != 0
    }

    /// Power contributed when `head_end` faces the head of the train
    pub fn power_toward(&self, head_end: VehicleEnd) -> u32 {
        match head_end {
            VehicleEnd::Front => self.forward_power(),
            VehicleEnd::Back => self.backward_power(),
        }
    }
}
