//! Immutable puzzle definition

use std::collections::BTreeMap;

use super::error::DefinitionError;
use super::goal::Goal;
use super::rolling_stock::RollingStockSpec;
use super::state::PuzzleState;
use super::topology::TrackTopology;
use super::types::VehicleId;

/// Track, rolling stock, starting state and goal
#[derive(Debug, Clone)]
pub struct ShuntingPuzzle {
    topology: TrackTopology,
    rolling_stock: BTreeMap<VehicleId, RollingStockSpec>,
    initial_state: PuzzleState,
    goal: Goal,
}

impl ShuntingPuzzle {
    pub fn new(
        topology: TrackTopology,
        rolling_stock: Vec<RollingStockSpec>,
        initial_state: PuzzleState,
        goal: Goal,
    ) -> Result<Self, DefinitionError> {
        let mut by_id = BTreeMap::new();
        for spec in rolling_stock {
            let id = spec.id();
            if by_id.insert(id, spec).is_some() {
                return Err(DefinitionError::DuplicateRollingStock(id.0));
            }
        }

        if let Some(unknown) = goal
            .segment_goals
            .iter()
            .find(|g| !topology.is_known_segment(&g.segment_id))
        {
            return Err(DefinitionError::UnknownGoalSegment(unknown.segment_id.clone()));
        }

        Ok(Self {
            topology,
            rolling_stock: by_id,
            initial_state,
            goal,
        })
    }

    pub fn topology(&self) -> &TrackTopology {
        &self.topology
    }

    pub fn rolling_stock(&self, id: VehicleId) -> Option<&RollingStockSpec> {
        self.rolling_stock.get(&id)
    }

    /// Rolling stock ordered by id
    pub fn all_rolling_stock(&self) -> impl Iterator<Item = &RollingStockSpec> {
        self.rolling_stock.values()
    }

    pub fn initial_state(&self) -> &PuzzleState {
        &self.initial_state
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    /// A state whose occupancy is not even well defined never counts as solved
    pub fn is_solved(&self, state: &PuzzleState) -> bool {
        state
            .segment_occupancy()
            .is_ok_and(|occupancy| self.goal.is_satisfied(&occupancy))
    }
}
