//! Puzzle completion: per-segment occupancy constraints

use std::collections::{BTreeMap, BTreeSet};

use super::types::VehicleId;

/// Constraint on a single segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentGoal {
    pub segment_id: String,
    /// `None`: occupied by anyone. Empty: must be empty. Otherwise occupied
    /// by one of these vehicles.
    pub allowed_vehicles: Option<BTreeSet<VehicleId>>,
}

impl SegmentGoal {
    pub fn occupied(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            allowed_vehicles: None,
        }
    }

    pub fn empty(segment_id: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            allowed_vehicles: Some(BTreeSet::new()),
        }
    }

    pub fn occupied_by(
        segment_id: impl Into<String>,
        vehicles: impl IntoIterator<Item = VehicleId>,
    ) -> Self {
        Self {
            segment_id: segment_id.into(),
            allowed_vehicles: Some(vehicles.into_iter().collect()),
        }
    }

    pub fn is_satisfied(&self, occupancy: &BTreeMap<String, VehicleId>) -> bool {
        let occupant = occupancy.get(&self.segment_id);
        match &self.allowed_vehicles {
            None => occupant.is_some(),
            Some(allowed) if allowed.is_empty() => occupant.is_none(),
            Some(allowed) => occupant.is_some_and(|vehicle| allowed.contains(vehicle)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Goal {
    pub segment_goals: Vec<SegmentGoal>,
}

impl Goal {
    pub fn new(segment_goals: Vec<SegmentGoal>) -> Self {
        Self { segment_goals }
    }

    /// All constraints hold for the given occupancy map
    pub fn is_satisfied(&self, occupancy: &BTreeMap<String, VehicleId>) -> bool {
        self.segment_goals
            .iter()
            .all(|goal| goal.is_satisfied(occupancy))
    }
}
