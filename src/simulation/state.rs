//! Mutable puzzle state: switch selections, turntable alignments, vehicle
//! placements and couplings
//!
//! States are values. Moves clone before mutating and callers never see a
//! partially applied move.

use std::collections::BTreeMap;

use super::error::DefinitionError;
use super::geometry::{Direction, GridPoint};
use super::puzzle::ShuntingPuzzle;
use super::track::{find_discontinuity, path_distance, DirectedTrackEdge, TrackState};
use super::types::{VehicleEnd, VehicleId};

/// The path a vehicle occupies, stored back to front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehiclePlacement {
    edges: Vec<DirectedTrackEdge>,
}

impl VehiclePlacement {
    pub fn new(edges: Vec<DirectedTrackEdge>) -> Result<Self, DefinitionError> {
        if edges.is_empty() {
            return Err(DefinitionError::EmptyPlacement);
        }
        if let Some(index) = find_discontinuity(&edges) {
            return Err(DefinitionError::DiscontinuousPlacement {
                node: edges[index].from_node,
                index,
            });
        }
        Ok(Self { edges })
    }

    /// Back-to-front edges
    pub fn edges(&self) -> &[DirectedTrackEdge] {
        &self.edges
    }

    /// Number of unit segments covered (curves are free)
    pub fn unit_length(&self) -> u32 {
        path_distance(&self.edges)
    }

    pub fn back_state(&self) -> TrackState {
        self.edges[0].from_state()
    }

    pub fn front_state(&self) -> TrackState {
        self.edges[self.edges.len() - 1].to_state()
    }

    pub fn end_state(&self, end: VehicleEnd) -> TrackState {
        match end {
            VehicleEnd::Back => self.back_state(),
            VehicleEnd::Front => self.front_state(),
        }
    }

    pub fn end_node(&self, end: VehicleEnd) -> GridPoint {
        self.end_state(end).node
    }

    /// Heading pointing away from the vehicle at `end`
    pub fn outward_heading(&self, end: VehicleEnd) -> Direction {
        match end {
            VehicleEnd::Front => self.front_state().heading,
            VehicleEnd::Back => self.back_state().heading.opposite(),
        }
    }

    /// Heading pointing into the vehicle at `end`
    pub fn inward_heading(&self, end: VehicleEnd) -> Direction {
        match end {
            VehicleEnd::Back => self.back_state().heading,
            VehicleEnd::Front => self.front_state().heading.opposite(),
        }
    }

    /// Edges ordered so travel runs toward `head_end`
    pub fn edges_toward(&self, head_end: VehicleEnd) -> Vec<DirectedTrackEdge> {
        match head_end {
            VehicleEnd::Front => self.edges.clone(),
            VehicleEnd::Back => self.edges.iter().rev().map(DirectedTrackEdge::reverse).collect(),
        }
    }

    /// Nodes between consecutive edges of this placement
    pub fn internal_joints(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.edges[..self.edges.len() - 1]
            .iter()
            .map(|edge| edge.to_node)
    }
}

/// Link from one vehicle end to another vehicle's end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleCoupling {
    pub other_vehicle: VehicleId,
    pub other_end: VehicleEnd,
}

/// The (at most two) links of one vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VehicleCouplings {
    pub back: Option<VehicleCoupling>,
    pub front: Option<VehicleCoupling>,
}

impl VehicleCouplings {
    pub fn get(&self, end: VehicleEnd) -> Option<VehicleCoupling> {
        match end {
            VehicleEnd::Back => self.back,
            VehicleEnd::Front => self.front,
        }
    }

    pub fn set(&mut self, end: VehicleEnd, coupling: Option<VehicleCoupling>) {
        match end {
            VehicleEnd::Back => self.back = coupling,
            VehicleEnd::Front => self.front = coupling,
        }
    }

    pub fn degree(&self) -> usize {
        usize::from(self.back.is_some()) + usize::from(self.front.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.degree() == 0
    }
}

/// Two vehicles claim the same unit of track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyConflict {
    pub segment_id: String,
    pub first: VehicleId,
    pub second: VehicleId,
}

/// The simulated snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PuzzleState {
    pub switch_states: BTreeMap<TrackState, usize>,
    pub turntable_states: BTreeMap<String, usize>,
    pub placements: BTreeMap<VehicleId, VehiclePlacement>,
    pub couplings: BTreeMap<VehicleId, VehicleCouplings>,
}

impl PuzzleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coupling(&self, vehicle: VehicleId, end: VehicleEnd) -> Option<VehicleCoupling> {
        self.couplings.get(&vehicle).and_then(|c| c.get(end))
    }

    /// Sets or clears one side of a link; empty entries are dropped so that
    /// connect followed by disconnect compares equal to the original
    pub fn set_coupling(
        &mut self,
        vehicle: VehicleId,
        end: VehicleEnd,
        coupling: Option<VehicleCoupling>,
    ) {
        let entry = self.couplings.entry(vehicle).or_default();
        entry.set(end, coupling);
        if entry.is_empty() {
            self.couplings.remove(&vehicle);
        }
    }

    /// Links `a` at `a_end` with `b` at `b_end`, both directions
    pub fn couple(&mut self, a: VehicleId, a_end: VehicleEnd, b: VehicleId, b_end: VehicleEnd) {
        self.set_coupling(
            a,
            a_end,
            Some(VehicleCoupling {
                other_vehicle: b,
                other_end: b_end,
            }),
        );
        self.set_coupling(
            b,
            b_end,
            Some(VehicleCoupling {
                other_vehicle: a,
                other_end: a_end,
            }),
        );
    }

    /// Segment id to occupying vehicle, failing on the first shared segment
    pub fn segment_occupancy(&self) -> Result<BTreeMap<String, VehicleId>, OccupancyConflict> {
        let mut occupancy = BTreeMap::new();
        for (vehicle, placement) in &self.placements {
            for edge in placement.edges() {
                if let Some(first) = occupancy.insert(edge.segment_id.clone(), *vehicle) {
                    return Err(OccupancyConflict {
                        segment_id: edge.segment_id.clone(),
                        first,
                        second: *vehicle,
                    });
                }
            }
        }
        Ok(occupancy)
    }

    /// Internal joints of multi-unit vehicles, mapped to the blocking vehicle
    ///
    /// Vehicles missing from the puzzle's rolling stock are skipped; state
    /// validation reports them separately.
    pub fn blocked_nodes(&self, puzzle: &ShuntingPuzzle) -> BTreeMap<GridPoint, VehicleId> {
        let mut blocked = BTreeMap::new();
        for (vehicle, placement) in &self.placements {
            let Some(spec) = puzzle.rolling_stock(*vehicle) else {
                continue;
            };
            if spec.length() <= 1 {
                continue;
            }
            for node in placement.internal_joints() {
                blocked.entry(node).or_insert(*vehicle);
            }
        }
        blocked
    }
}
