//! Versioned JSON snapshots of puzzles, states and solution histories
//!
//! Snapshots are plain serde structures with camelCase field names. They are
//! built from live values in id order so that a round trip compares equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::SnapshotError;
use super::geometry::{Direction, GridPoint};
use super::goal::{Goal, SegmentGoal};
use super::history::SolutionHistory;
use super::moves::Move;
use super::puzzle::ShuntingPuzzle;
use super::rolling_stock::{RollingStockKind, RollingStockSpec};
use super::state::{PuzzleState, VehicleCoupling, VehicleCouplings, VehiclePlacement};
use super::topology::TrackTopology;
use super::track::{CurveBias, DirectedTrackEdge, SegmentShape, TrackSegment, TrackState};
use super::turntable::{Turntable, TurntableAlignment, TurntablePort};
use super::types::{EngineDirection, VehicleEnd, VehicleId};
use super::verifier::Solution;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn check_schema_version(kind: &'static str, version: u32) -> Result<(), SnapshotError> {
    if version != CURRENT_SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedSchemaVersion { kind, version });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSnapshot {
    pub schema_version: u32,
    pub track: TrackLayoutSnapshot,
    pub rolling_stock: Vec<RollingStockSpecSnapshot>,
    pub initial_state: PuzzleStateSnapshot,
    pub goal: GoalSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_solution_history: Option<SolutionHistorySnapshot>,
}

impl PuzzleSnapshot {
    pub fn from_puzzle(
        puzzle: &ShuntingPuzzle,
        verified_solution_history: Option<SolutionHistorySnapshot>,
    ) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            track: TrackLayoutSnapshot::from_topology(puzzle.topology()),
            rolling_stock: puzzle
                .all_rolling_stock()
                .map(RollingStockSpecSnapshot::from_spec)
                .collect(),
            initial_state: PuzzleStateSnapshot::from_state(puzzle.initial_state()),
            goal: GoalSnapshot::from_goal(puzzle.goal()),
            verified_solution_history,
        }
    }

    pub fn to_puzzle(&self) -> Result<ShuntingPuzzle, SnapshotError> {
        check_schema_version("puzzle", self.schema_version)?;
        let topology = self.track.to_topology()?;
        let rolling_stock = self
            .rolling_stock
            .iter()
            .map(RollingStockSpecSnapshot::to_spec)
            .collect::<Result<Vec<_>, _>>()?;
        let initial_state = self.initial_state.to_state()?;
        let goal = self.goal.to_goal();
        Ok(ShuntingPuzzle::new(topology, rolling_stock, initial_state, goal)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        check_schema_version("puzzle", snapshot.schema_version)?;
        Ok(snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackLayoutSnapshot {
    pub segments: Vec<SegmentSnapshot>,
    #[serde(default)]
    pub turntables: Vec<TurntableSnapshot>,
}

impl TrackLayoutSnapshot {
    pub fn from_topology(topology: &TrackTopology) -> Self {
        Self {
            segments: topology.segments().map(SegmentSnapshot::from_segment).collect(),
            turntables: topology
                .turntables()
                .iter()
                .map(TurntableSnapshot::from_turntable)
                .collect(),
        }
    }

    pub fn to_topology(&self) -> Result<TrackTopology, SnapshotError> {
        let segments = self
            .segments
            .iter()
            .map(SegmentSnapshot::to_segment)
            .collect::<Result<Vec<_>, _>>()?;
        let turntables = self
            .turntables
            .iter()
            .map(TurntableSnapshot::to_turntable)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrackTopology::new(segments, turntables)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Straight,
    Curve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSnapshot {
    pub kind: SegmentKind,
    pub id: String,
    pub a: GridPoint,
    pub b: GridPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<CurveBias>,
}

impl SegmentSnapshot {
    pub fn from_segment(segment: &TrackSegment) -> Self {
        let (kind, bias) = match segment.shape() {
            SegmentShape::Straight => (SegmentKind::Straight, None),
            SegmentShape::Curved(bias) => (SegmentKind::Curve, Some(bias)),
        };
        Self {
            kind,
            id: segment.id().to_string(),
            a: segment.a(),
            b: segment.b(),
            bias,
        }
    }

    pub fn to_segment(&self) -> Result<TrackSegment, SnapshotError> {
        let segment = match (self.kind, self.bias) {
            (SegmentKind::Straight, _) => TrackSegment::straight(self.id.clone(), self.a, self.b)?,
            (SegmentKind::Curve, Some(bias)) => {
                TrackSegment::curved(self.id.clone(), self.a, self.b, bias)?
            }
            (SegmentKind::Curve, None) => {
                return Err(SnapshotError::MissingCurveBias(self.id.clone()))
            }
        };
        Ok(segment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurntableSnapshot {
    pub id: String,
    pub center: GridPoint,
    pub radius: u32,
    pub ports: Vec<TurntablePort>,
    pub alignments: Vec<TurntableAlignment>,
}

impl TurntableSnapshot {
    pub fn from_turntable(table: &Turntable) -> Self {
        Self {
            id: table.id().to_string(),
            center: table.center(),
            radius: table.radius(),
            ports: table.ports().to_vec(),
            alignments: table.alignments().to_vec(),
        }
    }

    pub fn to_turntable(&self) -> Result<Turntable, SnapshotError> {
        Ok(Turntable::new(
            self.id.clone(),
            self.center,
            self.radius,
            self.ports.clone(),
            self.alignments.clone(),
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingStockSpecSnapshot {
    pub id: u32,
    pub length: u32,
    pub weight: u32,
    pub is_engine: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_power: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backward_power: Option<u32>,
}

impl RollingStockSpecSnapshot {
    pub fn from_spec(spec: &RollingStockSpec) -> Self {
        let (is_engine, forward_power, backward_power) = match spec.kind() {
            RollingStockKind::Car => (false, None, None),
            RollingStockKind::Engine {
                forward_power,
                backward_power,
            } => (true, Some(forward_power), Some(backward_power)),
        };
        Self {
            id: spec.id().0,
            length: spec.length(),
            weight: spec.weight(),
            is_engine,
            forward_power,
            backward_power,
        }
    }

    pub fn to_spec(&self) -> Result<RollingStockSpec, SnapshotError> {
        let spec = if self.is_engine {
            RollingStockSpec::engine(
                self.id,
                self.length,
                self.weight,
                self.forward_power.unwrap_or(0),
                self.backward_power.unwrap_or(0),
            )?
        } else {
            RollingStockSpec::car(self.id, self.length, self.weight)?
        };
        Ok(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSnapshot {
    pub segment_goals: Vec<SegmentGoalSnapshot>,
}

impl GoalSnapshot {
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            segment_goals: goal
                .segment_goals
                .iter()
                .map(|g| SegmentGoalSnapshot {
                    segment_id: g.segment_id.clone(),
                    allowed_vehicle_ids: g
                        .allowed_vehicles
                        .as_ref()
                        .map(|ids| ids.iter().map(|id| id.0).collect()),
                })
                .collect(),
        }
    }

    pub fn to_goal(&self) -> Goal {
        Goal::new(
            self.segment_goals
                .iter()
                .map(|g| SegmentGoal {
                    segment_id: g.segment_id.clone(),
                    allowed_vehicles: g
                        .allowed_vehicle_ids
                        .as_ref()
                        .map(|ids| ids.iter().copied().map(VehicleId).collect()),
                })
                .collect(),
        )
    }
}

/// `allowedVehicleIds`: null means any vehicle, `[]` means must be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentGoalSnapshot {
    pub segment_id: String,
    #[serde(default)]
    pub allowed_vehicle_ids: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStateSnapshot {
    pub node_x: i32,
    pub node_y: i32,
    pub heading: Direction,
}

impl From<TrackState> for TrackStateSnapshot {
    fn from(state: TrackState) -> Self {
        Self {
            node_x: state.node.x,
            node_y: state.node.y,
            heading: state.heading,
        }
    }
}

impl From<TrackStateSnapshot> for TrackState {
    fn from(snapshot: TrackStateSnapshot) -> Self {
        TrackState::new(GridPoint::new(snapshot.node_x, snapshot.node_y), snapshot.heading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchStateSnapshot {
    pub state: TrackStateSnapshot,
    pub selected_option_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSnapshot {
    pub vehicle_id: u32,
    pub edges: Vec<DirectedTrackEdge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouplingLinkSnapshot {
    pub other_vehicle_id: u32,
    pub other_end: VehicleEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouplingSnapshot {
    pub vehicle_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<CouplingLinkSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<CouplingLinkSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStateSnapshot {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub switch_states: Vec<SwitchStateSnapshot>,
    #[serde(default)]
    pub turntable_states: BTreeMap<String, usize>,
    #[serde(default)]
    pub placements: Vec<PlacementSnapshot>,
    #[serde(default)]
    pub couplings: Vec<CouplingSnapshot>,
}

impl Default for PuzzleStateSnapshot {
    fn default() -> Self {
        Self::from_state(&PuzzleState::new())
    }
}

fn link_snapshot(link: Option<VehicleCoupling>) -> Option<CouplingLinkSnapshot> {
    link.map(|link| CouplingLinkSnapshot {
        other_vehicle_id: link.other_vehicle.0,
        other_end: link.other_end,
    })
}

fn link_from_snapshot(link: Option<CouplingLinkSnapshot>) -> Option<VehicleCoupling> {
    link.map(|link| VehicleCoupling {
        other_vehicle: VehicleId(link.other_vehicle_id),
        other_end: link.other_end,
    })
}

impl PuzzleStateSnapshot {
    pub fn from_state(state: &PuzzleState) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            switch_states: state
                .switch_states
                .iter()
                .map(|(switch, index)| SwitchStateSnapshot {
                    state: (*switch).into(),
                    selected_option_index: *index,
                })
                .collect(),
            turntable_states: state.turntable_states.clone(),
            placements: state
                .placements
                .iter()
                .map(|(vehicle, placement)| PlacementSnapshot {
                    vehicle_id: vehicle.0,
                    edges: placement.edges().to_vec(),
                })
                .collect(),
            couplings: state
                .couplings
                .iter()
                .map(|(vehicle, links)| CouplingSnapshot {
                    vehicle_id: vehicle.0,
                    front: link_snapshot(links.front),
                    back: link_snapshot(links.back),
                })
                .collect(),
        }
    }

    /// Rebuilds the state; links are taken as stored; validation happens
    /// when a move is applied
    pub fn to_state(&self) -> Result<PuzzleState, SnapshotError> {
        check_schema_version("state", self.schema_version)?;

        let mut state = PuzzleState::new();
        for switch in &self.switch_states {
            state
                .switch_states
                .insert(switch.state.into(), switch.selected_option_index);
        }
        state.turntable_states = self.turntable_states.clone();
        for placement in &self.placements {
            state.placements.insert(
                VehicleId(placement.vehicle_id),
                VehiclePlacement::new(placement.edges.clone())?,
            );
        }
        for coupling in &self.couplings {
            let links = VehicleCouplings {
                back: link_from_snapshot(coupling.back),
                front: link_from_snapshot(coupling.front),
            };
            if !links.is_empty() {
                state.couplings.insert(VehicleId(coupling.vehicle_id), links);
            }
        }
        Ok(state)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        check_schema_version("state", snapshot.schema_version)?;
        Ok(snapshot)
    }
}

/// Wire form of a single move, discriminated by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum MoveRecord {
    ToggleSwitch {
        node_x: i32,
        node_y: i32,
        heading: Direction,
    },
    ToggleCoupling {
        vehicle_id: u32,
        vehicle_end: VehicleEnd,
    },
    RotateTurntable {
        turntable_id: String,
    },
    MoveEngine {
        engine_id: u32,
        engine_direction: EngineDirection,
    },
}

impl From<&Move> for MoveRecord {
    fn from(mv: &Move) -> Self {
        match mv {
            Move::ToggleSwitch(state) => MoveRecord::ToggleSwitch {
                node_x: state.node.x,
                node_y: state.node.y,
                heading: state.heading,
            },
            Move::ToggleCoupling { vehicle, end } => MoveRecord::ToggleCoupling {
                vehicle_id: vehicle.0,
                vehicle_end: *end,
            },
            Move::RotateTurntable(id) => MoveRecord::RotateTurntable {
                turntable_id: id.clone(),
            },
            Move::MoveEngine { engine, direction } => MoveRecord::MoveEngine {
                engine_id: engine.0,
                engine_direction: *direction,
            },
        }
    }
}

impl From<&MoveRecord> for Move {
    fn from(record: &MoveRecord) -> Self {
        match record {
            MoveRecord::ToggleSwitch {
                node_x,
                node_y,
                heading,
            } => Move::ToggleSwitch(TrackState::new(GridPoint::new(*node_x, *node_y), *heading)),
            MoveRecord::ToggleCoupling {
                vehicle_id,
                vehicle_end,
            } => Move::ToggleCoupling {
                vehicle: VehicleId(*vehicle_id),
                end: *vehicle_end,
            },
            MoveRecord::RotateTurntable { turntable_id } => {
                Move::RotateTurntable(turntable_id.clone())
            }
            MoveRecord::MoveEngine {
                engine_id,
                engine_direction,
            } => Move::MoveEngine {
                engine: VehicleId(*engine_id),
                direction: *engine_direction,
            },
        }
    }
}

impl MoveRecord {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionSnapshot {
    pub moves: Vec<MoveRecord>,
}

impl SolutionSnapshot {
    pub fn from_solution(solution: &Solution) -> Self {
        Self {
            moves: solution.moves.iter().map(MoveRecord::from).collect(),
        }
    }

    pub fn to_solution(&self) -> Solution {
        Solution::new(self.moves.iter().map(Move::from).collect())
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionHistorySnapshot {
    pub schema_version: u32,
    pub current_version: usize,
    pub history: Vec<SolutionSnapshot>,
}

impl SolutionHistorySnapshot {
    pub fn from_history(history: &SolutionHistory) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            current_version: history.current_version(),
            history: history
                .all_versions()
                .iter()
                .map(SolutionSnapshot::from_solution)
                .collect(),
        }
    }

    pub fn to_history(&self) -> Result<SolutionHistory, SnapshotError> {
        check_schema_version("solution history", self.schema_version)?;
        if self.history.is_empty() {
            return Err(SnapshotError::InvalidHistory(
                "history must contain at least one version".to_string(),
            ));
        }
        let versions = self.history.iter().map(SolutionSnapshot::to_solution).collect();
        SolutionHistory::from_versions(versions, self.current_version).ok_or_else(|| {
            SnapshotError::InvalidHistory(format!(
                "current version {} is out of range (0..{})",
                self.current_version,
                self.history.len()
            ))
        })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        check_schema_version("solution history", snapshot.schema_version)?;
        Ok(snapshot)
    }
}
