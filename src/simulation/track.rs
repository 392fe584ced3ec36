//! Track states, directed edges and physical track segments

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::error::DefinitionError;
use super::geometry::{Direction, GridPoint};

/// Arrived at `node` travelling with `heading`
///
/// This is the key for switch selections and outgoing-edge lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackState {
    pub node: GridPoint,
    pub heading: Direction,
}

impl TrackState {
    pub fn new(node: GridPoint, heading: Direction) -> Self {
        Self { node, heading }
    }
}

impl std::fmt::Display for TrackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} heading {:?}", self.node, self.heading)
    }
}

/// One directed traversal of a track segment
///
/// `distance` is the traversal cost in unit lengths: 1 for straight track and
/// turntable bridge units, 0 for curves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectedTrackEdge {
    pub segment_id: String,
    pub from_node: GridPoint,
    pub to_node: GridPoint,
    pub entry_heading: Direction,
    pub exit_heading: Direction,
    pub distance: u32,
}

impl DirectedTrackEdge {
    pub fn from_state(&self) -> TrackState {
        TrackState::new(self.from_node, self.entry_heading)
    }

    pub fn to_state(&self) -> TrackState {
        TrackState::new(self.to_node, self.exit_heading)
    }

    pub fn is_straight(&self) -> bool {
        self.entry_heading == self.exit_heading
    }

    /// The same physical segment traversed the other way
    pub fn reverse(&self) -> DirectedTrackEdge {
        DirectedTrackEdge {
            segment_id: self.segment_id.clone(),
            from_node: self.to_node,
            to_node: self.from_node,
            entry_heading: self.exit_heading.opposite(),
            exit_heading: self.entry_heading.opposite(),
            distance: self.distance,
        }
    }

    /// Switch option order: straight before curved, then exit heading, then
    /// segment id (ordinal). Switch indices depend on this order.
    pub fn option_order(&self, other: &DirectedTrackEdge) -> Ordering {
        other
            .is_straight()
            .cmp(&self.is_straight())
            .then_with(|| self.exit_heading.cmp(&other.exit_heading))
            .then_with(|| self.segment_id.cmp(&other.segment_id))
    }
}

/// Total distance of an edge path
pub fn path_distance(edges: &[DirectedTrackEdge]) -> u32 {
    edges.iter().map(|edge| edge.distance).sum()
}

/// Index of the first edge that does not continue from its predecessor
pub fn find_discontinuity(edges: &[DirectedTrackEdge]) -> Option<usize> {
    edges
        .windows(2)
        .position(|pair| pair[0].to_state() != pair[1].from_state())
        .map(|index| index + 1)
}

/// Which axis a curve turns off first when traversed from `a` to `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveBias {
    XFirst,
    YFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    Straight,
    Curved(CurveBias),
}

/// A physical piece of track between two grid nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSegment {
    id: String,
    a: GridPoint,
    b: GridPoint,
    shape: SegmentShape,
    edges: [DirectedTrackEdge; 2],
}

impl TrackSegment {
    /// A straight piece between orthogonally adjacent nodes
    pub fn straight(
        id: impl Into<String>,
        a: GridPoint,
        b: GridPoint,
    ) -> Result<Self, DefinitionError> {
        let id = Self::checked_id(id.into(), a, b)?;
        let (dx, dy) = a.delta_to(b);
        let unit = i32::try_from(dx).ok().zip(i32::try_from(dy).ok());
        let Some(heading) = unit.and_then(|(dx, dy)| Direction::from_offset(dx, dy)) else {
            return Err(DefinitionError::StraightNotAdjacent(id));
        };
        Ok(Self::with_headings(id, a, b, SegmentShape::Straight, heading, heading))
    }

    /// A quarter curve between diagonally adjacent nodes
    pub fn curved(
        id: impl Into<String>,
        a: GridPoint,
        b: GridPoint,
        bias: CurveBias,
    ) -> Result<Self, DefinitionError> {
        let id = Self::checked_id(id.into(), a, b)?;
        let (dx, dy) = a.delta_to(b);
        if dx.abs() != 1 || dy.abs() != 1 {
            return Err(DefinitionError::CurveNotDiagonal(id));
        }

        let x_dir = if dx > 0 { Direction::East } else { Direction::West };
        let y_dir = if dy > 0 { Direction::North } else { Direction::South };
        let (entry, exit) = match bias {
            CurveBias::XFirst => (x_dir, y_dir),
            CurveBias::YFirst => (y_dir, x_dir),
        };
        Ok(Self::with_headings(id, a, b, SegmentShape::Curved(bias), entry, exit))
    }

    fn checked_id(id: String, a: GridPoint, b: GridPoint) -> Result<String, DefinitionError> {
        if id.trim().is_empty() {
            return Err(DefinitionError::EmptySegmentId);
        }
        if a == b {
            return Err(DefinitionError::DegenerateSegment(id));
        }
        Ok(id)
    }

    fn with_headings(
        id: String,
        a: GridPoint,
        b: GridPoint,
        shape: SegmentShape,
        entry: Direction,
        exit: Direction,
    ) -> Self {
        let distance = match shape {
            SegmentShape::Straight => 1,
            SegmentShape::Curved(_) => 0,
        };
        let forward = DirectedTrackEdge {
            segment_id: id.clone(),
            from_node: a,
            to_node: b,
            entry_heading: entry,
            exit_heading: exit,
            distance,
        };
        let backward = forward.reverse();
        Self {
            id,
            a,
            b,
            shape,
            edges: [forward, backward],
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn a(&self) -> GridPoint {
        self.a
    }

    pub fn b(&self) -> GridPoint {
        self.b
    }

    pub fn shape(&self) -> SegmentShape {
        self.shape
    }

    pub fn distance(&self) -> u32 {
        self.edges[0].distance
    }

    /// The a-to-b edge followed by its reverse
    pub fn directed_edges(&self) -> &[DirectedTrackEdge; 2] {
        &self.edges
    }
}
