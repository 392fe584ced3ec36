//! Turntables: rotating bridges between pairs of ports
//!
//! A turntable occupies the square `center ± radius`. Ports sit on the border
//! with an outbound heading pointing away from the table. Each alignment
//! joins two opposite ports on a center line and is realised as a straight
//! bridge of `2 * radius` unit edges through the center.

use serde::{Deserialize, Serialize};

use super::error::DefinitionError;
use super::geometry::{Direction, GridPoint};
use super::track::DirectedTrackEdge;

/// Prefix shared by every turntable bridge segment id
pub const TURNTABLE_SEGMENT_PREFIX: &str = "Turntable:";

/// Largest accepted radius; a bridge spans `2 * radius` unit edges
pub const MAX_TURNTABLE_RADIUS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurntablePort {
    pub point: GridPoint,
    pub outbound_direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurntableAlignment {
    pub port_a_index: usize,
    pub port_b_index: usize,
}

#[derive(Debug, Clone)]
pub struct Turntable {
    id: String,
    center: GridPoint,
    radius: u32,
    ports: Vec<TurntablePort>,
    alignments: Vec<TurntableAlignment>,
    /// Bridge edges (both directions) for each alignment
    bridges: Vec<Vec<DirectedTrackEdge>>,
}

impl Turntable {
    pub fn new(
        id: impl Into<String>,
        center: GridPoint,
        radius: u32,
        ports: Vec<TurntablePort>,
        alignments: Vec<TurntableAlignment>,
    ) -> Result<Self, DefinitionError> {
        let id = id.into();
        let fail = |reason: String| DefinitionError::InvalidTurntable {
            id: id.clone(),
            reason,
        };

        if id.trim().is_empty() {
            return Err(fail("id must be non-empty".to_string()));
        }
        if radius == 0 {
            return Err(fail("radius must be positive".to_string()));
        }
        if radius > MAX_TURNTABLE_RADIUS {
            return Err(fail(format!(
                "radius {radius} exceeds the maximum of {MAX_TURNTABLE_RADIUS}"
            )));
        }
        if ports.len() < 2 {
            return Err(fail("at least 2 ports are required".to_string()));
        }
        if alignments.is_empty() {
            return Err(fail("at least 1 alignment is required".to_string()));
        }

        let r = i64::from(radius);
        for (i, port) in ports.iter().enumerate() {
            let (dx, dy) = center.delta_to(port.point);
            let on_border = dx.abs() <= r && dy.abs() <= r && (dx.abs() == r || dy.abs() == r);
            if !on_border {
                return Err(fail(format!("port {i} is not on the border")));
            }

            let east_west = if dx > 0 { Direction::East } else { Direction::West };
            let north_south = if dy > 0 { Direction::North } else { Direction::South };
            let outward = (dx.abs() == r && port.outbound_direction == east_west)
                || (dy.abs() == r && port.outbound_direction == north_south);
            if !outward {
                return Err(fail(format!("port {i} does not point outward")));
            }
        }

        let mut table = Self {
            id: id.clone(),
            center,
            radius,
            ports,
            alignments,
            bridges: Vec::new(),
        };

        let mut bridges = Vec::with_capacity(table.alignments.len());
        for (i, alignment) in table.alignments.iter().enumerate() {
            let a = alignment.port_a_index;
            let b = alignment.port_b_index;
            if a >= table.ports.len() || b >= table.ports.len() {
                return Err(fail(format!("alignment {i} references a missing port")));
            }
            if a == b {
                return Err(fail(format!("alignment {i} must join two different ports")));
            }
            let bridge = table
                .build_bridge(table.ports[a], table.ports[b])
                .map_err(|reason| fail(format!("alignment {i}: {reason}")))?;
            bridges.push(bridge);
        }
        table.bridges = bridges;

        Ok(table)
    }

    /// Straight bridge between two opposite center-line ports, as unit edges
    fn build_bridge(
        &self,
        a: TurntablePort,
        b: TurntablePort,
    ) -> Result<Vec<DirectedTrackEdge>, String> {
        let horizontal = |p: &TurntablePort| {
            p.point.y == self.center.y && p.outbound_direction.is_horizontal()
        };
        let vertical = |p: &TurntablePort| {
            p.point.x == self.center.x && !p.outbound_direction.is_horizontal()
        };

        let (start, end, heading) = if horizontal(&a) && horizontal(&b) {
            if a.point.x == b.point.x {
                return Err("ports must be on opposite sides".to_string());
            }
            let (lo, hi) = (a.point.x.min(b.point.x), a.point.x.max(b.point.x));
            (
                GridPoint::new(lo, self.center.y),
                GridPoint::new(hi, self.center.y),
                Direction::East,
            )
        } else if vertical(&a) && vertical(&b) {
            if a.point.y == b.point.y {
                return Err("ports must be on opposite sides".to_string());
            }
            let (lo, hi) = (a.point.y.min(b.point.y), a.point.y.max(b.point.y));
            (
                GridPoint::new(self.center.x, lo),
                GridPoint::new(self.center.x, hi),
                Direction::North,
            )
        } else {
            return Err("ports must both lie on the same center line".to_string());
        };

        let (dx, dy) = start.delta_to(end);
        let length = dx + dy;
        if length != 2 * i64::from(self.radius) {
            return Err(format!("bridge length {length} must be 2 * radius"));
        }

        let units = self.bridge_unit_count();
        let mut edges = Vec::with_capacity(2 * units);
        let mut node = start;
        for i in 0..units {
            let next = node.offset(heading);
            let forward = DirectedTrackEdge {
                segment_id: self.bridge_segment_id(i),
                from_node: node,
                to_node: next,
                entry_heading: heading,
                exit_heading: heading,
                distance: 1,
            };
            let backward = forward.reverse();
            edges.push(forward);
            edges.push(backward);
            node = next;
        }
        Ok(edges)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn center(&self) -> GridPoint {
        self.center
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn ports(&self) -> &[TurntablePort] {
        &self.ports
    }

    pub fn alignments(&self) -> &[TurntableAlignment] {
        &self.alignments
    }

    pub fn alignment_count(&self) -> usize {
        self.alignments.len()
    }

    /// Stable id of the `index`-th bridge unit, shared by every alignment
    pub fn bridge_segment_id(&self, index: usize) -> String {
        format!("{}{}:{}", TURNTABLE_SEGMENT_PREFIX, self.id, index)
    }

    fn bridge_unit_count(&self) -> usize {
        2 * self.radius as usize
    }

    pub fn bridge_segment_ids(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.bridge_unit_count()).map(|i| self.bridge_segment_id(i))
    }

    /// Bridge edges in both directions for an alignment
    pub fn edges_for_alignment(&self, alignment: usize) -> Option<&[DirectedTrackEdge]> {
        self.bridges.get(alignment).map(Vec::as_slice)
    }

    /// True if `p` is inside the square footprint and not on its border
    pub fn contains_strictly(&self, p: GridPoint) -> bool {
        let r = i64::from(self.radius);
        let (dx, dy) = self.center.delta_to(p);
        dx.abs() < r && dy.abs() < r
    }
}
