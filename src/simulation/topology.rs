//! Track topology index
//!
//! Expands segments into directed edges, groups them by the state they leave
//! from and fixes the switch option order. Turntable edges are folded in per
//! query since they depend on the current alignments.

use std::collections::{BTreeMap, HashSet};

use super::error::DefinitionError;
use super::track::{DirectedTrackEdge, TrackSegment, TrackState};
use super::turntable::Turntable;

/// Real-world points have at most three throats
pub const MAX_SWITCH_OPTIONS: usize = 3;

#[derive(Debug, Clone)]
pub struct TrackTopology {
    segments: BTreeMap<String, TrackSegment>,
    turntables: Vec<Turntable>,
    static_outgoing: BTreeMap<TrackState, Vec<DirectedTrackEdge>>,
    bridge_segment_ids: HashSet<String>,
}

impl TrackTopology {
    pub fn new(
        segments: Vec<TrackSegment>,
        turntables: Vec<Turntable>,
    ) -> Result<Self, DefinitionError> {
        let mut by_id = BTreeMap::new();
        for segment in segments {
            if by_id.contains_key(segment.id()) {
                return Err(DefinitionError::DuplicateSegment(segment.id().to_string()));
            }
            by_id.insert(segment.id().to_string(), segment);
        }

        let mut turntable_ids = HashSet::new();
        for table in &turntables {
            if !turntable_ids.insert(table.id()) {
                return Err(DefinitionError::DuplicateTurntable(table.id().to_string()));
            }
            if let Some(segment) = by_id
                .values()
                .find(|s| table.contains_strictly(s.a()) || table.contains_strictly(s.b()))
            {
                return Err(DefinitionError::SegmentInsideTurntable {
                    segment: segment.id().to_string(),
                    turntable: table.id().to_string(),
                });
            }
        }

        let mut static_outgoing: BTreeMap<TrackState, Vec<DirectedTrackEdge>> = BTreeMap::new();
        for segment in by_id.values() {
            for edge in segment.directed_edges() {
                if edge.segment_id.trim().is_empty() {
                    return Err(DefinitionError::EmptySegmentId);
                }
                if edge.from_node == edge.to_node {
                    return Err(DefinitionError::SelfLoopEdge(edge.segment_id.clone()));
                }
                static_outgoing
                    .entry(edge.from_state())
                    .or_default()
                    .push(edge.clone());
            }
        }

        for (state, options) in static_outgoing.iter_mut() {
            options.sort_by(|a, b| a.option_order(b));
            if options.len() > MAX_SWITCH_OPTIONS {
                return Err(DefinitionError::TooManySwitchOptions {
                    state: *state,
                    count: options.len(),
                });
            }
        }

        let bridge_segment_ids: HashSet<String> = turntables
            .iter()
            .flat_map(|table| table.bridge_segment_ids())
            .collect();
        if let Some(clash) = by_id.keys().find(|id| bridge_segment_ids.contains(*id)) {
            return Err(DefinitionError::DuplicateSegment(clash.clone()));
        }

        Ok(Self {
            segments: by_id,
            turntables,
            static_outgoing,
            bridge_segment_ids,
        })
    }

    /// Segments ordered by id
    pub fn segments(&self) -> impl Iterator<Item = &TrackSegment> {
        self.segments.values()
    }

    pub fn segment(&self, id: &str) -> Option<&TrackSegment> {
        self.segments.get(id)
    }

    pub fn turntables(&self) -> &[Turntable] {
        &self.turntables
    }

    pub fn turntable(&self, id: &str) -> Option<&Turntable> {
        self.turntables.iter().find(|table| table.id() == id)
    }

    /// Static segments and turntable bridge units both count as known
    pub fn is_known_segment(&self, segment_id: &str) -> bool {
        self.segments.contains_key(segment_id) || self.bridge_segment_ids.contains(segment_id)
    }

    /// Static options in switch order (empty if nothing leaves `state`)
    pub fn static_outgoing(&self, state: &TrackState) -> &[DirectedTrackEdge] {
        self.static_outgoing
            .get(state)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// States with two or more static options, in state order
    pub fn static_switches(&self) -> BTreeMap<TrackState, &[DirectedTrackEdge]> {
        self.static_outgoing
            .iter()
            .filter(|(_, options)| options.len() >= 2)
            .map(|(state, options)| (*state, options.as_slice()))
            .collect()
    }

    /// Live options leaving `state`: static edges plus every turntable's
    /// current-alignment edges, in switch order. Missing alignments default to 0.
    pub fn outgoing_edges(
        &self,
        state: &TrackState,
        turntable_states: &BTreeMap<String, usize>,
    ) -> Vec<DirectedTrackEdge> {
        let mut options = self.static_outgoing(state).to_vec();
        let mut merged = false;

        for table in &self.turntables {
            let alignment = turntable_states.get(table.id()).copied().unwrap_or(0);
            let Some(bridge) = table.edges_for_alignment(alignment) else {
                continue;
            };
            for edge in bridge.iter().filter(|edge| edge.from_state() == *state) {
                options.push(edge.clone());
                merged = true;
            }
        }

        if merged {
            options.sort_by(|a, b| a.option_order(b));
        }
        options
    }
}
