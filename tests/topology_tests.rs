//! Track geometry, turntables and the topology index

mod common;

use std::collections::BTreeMap;

use common::{curve, p, straight, turntable};
use shunting_sim::simulation::{
    CurveBias, DefinitionError, Direction, TrackSegment, TrackState, TrackTopology, Turntable,
    TurntableAlignment, TurntablePort, MAX_TURNTABLE_RADIUS,
};

#[test]
fn test_direction_offsets_round_trip() {
    for direction in Direction::ALL {
        let (dx, dy) = direction.to_offset();
        assert_eq!(Direction::from_offset(dx, dy), Some(direction));
        assert_eq!(direction.opposite().opposite(), direction);
        assert_ne!(direction.opposite(), direction);
    }
    assert_eq!(Direction::from_offset(1, 1), None);
}

#[test]
fn test_straight_segment_edges() {
    let segment = straight("S", (0, 0), (1, 0));
    let [forward, backward] = segment.directed_edges();

    assert_eq!(forward.from_node, p(0, 0));
    assert_eq!(forward.to_node, p(1, 0));
    assert_eq!(forward.entry_heading, Direction::East);
    assert_eq!(forward.exit_heading, Direction::East);
    assert_eq!(forward.distance, 1);

    assert_eq!(backward, &forward.reverse());
    assert_eq!(backward.from_node, p(1, 0));
    assert_eq!(backward.entry_heading, Direction::West);
    assert_eq!(backward.reverse(), *forward);
}

#[test]
fn test_curve_headings_follow_bias() {
    let x_first = curve("C", (0, 0), (1, 1), CurveBias::XFirst);
    let forward = &x_first.directed_edges()[0];
    assert_eq!(forward.entry_heading, Direction::East);
    assert_eq!(forward.exit_heading, Direction::North);
    assert_eq!(forward.distance, 0, "curves are free");

    let backward = &x_first.directed_edges()[1];
    assert_eq!(backward.from_node, p(1, 1));
    assert_eq!(backward.entry_heading, Direction::South);
    assert_eq!(backward.exit_heading, Direction::West);

    let y_first = curve("D", (0, 0), (1, 1), CurveBias::YFirst);
    assert_eq!(y_first.directed_edges()[0].entry_heading, Direction::North);
    assert_eq!(y_first.directed_edges()[0].exit_heading, Direction::East);
}

#[test]
fn test_malformed_segments_rejected() {
    assert_eq!(
        TrackSegment::straight("S", p(0, 0), p(2, 0)).unwrap_err(),
        DefinitionError::StraightNotAdjacent("S".to_string())
    );
    assert_eq!(
        TrackSegment::straight("S", p(0, 0), p(1, 1)).unwrap_err(),
        DefinitionError::StraightNotAdjacent("S".to_string())
    );
    assert_eq!(
        TrackSegment::curved("C", p(0, 0), p(1, 0), CurveBias::XFirst).unwrap_err(),
        DefinitionError::CurveNotDiagonal("C".to_string())
    );
    assert_eq!(
        TrackSegment::straight("  ", p(0, 0), p(1, 0)).unwrap_err(),
        DefinitionError::EmptySegmentId
    );
    assert_eq!(
        TrackSegment::straight("S", p(0, 0), p(0, 0)).unwrap_err(),
        DefinitionError::DegenerateSegment("S".to_string())
    );
    assert_eq!(
        TrackSegment::straight("S", p(i32::MIN, 0), p(i32::MAX, 0)).unwrap_err(),
        DefinitionError::StraightNotAdjacent("S".to_string())
    );
    assert_eq!(
        TrackSegment::curved("C", p(i32::MAX, i32::MIN), p(i32::MIN, i32::MAX), CurveBias::YFirst)
            .unwrap_err(),
        DefinitionError::CurveNotDiagonal("C".to_string())
    );

    let curve = TrackSegment::curved("C", p(0, 0), p(1, 1), CurveBias::YFirst).unwrap();
    assert_eq!(curve.distance(), 0);
    assert_eq!(straight("S", (0, 0), (0, 1)).distance(), 1);
}

#[test]
fn test_switch_options_straight_first_then_heading() {
    // Ids sort the other way round, so only the comparator explains the order:
    // the straight first, then the curve exiting North before the one exiting South.
    let topology = TrackTopology::new(
        vec![
            straight("Z", (0, 0), (1, 0)),
            curve("A", (0, 0), (1, -1), CurveBias::XFirst),
            curve("B", (0, 0), (1, 1), CurveBias::XFirst),
        ],
        Vec::new(),
    )
    .unwrap();

    let state = TrackState::new(p(0, 0), Direction::East);
    let ids: Vec<_> = topology
        .static_outgoing(&state)
        .iter()
        .map(|edge| edge.segment_id.as_str())
        .collect();
    assert_eq!(ids, vec!["Z", "B", "A"]);

    let switches = topology.static_switches();
    assert_eq!(switches.len(), 1, "only one junction has options");
    assert!(switches.contains_key(&state));

    let none = BTreeMap::new();
    assert_eq!(
        topology.outgoing_edges(&state, &none),
        topology.outgoing_edges(&state, &none),
        "outgoing edges must be stable"
    );
}

#[test]
fn test_four_way_switch_rejected() {
    let result = TrackTopology::new(
        vec![
            straight("S1", (0, 0), (1, 0)),
            straight("S2", (0, 0), (1, 0)),
            curve("C1", (0, 0), (1, 1), CurveBias::XFirst),
            curve("C2", (0, 0), (1, -1), CurveBias::XFirst),
        ],
        Vec::new(),
    );
    assert_eq!(
        result.unwrap_err(),
        DefinitionError::TooManySwitchOptions {
            state: TrackState::new(p(0, 0), Direction::East),
            count: 4,
        }
    );
}

#[test]
fn test_duplicate_segment_rejected() {
    let result = TrackTopology::new(
        vec![straight("S", (0, 0), (1, 0)), straight("S", (1, 0), (2, 0))],
        Vec::new(),
    );
    assert_eq!(result.unwrap_err(), DefinitionError::DuplicateSegment("S".to_string()));
}

#[test]
fn test_segment_inside_turntable_rejected() {
    let result = TrackTopology::new(vec![straight("In", (0, 0), (1, 0))], vec![turntable()]);
    assert_eq!(
        result.unwrap_err(),
        DefinitionError::SegmentInsideTurntable {
            segment: "In".to_string(),
            turntable: "T".to_string(),
        }
    );

    // Touching the border is fine.
    assert!(TrackTopology::new(vec![straight("W", (-2, 0), (-1, 0))], vec![turntable()]).is_ok());
}

#[test]
fn test_duplicate_turntable_rejected() {
    let result = TrackTopology::new(Vec::new(), vec![turntable(), turntable()]);
    assert_eq!(result.unwrap_err(), DefinitionError::DuplicateTurntable("T".to_string()));
}

#[test]
fn test_malformed_turntables_rejected() {
    let port = |x, y, outbound_direction| TurntablePort {
        point: p(x, y),
        outbound_direction,
    };
    let across = vec![TurntableAlignment {
        port_a_index: 0,
        port_b_index: 1,
    }];

    // Ports on the border but off the center line.
    let off_center = Turntable::new(
        "T",
        p(0, 0),
        1,
        vec![port(-1, 1, Direction::West), port(1, 1, Direction::East)],
        across.clone(),
    );
    assert!(matches!(off_center, Err(DefinitionError::InvalidTurntable { .. })));

    // Port inside the table.
    let inside = Turntable::new(
        "T",
        p(0, 0),
        1,
        vec![port(0, 0, Direction::West), port(1, 0, Direction::East)],
        across.clone(),
    );
    assert!(matches!(inside, Err(DefinitionError::InvalidTurntable { .. })));

    // Port pointing back into the table.
    let inward = Turntable::new(
        "T",
        p(0, 0),
        1,
        vec![port(-1, 0, Direction::East), port(1, 0, Direction::East)],
        across.clone(),
    );
    assert!(matches!(inward, Err(DefinitionError::InvalidTurntable { .. })));

    // Radius past the limit, with ports that would otherwise line up.
    let edge = MAX_TURNTABLE_RADIUS as i32 + 1;
    let huge = Turntable::new(
        "T",
        p(0, 0),
        MAX_TURNTABLE_RADIUS + 1,
        vec![port(-edge, 0, Direction::West), port(edge, 0, Direction::East)],
        across.clone(),
    );
    assert!(matches!(huge, Err(DefinitionError::InvalidTurntable { .. })));

    // Ports far enough apart that naive arithmetic would overflow.
    let wrapped = Turntable::new(
        "T",
        p(i32::MIN, 0),
        1,
        vec![port(i32::MAX, 0, Direction::West), port(i32::MIN + 1, 0, Direction::East)],
        across,
    );
    assert!(matches!(wrapped, Err(DefinitionError::InvalidTurntable { .. })));

    // Alignment to a missing port.
    let missing = Turntable::new(
        "T",
        p(0, 0),
        1,
        vec![port(-1, 0, Direction::West), port(1, 0, Direction::East)],
        vec![TurntableAlignment {
            port_a_index: 0,
            port_b_index: 5,
        }],
    );
    assert!(matches!(missing, Err(DefinitionError::InvalidTurntable { .. })));
}

#[test]
fn test_turntable_bridge_follows_alignment() {
    let table = turntable();
    let ids: Vec<String> = table.bridge_segment_ids().collect();
    assert_eq!(ids, vec!["Turntable:T:0", "Turntable:T:1"]);

    let horizontal = table.edges_for_alignment(0).unwrap();
    assert_eq!(horizontal.len(), 4, "two units, both directions");
    assert!(horizontal.iter().all(|edge| edge.distance == 1));

    let topology = TrackTopology::new(vec![straight("W", (-2, 0), (-1, 0))], vec![table]).unwrap();
    assert!(topology.is_known_segment("Turntable:T:1"));
    assert!(topology.is_known_segment("W"));
    assert_eq!(topology.segment("W").map(|s| s.b()), Some(p(-1, 0)));
    assert!(topology.segment("Turntable:T:0").is_none(), "bridges are not static segments");
    assert!(!topology.is_known_segment("Turntable:T:2"));

    let west_port = TrackState::new(p(-1, 0), Direction::East);
    let south_port = TrackState::new(p(0, -1), Direction::North);

    let mut alignments = BTreeMap::new();
    let across = topology.outgoing_edges(&west_port, &alignments);
    assert_eq!(across.len(), 1);
    assert_eq!(across[0].segment_id, "Turntable:T:0");
    assert_eq!(across[0].to_node, p(0, 0));
    assert!(topology.outgoing_edges(&south_port, &alignments).is_empty());

    alignments.insert("T".to_string(), 1);
    assert!(topology.outgoing_edges(&west_port, &alignments).is_empty());
    let up = topology.outgoing_edges(&south_port, &alignments);
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].segment_id, "Turntable:T:0");
    assert_eq!(up[0].exit_heading, Direction::North);
}
