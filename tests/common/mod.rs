//! Layout builders shared by the integration tests

#![allow(dead_code)]

use shunting_sim::simulation::{
    CurveBias, DirectedTrackEdge, Direction, Goal, GridPoint, PuzzleState, RollingStockSpec,
    ShuntingPuzzle, TrackSegment, TrackTopology, Turntable, TurntableAlignment, TurntablePort,
    VehicleEnd, VehicleId, VehiclePlacement,
};

pub const CAR: VehicleId = VehicleId(0);
pub const ENGINE: VehicleId = VehicleId(1);

pub fn p(x: i32, y: i32) -> GridPoint {
    GridPoint::new(x, y)
}

pub fn straight(id: &str, a: (i32, i32), b: (i32, i32)) -> TrackSegment {
    TrackSegment::straight(id, p(a.0, a.1), p(b.0, b.1)).expect("valid straight segment")
}

pub fn curve(id: &str, a: (i32, i32), b: (i32, i32), bias: CurveBias) -> TrackSegment {
    TrackSegment::curved(id, p(a.0, a.1), p(b.0, b.1), bias).expect("valid curve segment")
}

/// The a-to-b edge of a segment
pub fn fwd(segment: &TrackSegment) -> DirectedTrackEdge {
    segment.directed_edges()[0].clone()
}

pub fn placement(edges: Vec<DirectedTrackEdge>) -> VehiclePlacement {
    VehiclePlacement::new(edges).expect("contiguous placement")
}

pub fn topology(segments: Vec<TrackSegment>) -> TrackTopology {
    TrackTopology::new(segments, Vec::new()).expect("valid topology")
}

pub fn segment_ids(state: &PuzzleState, vehicle: VehicleId) -> Vec<String> {
    state.placements[&vehicle]
        .edges()
        .iter()
        .map(|edge| edge.segment_id.clone())
        .collect()
}

/// Three unit segments S0-S1-S2 along y = 0, optionally with S_1 behind S0
pub fn line_segments(with_back_segment: bool) -> Vec<TrackSegment> {
    let mut segments = vec![
        straight("S0", (0, 0), (1, 0)),
        straight("S1", (1, 0), (2, 0)),
        straight("S2", (2, 0), (3, 0)),
    ];
    if with_back_segment {
        segments.push(straight("S_1", (-1, 0), (0, 0)));
    }
    segments
}

/// Car on S0 coupled front-to-back to an engine on S1
pub fn line_puzzle(
    car_weight: u32,
    engine_power: u32,
    with_back_segment: bool,
    goal: Goal,
) -> ShuntingPuzzle {
    let segments = line_segments(with_back_segment);
    let s0 = fwd(&segments[0]);
    let s1 = fwd(&segments[1]);

    let mut state = PuzzleState::new();
    state.placements.insert(CAR, placement(vec![s0]));
    state.placements.insert(ENGINE, placement(vec![s1]));
    state.couple(CAR, VehicleEnd::Front, ENGINE, VehicleEnd::Back);

    let stock = vec![
        RollingStockSpec::car(CAR.0, 1, car_weight).unwrap(),
        RollingStockSpec::engine(ENGINE.0, 1, 0, engine_power, engine_power).unwrap(),
    ];
    ShuntingPuzzle::new(topology(segments), stock, state, goal).expect("valid puzzle")
}

/// The eight segments of a closed loop alternating curves and straights
///
/// Traversed forward: C0 S0 C1 S1 C2 S2 C3 S3 and back to C0.
pub fn loop_segments() -> Vec<TrackSegment> {
    vec![
        curve("C0", (0, 0), (1, 1), CurveBias::XFirst),
        straight("S0", (1, 1), (1, 2)),
        curve("C1", (1, 2), (0, 3), CurveBias::YFirst),
        straight("S1", (0, 3), (-1, 3)),
        curve("C2", (-1, 3), (-2, 2), CurveBias::XFirst),
        straight("S2", (-2, 2), (-2, 1)),
        curve("C3", (-2, 1), (-1, 0), CurveBias::YFirst),
        straight("S3", (-1, 0), (0, 0)),
    ]
}

/// Four unit vehicles filling the loop, vehicle 3 being the engine at the head
pub fn loop_puzzle(close_the_ring: bool) -> ShuntingPuzzle {
    let segments = loop_segments();
    let edges: Vec<DirectedTrackEdge> = segments.iter().map(fwd).collect();

    let mut state = PuzzleState::new();
    for i in 0..4u32 {
        let k = 2 * i as usize;
        state
            .placements
            .insert(VehicleId(i), placement(vec![edges[k].clone(), edges[k + 1].clone()]));
    }
    for i in 0..3u32 {
        state.couple(VehicleId(i), VehicleEnd::Front, VehicleId(i + 1), VehicleEnd::Back);
    }
    if close_the_ring {
        state.couple(VehicleId(3), VehicleEnd::Front, VehicleId(0), VehicleEnd::Back);
    }

    let stock = vec![
        RollingStockSpec::car(0, 1, 1).unwrap(),
        RollingStockSpec::car(1, 1, 1).unwrap(),
        RollingStockSpec::car(2, 1, 1).unwrap(),
        RollingStockSpec::engine(3, 1, 1, 4, 4).unwrap(),
    ];
    ShuntingPuzzle::new(topology(segments), stock, state, Goal::default()).expect("valid puzzle")
}

pub fn port(x: i32, y: i32, outbound_direction: Direction) -> TurntablePort {
    TurntablePort {
        point: p(x, y),
        outbound_direction,
    }
}

/// Turntable "T" at the origin, radius 1, with a horizontal (0) and a
/// vertical (1) alignment
pub fn turntable() -> Turntable {
    Turntable::new(
        "T",
        p(0, 0),
        1,
        vec![
            port(-1, 0, Direction::West),
            port(1, 0, Direction::East),
            port(0, -1, Direction::South),
            port(0, 1, Direction::North),
        ],
        vec![
            TurntableAlignment {
                port_a_index: 0,
                port_b_index: 1,
            },
            TurntableAlignment {
                port_a_index: 2,
                port_b_index: 3,
            },
        ],
    )
    .expect("valid turntable")
}
