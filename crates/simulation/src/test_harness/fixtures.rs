//! Small hand-built networks shared by unit and integration tests.

use crate::geometry::{lerp, offset_m, Coordinate};
use crate::track_network::{
    declare_shared_endpoints, SegmentId, Station, StationId, TrackNetwork, TrackSegment,
};

/// Fixture origin (central Tel Aviv).
pub const ORIGIN: Coordinate = Coordinate::new(32.0853, 34.7818);

/// Length of every fixture segment, in metres.
pub const SEGMENT_LEN_M: f64 = 500.0;

/// Points per fixture segment.
pub const SEGMENT_POINTS: usize = 5;

/// A straight segment from `start`, displaced by (`north_m`, `east_m`).
pub fn straight_segment(
    id: u32,
    start: Coordinate,
    north_m: f64,
    east_m: f64,
    points: usize,
) -> TrackSegment {
    let end = offset_m(start, north_m, east_m);
    let path = if points <= 1 {
        vec![start]
    } else {
        (0..points)
            .map(|i| lerp(start, end, i as f64 / (points - 1) as f64))
            .collect()
    };
    TrackSegment::new(SegmentId(id), path)
}

/// Wrap segments in a network with declared connections derived from
/// shared endpoints.
pub fn network_from(mut segments: Vec<TrackSegment>) -> TrackNetwork {
    declare_shared_endpoints(&mut segments);
    TrackNetwork {
        segments,
        center: Some(ORIGIN),
        revision: 1,
        ..Default::default()
    }
}

/// `n` segments laid end to end, running east from `ORIGIN`.
pub fn chain_network(n: u32) -> TrackNetwork {
    let mut segments = Vec::new();
    let mut start = ORIGIN;
    for id in 0..n {
        let segment = straight_segment(id, start, 0.0, SEGMENT_LEN_M, SEGMENT_POINTS);
        start = segment.last().unwrap_or(start);
        segments.push(segment);
    }
    network_from(segments)
}

/// Segment A then segment B, joined at A's end / B's start.
pub fn two_segment_network() -> TrackNetwork {
    chain_network(2)
}

/// A single segment with nothing attached.
pub fn isolated_segment_network(points: usize) -> TrackNetwork {
    network_from(vec![straight_segment(0, ORIGIN, 0.0, SEGMENT_LEN_M, points)])
}

/// A 2x2 block: a square loop of four segments around `ORIGIN`.
pub fn loop_network() -> TrackNetwork {
    let sw = ORIGIN;
    let se = offset_m(sw, 0.0, SEGMENT_LEN_M);
    let ne = offset_m(se, SEGMENT_LEN_M, 0.0);
    let nw = offset_m(sw, SEGMENT_LEN_M, 0.0);
    let seg = |id: u32, a: Coordinate, b: Coordinate| {
        let path = (0..SEGMENT_POINTS)
            .map(|i| lerp(a, b, i as f64 / (SEGMENT_POINTS - 1) as f64))
            .collect();
        TrackSegment::new(SegmentId(id), path)
    };
    network_from(vec![
        seg(0, sw, se),
        seg(1, se, ne),
        seg(2, ne, nw),
        seg(3, nw, sw),
    ])
}

/// Add stations at `(segment, path_index, can_generate)`; `personal` indexes
/// into `specs`.
pub fn with_stations(
    mut network: TrackNetwork,
    specs: &[(u32, usize, bool)],
    personal: Option<usize>,
) -> TrackNetwork {
    for (i, (segment, index, can_generate)) in specs.iter().enumerate() {
        let Some(track) = network.segment(SegmentId(*segment)) else {
            continue;
        };
        let position = track.path[(*index).min(track.last_index())];
        network.stations.push(Station {
            id: StationId(i as u32),
            name: format!("S{}", i + 1),
            position,
            track: SegmentId(*segment),
            can_generate: *can_generate,
        });
    }
    network.personal_station = personal.map(|i| StationId(i as u32));
    if let Some(home) = network.personal_station {
        if let Some(station) = network.stations.iter_mut().find(|s| s.id == home) {
            station.can_generate = false;
        }
    }
    network
}
