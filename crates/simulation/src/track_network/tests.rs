//! Unit tests for the track network queries and generation.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::errors::TrackError;
use crate::geometry::{distance_m, offset_m};
use crate::test_harness::fixtures::*;

use super::*;

#[test]
fn test_closest_segment_picks_nearest_path() {
    let network = chain_network(3);
    // A point just north of the middle of the second segment.
    let point = offset_m(ORIGIN, 20.0, 750.0);
    assert_eq!(network.closest_segment(point), Ok(SegmentId(1)));
}

#[test]
fn test_closest_segment_empty_is_not_found() {
    let empty: Vec<TrackSegment> = Vec::new();
    assert_eq!(closest_segment(ORIGIN, &empty), Err(TrackError::NotFound));
}

#[test]
fn test_closest_segment_tie_goes_to_first() {
    let a = straight_segment(7, ORIGIN, 0.0, 100.0, 3);
    let b = straight_segment(3, ORIGIN, 0.0, 100.0, 3);
    let segments = vec![a, b];
    assert_eq!(closest_segment(ORIGIN, &segments), Ok(SegmentId(7)));
}

#[test]
fn test_closest_unvisited_skips_visited() {
    let network = chain_network(3);
    let mut visited = BTreeSet::new();
    visited.insert(SegmentId(0));
    let found = network.closest_unvisited_segment(ORIGIN, &visited);
    assert_eq!(found, Some(SegmentId(1)));
}

#[test]
fn test_closest_unvisited_all_visited_is_none() {
    let network = chain_network(2);
    let visited: BTreeSet<SegmentId> = network.segments.iter().map(|s| s.id).collect();
    assert_eq!(network.closest_unvisited_segment(ORIGIN, &visited), None);
}

#[test]
fn test_connecting_segment_forward_at_end() {
    let network = two_segment_network();
    let info = network.connecting_segment(SegmentId(0), true).unwrap();
    assert_eq!(info.target, SegmentId(1));
    assert_eq!(info.start_index, 0);
    assert!(!info.reversed);
    assert!(info.declared);
}

#[test]
fn test_connecting_segment_reversed_neighbor() {
    // B is laid out pointing back at A's end, so entering it means running backwards.
    let a = straight_segment(0, ORIGIN, 0.0, 500.0, 5);
    let a_end = a.last().unwrap();
    let far = offset_m(a_end, 0.0, 500.0);
    let b = straight_segment(1, far, 0.0, -500.0, 5);
    let network = network_from(vec![a, b]);

    let info = network.connecting_segment(SegmentId(0), true).unwrap();
    assert_eq!(info.target, SegmentId(1));
    assert_eq!(info.start_index, 4);
    assert!(info.reversed);
}

#[test]
fn test_connecting_segment_none_when_isolated() {
    let network = isolated_segment_network(5);
    assert!(network.connecting_segment(SegmentId(0), true).is_none());
    assert!(network.connecting_segment(SegmentId(0), false).is_none());
}

#[test]
fn test_connecting_segment_respects_tolerance() {
    let a = straight_segment(0, ORIGIN, 0.0, 500.0, 5);
    let gap_start = offset_m(a.last().unwrap(), 0.0, 40.0);
    let b = straight_segment(1, gap_start, 0.0, 500.0, 5);
    let network = network_from(vec![a, b]);
    assert!(network.connecting_segment(SegmentId(0), true).is_none());
}

#[test]
fn test_connecting_candidates_prefer_declared() {
    // Two segments leave A's end; only the second is declared.
    let a = straight_segment(0, ORIGIN, 0.0, 500.0, 5);
    let end = a.last().unwrap();
    let north = straight_segment(1, end, 500.0, 0.0, 5);
    let east = straight_segment(2, end, 0.0, 500.0, 5);
    let a = a.with_connections(vec![SegmentId(2)]);
    let network = TrackNetwork {
        segments: vec![a, north, east],
        ..Default::default()
    };

    let ranked = network.connecting_candidates(SegmentId(0), true);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].target, SegmentId(2));
    assert_eq!(ranked[1].target, SegmentId(1));
    assert_eq!(
        network.connecting_segment(SegmentId(0), true).map(|c| c.target),
        Some(SegmentId(2))
    );
}

#[test]
fn test_declared_connections_need_not_be_sorted() {
    let a = straight_segment(0, ORIGIN, 0.0, 500.0, 5);
    let end = a.last().unwrap();
    let north = straight_segment(1, end, 500.0, 0.0, 5);
    let east = straight_segment(2, end, 0.0, 500.0, 5);
    let south = straight_segment(3, end, -500.0, 0.0, 5);
    let a = TrackSegment {
        connections: vec![SegmentId(3), SegmentId(1)],
        ..a
    };
    let network = TrackNetwork {
        segments: vec![a, north, east, south],
        ..Default::default()
    };

    let ranked = network.connecting_candidates(SegmentId(0), true);
    let declared: Vec<_> = ranked.iter().filter(|c| c.declared).map(|c| c.target).collect();
    assert_eq!(declared, vec![SegmentId(1), SegmentId(3)]);
    assert_eq!(ranked[2].target, SegmentId(2));
    assert!(!ranked[2].declared);
}

#[test]
fn test_degenerate_segment_connects_by_single_point() {
    let a = straight_segment(0, ORIGIN, 0.0, 500.0, 5);
    let dot = TrackSegment::new(SegmentId(1), vec![a.last().unwrap()]);
    let network = network_from(vec![a, dot]);
    let info = network.connecting_segment(SegmentId(0), true).unwrap();
    assert_eq!(info.target, SegmentId(1));
    assert_eq!(info.start_index, 0);
    assert!(!info.reversed);
}

#[test]
fn test_neighbors_cover_both_ends() {
    let network = chain_network(3);
    let n = network.neighbors(SegmentId(1));
    assert_eq!(n, vec![SegmentId(2), SegmentId(0)]);
}

#[test]
fn test_generate_network_lattice_shape() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let params = NetworkGenParams::default();
    let network = generate_network(ORIGIN, &params, &mut rng);

    let n = params.lines;
    assert_eq!(network.segments.len(), 2 * n * (n - 1));
    assert!(network.stations.len() >= 2);
    for segment in &network.segments {
        assert_eq!(segment.path.len(), params.points_per_segment);
        assert!(!segment.connections.is_empty(), "lattice segments all touch others");
    }
}

#[test]
fn test_generate_network_personal_station_never_generates() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let network = generate_network(ORIGIN, &NetworkGenParams::default(), &mut rng);
    let home = network.personal_station().expect("home station");
    assert!(!home.can_generate);
    assert!(network.generating_stations().all(|s| s.id != home.id));

    // Home is the station nearest the centre.
    let home_d = distance_m(home.position, ORIGIN);
    assert!(network
        .stations
        .iter()
        .all(|s| distance_m(s.position, ORIGIN) >= home_d));
}

#[test]
fn test_generate_network_deterministic() {
    let params = NetworkGenParams::default();
    let a = generate_network(ORIGIN, &params, &mut ChaCha8Rng::seed_from_u64(5));
    let b = generate_network(ORIGIN, &params, &mut ChaCha8Rng::seed_from_u64(5));
    assert_eq!(a.segments, b.segments);
    assert_eq!(a.stations, b.stations);
}

#[test]
fn test_generate_network_too_few_lines_is_empty() {
    let params = NetworkGenParams {
        lines: 1,
        ..Default::default()
    };
    let network = generate_network(ORIGIN, &params, &mut ChaCha8Rng::seed_from_u64(1));
    assert!(network.is_empty());
    assert_eq!(network.center, Some(ORIGIN));
}

#[test]
fn test_stations_near_segment_counts_within_radius() {
    let network = with_stations(chain_network(3), &[(0, 2, true), (1, 2, true)], None);
    assert_eq!(network.stations_near_segment(SegmentId(0), 50.0), 1);
    assert_eq!(network.stations_near_segment(SegmentId(2), 50.0), 0);
}
