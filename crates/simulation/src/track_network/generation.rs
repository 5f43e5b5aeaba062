//! Programmatic track network generation around a map centre.
//!
//! Lays a square lattice of straight tracks, splits every track at each
//! crossing, and drops stations on a random subset of the resulting segments.

use bitcode::{Decode, Encode};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::CONNECTION_TOLERANCE_M;
use crate::geometry::{distance_m, lerp, offset_m, Coordinate};

use super::types::*;

const STATION_NAMES: &[&str] = &[
    "Central", "Harbour", "Market", "University", "Old Town", "Riverside", "Museum",
    "Stadium", "Hospital", "Park Lane", "North Gate", "Depot", "Exchange", "Library",
    "Theatre", "Airport Link", "Cathedral", "Docklands", "Hillside", "Arsenal",
];

/// Tunables for [`generate_network`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct NetworkGenParams {
    /// Tracks per direction (the lattice is `lines x lines`).
    pub lines: usize,
    /// Distance between parallel tracks, in metres.
    pub line_spacing_m: f64,
    /// Points per segment including both endpoints (minimum 2).
    pub points_per_segment: usize,
    /// Chance that a segment receives a station at its midpoint.
    pub station_probability: f64,
    /// Chance that a non-home station is allowed to spawn passengers.
    pub can_generate_probability: f64,
}

impl Default for NetworkGenParams {
    fn default() -> Self {
        Self {
            lines: 4,
            line_spacing_m: 600.0,
            points_per_segment: 8,
            station_probability: 0.5,
            can_generate_probability: 0.8,
        }
    }
}

/// Build a lattice network centred on `center`.
///
/// Deterministic for a given RNG state. Fewer than two lines produce an empty
/// network (which the motion controller will refuse).
pub fn generate_network<R: Rng>(
    center: Coordinate,
    params: &NetworkGenParams,
    rng: &mut R,
) -> TrackNetwork {
    let mut network = TrackNetwork {
        center: Some(center),
        ..Default::default()
    };
    if params.lines < 2 {
        return network;
    }

    let n = params.lines;
    let half = params.line_spacing_m * (n - 1) as f64 / 2.0;
    let offset = |k: usize| k as f64 * params.line_spacing_m - half;
    let crossing = |row: usize, col: usize| offset_m(center, offset(row), offset(col));

    let points = params.points_per_segment.max(2);
    let mut next_id = 0u32;
    let mut push_segment = |network: &mut TrackNetwork, a: Coordinate, b: Coordinate| {
        let path = (0..points)
            .map(|i| lerp(a, b, i as f64 / (points - 1) as f64))
            .collect();
        network
            .segments
            .push(TrackSegment::new(SegmentId(next_id), path));
        next_id += 1;
    };

    // East-west tracks, then north-south tracks.
    for row in 0..n {
        for col in 0..n - 1 {
            push_segment(&mut network, crossing(row, col), crossing(row, col + 1));
        }
    }
    for col in 0..n {
        for row in 0..n - 1 {
            push_segment(&mut network, crossing(row, col), crossing(row + 1, col));
        }
    }

    declare_shared_endpoints(&mut network.segments);
    place_stations(&mut network, center, params, rng);
    network
}

/// Fill `connections` from endpoints that coincide within tolerance.
pub fn declare_shared_endpoints(segments: &mut [TrackSegment]) {
    let endpoints: Vec<(SegmentId, Vec<Coordinate>)> = segments
        .iter()
        .map(|s| {
            let ends = s.first().into_iter().chain(s.last()).collect();
            (s.id, ends)
        })
        .collect();

    for segment in segments.iter_mut() {
        let own: Vec<Coordinate> = segment.first().into_iter().chain(segment.last()).collect();
        let mut connections: Vec<SegmentId> = endpoints
            .iter()
            .filter(|(id, _)| *id != segment.id)
            .filter(|(_, ends)| {
                own.iter().any(|a| {
                    ends.iter()
                        .any(|b| distance_m(*a, *b) <= CONNECTION_TOLERANCE_M)
                })
            })
            .map(|(id, _)| *id)
            .collect();
        connections.sort();
        connections.dedup();
        segment.connections = connections;
    }
}

fn place_stations<R: Rng>(
    network: &mut TrackNetwork,
    center: Coordinate,
    params: &NetworkGenParams,
    rng: &mut R,
) {
    let mut chosen: Vec<SegmentId> = network
        .segments
        .iter()
        .filter(|_| rng.gen_bool(params.station_probability.clamp(0.0, 1.0)))
        .map(|s| s.id)
        .collect();

    // A playable network needs an origin and a destination.
    for segment in &network.segments {
        if chosen.len() >= 2 {
            break;
        }
        if !chosen.contains(&segment.id) {
            chosen.push(segment.id);
        }
    }
    chosen.sort();

    for (i, segment_id) in chosen.iter().enumerate() {
        let Some(segment) = network.segments.iter().find(|s| s.id == *segment_id) else {
            continue;
        };
        let position = segment.path[segment.path.len() / 2];
        let name = match STATION_NAMES.get(i) {
            Some(name) => (*name).to_string(),
            None => format!("Stop {}", i + 1),
        };
        network.stations.push(Station {
            id: StationId(i as u32),
            name,
            position,
            track: *segment_id,
            can_generate: rng.gen_bool(params.can_generate_probability.clamp(0.0, 1.0)),
        });
    }

    let personal = network
        .stations
        .iter()
        .min_by(|a, b| {
            distance_m(a.position, center)
                .partial_cmp(&distance_m(b.position, center))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|s| s.id);

    if let Some(home) = personal {
        if let Some(station) = network.stations.iter_mut().find(|s| s.id == home) {
            station.can_generate = false;
            station.name = format!("{} (Home)", station.name);
        }
    }
    network.personal_station = personal;
}
