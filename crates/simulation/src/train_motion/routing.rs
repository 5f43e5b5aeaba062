//! Goal selection and exploration scoring for the goal-directed mode.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::game_params::ExploreWeights;
use crate::geometry::{distance_m, distance_to_path_m, Coordinate};
use crate::passengers::Passenger;
use crate::track_network::{SegmentId, Station, StationId, TrackNetwork, TrackSegment};

use super::types::TrainState;

/// Read-only inputs a step may consult.
#[derive(Clone, Copy)]
pub struct MotionContext<'a> {
    pub network: &'a TrackNetwork,
    /// Passengers waiting on platforms.
    pub waiting: &'a [Passenger],
    pub weights: &'a ExploreWeights,
}

/// Where the train should head next.
///
/// With riders aboard: the destination of the oldest rider. Otherwise the
/// nearest station with someone waiting (ties to the lower station id).
/// `None` when there is nothing to do.
pub fn pick_goal<'a>(
    train: &TrainState,
    network: &'a TrackNetwork,
    waiting: &[Passenger],
) -> Option<&'a Station> {
    if let Some(rider) = train
        .manifest
        .iter()
        .min_by_key(|p| (p.created_at_ms, p.id))
    {
        return network.station(rider.destination);
    }

    let origins: BTreeSet<StationId> = waiting.iter().map(|p| p.origin).collect();
    origins
        .iter()
        .filter_map(|id| network.station(*id))
        .map(|s| (s, distance_m(train.position, s.position)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(s, _)| s)
}

/// Attractiveness of `segment` for a train at `from`.
pub fn segment_score(
    segment: &TrackSegment,
    from: Coordinate,
    ctx: &MotionContext<'_>,
    visited: &BTreeSet<SegmentId>,
) -> f64 {
    let w = ctx.weights;
    let stations = ctx
        .network
        .stations_near_segment(segment.id, w.nearby_radius_m) as f64;
    let passengers = ctx
        .waiting
        .iter()
        .filter(|p| distance_to_path_m(p.position, &segment.path) <= w.nearby_radius_m)
        .count() as f64;
    let km = distance_to_path_m(from, &segment.path) / 1000.0;

    let mut score = w.station_weight * stations + w.passenger_weight * passengers
        - (w.distance_weight_per_km * km).min(w.distance_penalty_cap);
    if visited.contains(&segment.id) {
        score -= w.visited_penalty;
    }
    score
}

/// Highest-scoring segment other than `current`, visited ones carrying
/// `visited_penalty`. Ties go to the segment listed first in the network.
pub fn best_explore_target(
    from: Coordinate,
    current: SegmentId,
    ctx: &MotionContext<'_>,
    visited: &BTreeSet<SegmentId>,
) -> Option<(SegmentId, f64)> {
    let mut best: Option<(SegmentId, f64)> = None;
    for segment in ctx.network.segments.iter().filter(|s| s.id != current) {
        let score = segment_score(segment, from, ctx, visited);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((segment.id, score)),
        }
    }
    best
}
