//! Locality and connectivity queries over track segments.
//!
//! Connectivity is inferred from endpoint proximity. Every caller that needs
//! to know "what joins this end" goes through [`connecting_candidates`], so
//! the tolerance and the tie-breaking rules live here and nowhere else.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::config::CONNECTION_TOLERANCE_M;
use crate::errors::TrackError;
use crate::geometry::{distance_m, distance_to_path_m, Coordinate};

use super::types::*;

/// Id of the segment whose path is nearest to `point`.
///
/// Ties go to the segment encountered first.
pub fn closest_segment<'a, I>(point: Coordinate, segments: I) -> Result<SegmentId, TrackError>
where
    I: IntoIterator<Item = &'a TrackSegment>,
{
    closest_with_distance(point, segments)
        .map(|(id, _)| id)
        .ok_or(TrackError::NotFound)
}

/// Like [`closest_segment`] but skipping `visited`.
///
/// `None` means every segment has been visited ("exploration complete").
pub fn closest_unvisited_segment<'a, I>(
    point: Coordinate,
    segments: I,
    visited: &BTreeSet<SegmentId>,
) -> Option<SegmentId>
where
    I: IntoIterator<Item = &'a TrackSegment>,
{
    closest_with_distance(
        point,
        segments.into_iter().filter(|s| !visited.contains(&s.id)),
    )
    .map(|(id, _)| id)
}

pub(crate) fn closest_with_distance<'a, I>(
    point: Coordinate,
    segments: I,
) -> Option<(SegmentId, f64)>
where
    I: IntoIterator<Item = &'a TrackSegment>,
{
    let mut best: Option<(SegmentId, f64)> = None;
    for segment in segments {
        let d = distance_to_path_m(point, &segment.path);
        if !d.is_finite() {
            continue;
        }
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((segment.id, d)),
        }
    }
    best
}

/// Every segment whose nearer endpoint lies within the connection tolerance
/// of `segment`'s start (`at_end == false`) or end (`at_end == true`).
///
/// Ranked by: declared neighbours first, then smaller endpoint gap, then
/// input order.
pub fn connecting_candidates(
    segment: &TrackSegment,
    all: &[TrackSegment],
    at_end: bool,
) -> Vec<ConnectionInfo> {
    let Some(anchor) = segment.endpoint(at_end) else {
        return Vec::new();
    };

    let mut candidates: Vec<ConnectionInfo> = all
        .iter()
        .filter(|other| other.id != segment.id)
        .filter_map(|other| {
            let first = other.first()?;
            let last = other.last()?;
            let to_first = distance_m(anchor, first);
            let to_last = distance_m(anchor, last);
            // Entering at the start runs forward; entering at the end runs backwards.
            let (gap_m, start_index, reversed) = if to_first <= to_last {
                (to_first, 0, false)
            } else {
                (to_last, other.last_index(), true)
            };
            if gap_m > CONNECTION_TOLERANCE_M {
                return None;
            }
            Some(ConnectionInfo {
                target: other.id,
                start_index,
                reversed,
                gap_m,
                declared: segment.declares(other.id),
            })
        })
        .collect();

    // Stable sort keeps input order for equal keys.
    candidates.sort_by(|a, b| {
        b.declared
            .cmp(&a.declared)
            .then_with(|| a.gap_m.partial_cmp(&b.gap_m).unwrap_or(Ordering::Equal))
    });
    candidates
}

/// The best connection at one end of `segment`, or `None` when nothing is
/// within tolerance.
pub fn connecting_segment(
    segment: &TrackSegment,
    all: &[TrackSegment],
    at_end: bool,
) -> Option<ConnectionInfo> {
    connecting_candidates(segment, all, at_end).into_iter().next()
}

impl TrackNetwork {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Find a segment by ID.
    pub fn segment(&self, id: SegmentId) -> Option<&TrackSegment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// Find a station by ID.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn personal_station(&self) -> Option<&Station> {
        self.personal_station.and_then(|id| self.station(id))
    }

    pub fn closest_segment(&self, point: Coordinate) -> Result<SegmentId, TrackError> {
        closest_segment(point, &self.segments)
    }

    /// Closest segment other than `exclude`, with its distance in metres.
    pub fn closest_segment_excluding(
        &self,
        point: Coordinate,
        exclude: SegmentId,
    ) -> Option<(SegmentId, f64)> {
        closest_with_distance(point, self.segments.iter().filter(|s| s.id != exclude))
    }

    pub fn closest_unvisited_segment(
        &self,
        point: Coordinate,
        visited: &BTreeSet<SegmentId>,
    ) -> Option<SegmentId> {
        closest_unvisited_segment(point, &self.segments, visited)
    }

    pub fn connecting_segment(&self, id: SegmentId, at_end: bool) -> Option<ConnectionInfo> {
        let segment = self.segment(id)?;
        connecting_segment(segment, &self.segments, at_end)
    }

    pub fn connecting_candidates(&self, id: SegmentId, at_end: bool) -> Vec<ConnectionInfo> {
        match self.segment(id) {
            Some(segment) => connecting_candidates(segment, &self.segments, at_end),
            None => Vec::new(),
        }
    }

    /// Segments joined to either end of `id`: end candidates first, then
    /// start candidates, without duplicates.
    pub fn neighbors(&self, id: SegmentId) -> Vec<SegmentId> {
        let mut out: Vec<SegmentId> = Vec::new();
        for at_end in [true, false] {
            for info in self.connecting_candidates(id, at_end) {
                if !out.contains(&info.target) {
                    out.push(info.target);
                }
            }
        }
        out
    }

    /// Number of stations within `radius_m` of any point of segment `id`.
    pub fn stations_near_segment(&self, id: SegmentId, radius_m: f64) -> usize {
        let Some(segment) = self.segment(id) else {
            return 0;
        };
        self.stations
            .iter()
            .filter(|s| distance_to_path_m(s.position, &segment.path) <= radius_m)
            .count()
    }

    /// Segment nearest to a station's position (normally the station's own track).
    pub fn segment_for_station(&self, id: StationId) -> Option<SegmentId> {
        let station = self.station(id)?;
        if self.segment(station.track).is_some() {
            return Some(station.track);
        }
        self.closest_segment(station.position).ok()
    }

    /// Stations that may spawn passengers: flagged and not the home station.
    pub fn generating_stations(&self) -> impl Iterator<Item = &Station> {
        let personal = self.personal_station;
        self.stations
            .iter()
            .filter(move |s| s.can_generate && Some(s.id) != personal)
    }
}
