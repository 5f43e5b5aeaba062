//! Geographic helpers shared by the track network, the motion controller and
//! the passenger checks.
//!
//! Distances are great-circle (haversine) metres. Nearest-point queries
//! project in lat/lng space and measure the result with haversine, which is
//! accurate enough at city scale.

use bitcode::{Decode, Encode};
use geo::{Closest, ClosestPoint, Distance, Haversine, LineString, Point};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Metres per degree of latitude (mean).
const METRES_PER_DEG_LAT: f64 = 111_320.0;

/// A geographic point. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }

    fn from_point(p: Point<f64>) -> Self {
        Self {
            lat: p.y(),
            lng: p.x(),
        }
    }
}

/// Great-circle distance between two points, in metres.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    Haversine.distance(a.to_point(), b.to_point())
}

/// Nearest point on the polyline `path` to `point`.
///
/// Returns `None` only for an empty path. A single-point path yields that
/// point.
pub fn closest_point_on_path(point: Coordinate, path: &[Coordinate]) -> Option<Coordinate> {
    match path {
        [] => None,
        [only] => Some(*only),
        _ => {
            let line: LineString<f64> = path.iter().map(|c| (c.lng, c.lat)).collect();
            match line.closest_point(&point.to_point()) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => {
                    Some(Coordinate::from_point(p))
                }
                // Degenerate geometry (all vertices identical): fall back to vertices.
                Closest::Indeterminate => closest_index_on_path(point, path).map(|i| path[i]),
            }
        }
    }
}

/// Distance in metres from `point` to the polyline `path`.
/// `f64::INFINITY` for an empty path.
pub fn distance_to_path_m(point: Coordinate, path: &[Coordinate]) -> f64 {
    closest_point_on_path(point, path)
        .map(|p| distance_m(point, p))
        .unwrap_or(f64::INFINITY)
}

/// Index of the path vertex nearest to `point`; ties go to the lowest index.
pub fn closest_index_on_path(point: Coordinate, path: &[Coordinate]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, vertex) in path.iter().enumerate() {
        let d = distance_m(point, *vertex);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Offset `origin` by a flat-earth displacement in metres.
pub fn offset_m(origin: Coordinate, north_m: f64, east_m: f64) -> Coordinate {
    let lat = origin.lat + north_m / METRES_PER_DEG_LAT;
    let metres_per_deg_lng = METRES_PER_DEG_LAT * origin.lat.to_radians().cos().max(0.01);
    let lng = origin.lng + east_m / metres_per_deg_lng;
    Coordinate { lat, lng }
}

/// Uniformly displace `center` by at most `max_offset_deg` on each axis.
pub fn jitter<R: Rng>(center: Coordinate, max_offset_deg: f64, rng: &mut R) -> Coordinate {
    if max_offset_deg <= 0.0 {
        return center;
    }
    Coordinate {
        lat: center.lat + rng.gen_range(-max_offset_deg..=max_offset_deg),
        lng: center.lng + rng.gen_range(-max_offset_deg..=max_offset_deg),
    }
}

/// Linear interpolation between two coordinates (`t` in `0..=1`).
pub fn lerp(a: Coordinate, b: Coordinate, t: f64) -> Coordinate {
    Coordinate {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}
