use crate::geometry::Coordinate;

/// Simulated milliseconds per `FixedUpdate` tick (10 Hz).
pub const TICK_MS: u64 = 100;

/// Two segment endpoints closer than this (metres) are considered joined.
pub const CONNECTION_TOLERANCE_M: f64 = 15.0;

/// Map clicks further than this from every segment select nothing.
pub const SELECT_RADIUS_M: f64 = 250.0;

/// Fallback map centre handed out when the geocoder fails (Tel Aviv-Yafo).
pub const DEFAULT_LOCATION: Coordinate = Coordinate {
    lat: 32.0853,
    lng: 34.7818,
};

/// Happiness starts here and is clamped to `0..=HAPPINESS_MAX`.
pub const HAPPINESS_START: f32 = 50.0;
pub const HAPPINESS_MAX: f32 = 100.0;
