//! Track network: segments, stations and the connectivity queries the rest of
//! the simulation relies on.
//!
//! ## Data model
//! - `TrackSegment`: an ordered point sequence plus declared neighbours
//! - `Station`: a named stop placed on a segment
//! - `TrackNetwork`: the resource holding both, read-only once generated
//!
//! Connectivity is geometric: two segments join when their endpoints lie
//! within `CONNECTION_TOLERANCE_M` of each other. Declared `connections`
//! only rank candidates.

mod generation;
mod queries;
mod types;

#[cfg(test)]
mod tests;

pub use generation::{declare_shared_endpoints, generate_network, NetworkGenParams};
pub(crate) use queries::closest_with_distance;
pub use queries::{
    closest_segment, closest_unvisited_segment, connecting_candidates, connecting_segment,
};
pub use types::*;
