//! Data types for the track network.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a track segment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct SegmentId(pub u32);

/// Unique identifier for a station.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct StationId(pub u32);

// =============================================================================
// Data Structures
// =============================================================================

/// An ordered run of track points.
///
/// Geometry never changes after generation. A single-point path is legal and
/// behaves as an immediate end-of-segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct TrackSegment {
    pub id: SegmentId,
    pub path: Vec<Coordinate>,
    /// Declared neighbours. Used as a preference when ranking geometric
    /// connections, never as a substitute for them.
    pub connections: Vec<SegmentId>,
}

impl TrackSegment {
    pub fn new(id: SegmentId, path: Vec<Coordinate>) -> Self {
        Self {
            id,
            path,
            connections: Vec::new(),
        }
    }

    /// Builder-style helper for declaring neighbours.
    pub fn with_connections(mut self, mut connections: Vec<SegmentId>) -> Self {
        connections.sort();
        connections.dedup();
        connections.retain(|c| *c != self.id);
        self.connections = connections;
        self
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.path.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.path.last().copied()
    }

    /// Endpoint at the requested end of the path.
    pub fn endpoint(&self, at_end: bool) -> Option<Coordinate> {
        if at_end {
            self.last()
        } else {
            self.first()
        }
    }

    /// Index of the last path point (0 for degenerate segments).
    pub fn last_index(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn declares(&self, other: SegmentId) -> bool {
        self.connections.contains(&other)
    }
}

/// A station placed on a track segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub position: Coordinate,
    /// Segment the station sits on.
    pub track: SegmentId,
    /// Assigned once at generation time; stable for the station's lifetime.
    pub can_generate: bool,
}

/// Result of a connection query at one end of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionInfo {
    pub target: SegmentId,
    /// Index into the target's path to resume from.
    pub start_index: usize,
    /// Whether the target is traversed against its natural path order.
    pub reversed: bool,
    /// Gap between the two endpoints, in metres.
    pub gap_m: f64,
    /// Whether the source segment declares the target as a neighbour.
    pub declared: bool,
}

// =============================================================================
// Resource
// =============================================================================

/// Read-only track topology for the current session.
///
/// Regenerated only when the map centre changes; `revision` is bumped on each
/// regeneration so observers know when to re-fetch geometry.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize, Encode, Decode)]
pub struct TrackNetwork {
    pub segments: Vec<TrackSegment>,
    pub stations: Vec<Station>,
    /// The player's home station: preferred destination, never a source.
    pub personal_station: Option<StationId>,
    pub center: Option<Coordinate>,
    pub revision: u64,
}
