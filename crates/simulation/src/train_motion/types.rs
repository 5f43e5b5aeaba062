use std::collections::BTreeSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_LOCATION;
use crate::geometry::Coordinate;
use crate::passengers::Passenger;
use crate::track_network::SegmentId;

// =============================================================================
// Modes and outcomes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriveMode {
    /// One step per `StepTrainEvent`.
    #[default]
    Manual,
    /// Follow connections; reverse at dead ends.
    Cruise,
    /// Route toward passengers and their destinations; explore when idle.
    GoalDirected,
}

impl DriveMode {
    pub fn label(self) -> &'static str {
        match self {
            DriveMode::Manual => "Manual",
            DriveMode::Cruise => "Cruise",
            DriveMode::GoalDirected => "Auto-route",
        }
    }
}

/// What a single step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved one point along the current segment.
    Advanced,
    /// Crossed a boundary onto a connected segment.
    Transferred { from: SegmentId, to: SegmentId },
    /// Hit a dead end and turned around in place.
    Reversed,
    /// Discontinuous move onto another segment (fallback or exploration).
    Jumped { to: SegmentId },
    /// Parked at the goal, or waiting for a route to be re-planned.
    Holding,
    /// Every segment has been visited; the visited set was cleared.
    ExplorationComplete,
}

// =============================================================================
// Resources
// =============================================================================

/// The train. Position, segment, index and direction are written only by
/// the motion controller; the manifest only by the passenger ledger.
///
/// `path_index` is always a valid index into the current segment's path and
/// `manifest.len()` never exceeds `capacity`.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TrainState {
    pub position: Coordinate,
    pub segment: SegmentId,
    pub path_index: usize,
    pub reversed: bool,
    pub manifest: Vec<Passenger>,
    pub capacity: u32,
    /// Set by the presentation layer while it animates a move; interaction
    /// checks are skipped meanwhile.
    pub animating: bool,
}

impl Default for TrainState {
    fn default() -> Self {
        Self {
            position: DEFAULT_LOCATION,
            segment: SegmentId(0),
            path_index: 0,
            reversed: false,
            manifest: Vec::new(),
            capacity: 4,
            animating: false,
        }
    }
}

impl TrainState {
    pub fn has_room(&self) -> bool {
        self.manifest.len() < self.capacity as usize
    }
}

/// Motion state machine bookkeeping.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct MotionController {
    pub mode: DriveMode,
    pub visited: BTreeSet<SegmentId>,
    /// Segments in order of first visit; feeds saved routes.
    pub visit_order: Vec<SegmentId>,
    pub active_route: Option<Vec<SegmentId>>,
    pub route_index: usize,
    /// Segment the train last reversed on without leaving it.
    pub bounced_on: Option<SegmentId>,
    /// Consecutive ticks spent parked at the goal.
    pub hold_ticks: u32,
    pub(crate) came_from: Option<SegmentId>,
}

// =============================================================================
// Commands
// =============================================================================

/// Advance the train one step (manual mode).
#[derive(Event, Debug, Clone, Copy)]
pub struct StepTrainEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct SetDriveModeEvent(pub DriveMode);

/// The player clicked a segment on the map.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectSegmentEvent(pub SegmentId);

/// The player clicked a map point; the nearest track within the select
/// radius is entered.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectPointEvent(pub Coordinate);
