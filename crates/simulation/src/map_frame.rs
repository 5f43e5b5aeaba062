//! Read-only snapshot for the map provider.
//!
//! Rebuilt at the end of every tick. Dynamic state (train, waiting
//! passengers) is copied each time; segment and station geometry only when
//! the network revision changes.

use bevy::prelude::*;

use crate::config::DEFAULT_LOCATION;
use crate::geometry::Coordinate;
use crate::passengers::{PassengerId, PassengerLedger};
use crate::sim_clock::SimClock;
use crate::simulation_sets::TickSet;
use crate::track_network::{SegmentId, StationId, TrackNetwork};
use crate::train_motion::{DriveMode, MotionController, TrainState};

#[derive(Debug, Clone, PartialEq)]
pub struct StationMarker {
    pub id: StationId,
    pub name: String,
    pub position: Coordinate,
    pub is_personal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaitingMarker {
    pub id: PassengerId,
    pub station: StationId,
    pub position: Coordinate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGeometry {
    pub id: SegmentId,
    pub path: Vec<Coordinate>,
}

#[derive(Resource, Debug, Clone)]
pub struct MapFrame {
    pub tick: u64,
    pub train_position: Coordinate,
    pub train_segment: SegmentId,
    pub train_reversed: bool,
    pub riders: usize,
    pub capacity: u32,
    pub mode: DriveMode,
    pub network_revision: u64,
    pub center: Option<Coordinate>,
    pub stations: Vec<StationMarker>,
    pub waiting: Vec<WaitingMarker>,
    pub segments: Vec<SegmentGeometry>,
    /// Revision the geometry above was copied from.
    geometry_revision: Option<u64>,
}

impl Default for MapFrame {
    fn default() -> Self {
        Self {
            tick: 0,
            train_position: DEFAULT_LOCATION,
            train_segment: SegmentId(0),
            train_reversed: false,
            riders: 0,
            capacity: 0,
            mode: DriveMode::default(),
            network_revision: 0,
            center: None,
            stations: Vec::new(),
            waiting: Vec::new(),
            segments: Vec::new(),
            geometry_revision: None,
        }
    }
}

impl MapFrame {
    /// Whether `segments`/`stations` describe `network`'s current revision.
    pub fn geometry_current(&self, network: &TrackNetwork) -> bool {
        self.geometry_revision == Some(network.revision)
    }

    fn copy_geometry(&mut self, network: &TrackNetwork) {
        self.segments = network
            .segments
            .iter()
            .map(|s| SegmentGeometry {
                id: s.id,
                path: s.path.clone(),
            })
            .collect();
        self.stations = network
            .stations
            .iter()
            .map(|s| StationMarker {
                id: s.id,
                name: s.name.clone(),
                position: s.position,
                is_personal: network.personal_station == Some(s.id),
            })
            .collect();
        self.center = network.center;
        self.network_revision = network.revision;
        self.geometry_revision = Some(network.revision);
    }
}

pub fn build_map_frame(
    mut frame: ResMut<MapFrame>,
    clock: Res<SimClock>,
    network: Res<TrackNetwork>,
    train: Res<TrainState>,
    controller: Res<MotionController>,
    ledger: Res<PassengerLedger>,
) {
    if !frame.geometry_current(&network) {
        frame.copy_geometry(&network);
    }
    frame.tick = clock.tick;
    frame.train_position = train.position;
    frame.train_segment = train.segment;
    frame.train_reversed = train.reversed;
    frame.riders = train.manifest.len();
    frame.capacity = train.capacity;
    frame.mode = controller.mode;
    frame.waiting = ledger
        .waiting()
        .iter()
        .map(|p| WaitingMarker {
            id: p.id,
            station: p.origin,
            position: p.position,
        })
        .collect();
}

pub struct MapFramePlugin;

impl Plugin for MapFramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MapFrame>()
            .add_systems(FixedUpdate, build_map_frame.in_set(TickSet::Report));
    }
}
