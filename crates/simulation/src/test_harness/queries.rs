//! State-poking helpers for `TestSession`.

use bevy::prelude::*;

use crate::game_params::GameParams;
use crate::passengers::{Passenger, PassengerId, PassengerLedger};
use crate::sim_clock::SimClock;
use crate::track_network::{SegmentId, StationId, TrackNetwork};
use crate::train_motion::{MotionController, TrainState};

use super::TestSession;

impl TestSession {
    /// Put a waiting passenger on the platform of `origin`, stamped with
    /// the current clock.
    pub fn admit_waiting(&mut self, origin: u32, destination: u32) -> PassengerId {
        let world = self.world_mut();
        let (now, tick) = {
            let clock = world.resource::<SimClock>();
            (clock.elapsed_ms, clock.tick)
        };
        let at = |world: &World, s: u32| {
            world
                .resource::<TrackNetwork>()
                .station(StationId(s))
                .map(|st| st.position)
                .expect("fixture station exists")
        };
        let position = at(world, origin);
        let destination_position = at(world, destination);
        let mut ledger = world.resource_mut::<PassengerLedger>();
        let id = ledger.allocate_id();
        ledger.admit(Passenger {
            id,
            origin: StationId(origin),
            destination: StationId(destination),
            position,
            destination_position,
            created_at_ms: now,
            created_tick: tick,
            picked_up_at_ms: None,
        });
        id
    }

    /// Teleport the train to `index` of `segment`.
    pub fn place_train(&mut self, segment: u32, index: usize) {
        let world = self.world_mut();
        world.resource_scope(|world, mut controller: Mut<MotionController>| {
            world.resource_scope(|world, mut train: Mut<TrainState>| {
                let network = world.resource::<TrackNetwork>();
                controller
                    .place(&mut train, network, SegmentId(segment), index)
                    .expect("fixture segment exists");
            });
        });
    }

    /// Park the train on the track point nearest station `station`.
    pub fn park_at_station(&mut self, station: u32) {
        let (segment, index) = {
            let network = self.network();
            let st = network
                .station(StationId(station))
                .expect("fixture station exists");
            let path = &network
                .segment(st.track)
                .expect("station track exists")
                .path;
            let index = crate::geometry::closest_index_on_path(st.position, path).unwrap_or(0);
            (st.track.0, index)
        };
        self.place_train(segment, index);
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.world_mut().resource_mut::<TrainState>().animating = animating;
    }

    pub fn params_mut(&mut self) -> Mut<'_, GameParams> {
        self.world_mut().resource_mut::<GameParams>()
    }

    pub fn riding_ids(&self) -> Vec<PassengerId> {
        self.train().manifest.iter().map(|p| p.id).collect()
    }

    /// Tick until `done` holds or `max` ticks have run; returns ticks used.
    pub fn tick_until(&mut self, max: u32, mut done: impl FnMut(&Self) -> bool) -> Option<u32> {
        for n in 0..max {
            if done(self) {
                return Some(n);
            }
            self.tick(1);
        }
        done(self).then_some(max)
    }
}
