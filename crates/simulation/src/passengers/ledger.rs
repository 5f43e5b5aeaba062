//! Ownership of every live passenger and the interaction checks.
//!
//! A passenger is in exactly one place at a time: the waiting pool here, the
//! train manifest, or (after delivery or expiry) only in the `retired` set.
//! Every check consults `retired` first, so a removed id is never processed
//! twice.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::game_params::PassengerParams;
use crate::geometry::distance_m;
use crate::track_network::StationId;
use crate::train_motion::TrainState;

use super::rewards::delivery_reward;
use super::types::*;

#[derive(Resource, Debug, Default)]
pub struct PassengerLedger {
    pub(crate) waiting: Vec<Passenger>,
    pub(crate) retired: BTreeSet<PassengerId>,
    next_id: u64,
    pub delivered: u32,
    pub expired: u32,
    /// `SimClock::elapsed_ms` of the last generation event.
    pub last_generation_ms: u64,
}

impl PassengerLedger {
    pub fn waiting(&self) -> &[Passenger] {
        &self.waiting
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_retired(&self, id: PassengerId) -> bool {
        self.retired.contains(&id)
    }

    pub fn allocate_id(&mut self) -> PassengerId {
        self.next_id += 1;
        PassengerId(self.next_id)
    }

    /// Add a freshly generated passenger to the waiting pool.
    pub fn admit(&mut self, passenger: Passenger) {
        if self.is_retired(passenger.id) || self.waiting.iter().any(|p| p.id == passenger.id) {
            warn!("Passenger #{} admitted twice; ignoring", passenger.id.0);
            return;
        }
        self.waiting.push(passenger);
    }

    /// Remove waiting passengers whose wait exceeded the timeout.
    pub fn expire_due(&mut self, now_ms: u64, params: &PassengerParams) -> Vec<Passenger> {
        let retired = &mut self.retired;
        let mut expired = Vec::new();
        self.waiting.retain(|p| {
            if retired.contains(&p.id) {
                return false;
            }
            if p.age_ms(now_ms) > params.waiting_timeout_ms {
                retired.insert(p.id);
                expired.push(p.clone());
                return false;
            }
            true
        });
        self.expired += expired.len() as u32;
        expired
    }

    /// Drop riders within the pickup radius of their destination and price
    /// each delivery.
    pub fn deliver_arrivals(
        &mut self,
        train: &mut TrainState,
        now_ms: u64,
        params: &PassengerParams,
    ) -> Vec<(Passenger, Reward)> {
        let position = train.position;
        let mut delivered = Vec::new();
        let retired = &mut self.retired;
        train.manifest.retain(|p| {
            if retired.contains(&p.id) {
                return false;
            }
            if distance_m(position, p.destination_position) <= params.pickup_radius_m {
                retired.insert(p.id);
                let reward = delivery_reward(p.created_at_ms, now_ms, params);
                delivered.push((p.clone(), reward));
                return false;
            }
            true
        });
        self.delivered += delivered.len() as u32;
        delivered
    }

    /// Board waiting passengers within the pickup radius while the manifest
    /// has room. Passengers created in `tick` stay on the platform.
    pub fn board_nearby(
        &mut self,
        train: &mut TrainState,
        now_ms: u64,
        tick: u64,
        params: &PassengerParams,
    ) -> Vec<(PassengerId, StationId)> {
        let mut boarded = Vec::new();
        let mut i = 0;
        while i < self.waiting.len() {
            if !train.has_room() {
                break;
            }
            let p = &self.waiting[i];
            let eligible = !self.retired.contains(&p.id)
                && p.created_tick != tick
                && distance_m(train.position, p.position) <= params.pickup_radius_m;
            if eligible {
                let mut rider = self.waiting.remove(i);
                rider.picked_up_at_ms = Some(now_ms);
                boarded.push((rider.id, rider.origin));
                train.manifest.push(rider);
            } else {
                i += 1;
            }
        }
        boarded
    }

    /// Clear the platform and the manifest for a fresh level. Cleared ids
    /// are retired, not counted as delivered or expired.
    pub fn reset_for_level(&mut self, manifest: &mut Vec<Passenger>, now_ms: u64) {
        for p in self.waiting.drain(..).chain(manifest.drain(..)) {
            self.retired.insert(p.id);
        }
        self.delivered = 0;
        self.expired = 0;
        self.last_generation_ms = now_ms;
    }
}
