use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;
use crate::track_network::StationId;

/// Unique, never reused passenger identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PassengerId(pub u64);

/// A simulated traveller.
///
/// Waiting while `picked_up_at_ms` is `None`, riding afterwards. Delivered
/// and expired passengers are dropped from every collection and their id is
/// retired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    pub id: PassengerId,
    pub origin: StationId,
    pub destination: StationId,
    /// Origin plus jitter; only meaningful while waiting.
    pub position: Coordinate,
    pub destination_position: Coordinate,
    pub created_at_ms: u64,
    /// Tick of creation; pickup skips passengers created in the current tick.
    pub created_tick: u64,
    pub picked_up_at_ms: Option<u64>,
}

impl Passenger {
    pub fn is_picked_up(&self) -> bool {
        self.picked_up_at_ms.is_some()
    }

    /// Milliseconds since creation at `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

/// What a delivery pays out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reward {
    pub money: i64,
    pub points: i64,
    pub happiness: f32,
    /// Delivered within the fast-bonus window.
    pub fast: bool,
    /// Delivered within the time-limit window.
    pub on_time: bool,
}

/// One lifecycle transition.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PassengerEvent {
    Spawned {
        id: PassengerId,
        origin: StationId,
        destination: StationId,
    },
    PickedUp {
        id: PassengerId,
        origin: StationId,
    },
    Delivered {
        id: PassengerId,
        destination: StationId,
        reward: Reward,
    },
    Expired {
        id: PassengerId,
        origin: StationId,
        penalty_points: i64,
    },
}
