//! Data-driven game parameters.
//!
//! Every tunable of the passenger lifecycle, the motion controller and the
//! network generator lives in the [`GameParams`] resource, so levels and tests
//! can adjust them without recompilation. The resource is `Saveable`, so
//! overrides persist across save/load.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SELECT_RADIUS_M;
use crate::track_network::NetworkGenParams;

// ---------------------------------------------------------------------------
// Passenger lifecycle
// ---------------------------------------------------------------------------

/// Timing, reward and spawning tunables. Durations are simulation
/// milliseconds measured from a passenger's `created_at_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct PassengerParams {
    /// A waiting passenger expires once this long has passed.
    pub waiting_timeout_ms: u64,
    /// Deliveries within this window earn the fast bonus.
    pub fast_bonus_window_ms: u64,
    /// Base money is paid only within this window.
    pub delivery_time_limit_ms: u64,
    pub base_reward_money: i64,
    pub fast_bonus_money: i64,
    /// Points for any delivery, late ones included.
    pub base_points: i64,
    pub fast_bonus_points: i64,
    pub expiry_penalty_points: i64,
    /// Pickup and delivery radius, metres.
    pub pickup_radius_m: f64,
    /// Max offset of a waiting passenger from its station, degrees.
    pub jitter_deg: f64,
    pub personal_destination_probability: f64,
    /// Per generation event, chance that an eligible station fires.
    pub station_spawn_probability: f64,
    pub happiness_delivery_gain: f32,
    pub happiness_late_loss: f32,
    pub happiness_expiry_loss: f32,
}

impl Default for PassengerParams {
    fn default() -> Self {
        Self {
            waiting_timeout_ms: 90_000,
            fast_bonus_window_ms: 30_000,
            delivery_time_limit_ms: 120_000,
            base_reward_money: 100,
            fast_bonus_money: 50,
            base_points: 10,
            fast_bonus_points: 5,
            expiry_penalty_points: 5,
            pickup_radius_m: 40.0,
            jitter_deg: 0.0001,
            personal_destination_probability: 0.7,
            station_spawn_probability: 0.3,
            happiness_delivery_gain: 2.0,
            happiness_late_loss: 1.0,
            happiness_expiry_loss: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct MotionParams {
    /// Automatic modes step once every this many ticks.
    pub move_every_ticks: u64,
    /// Map clicks further than this from every segment select nothing.
    pub select_radius_m: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            move_every_ticks: 2,
            select_radius_m: SELECT_RADIUS_M,
        }
    }
}

/// Weights of the "best unvisited segment" score used while exploring:
///
/// `station_weight * stations + passenger_weight * waiting
///  - visited_penalty (if visited)
///  - min(distance_weight_per_km * km, distance_penalty_cap)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode)]
pub struct ExploreWeights {
    pub station_weight: f64,
    pub passenger_weight: f64,
    pub visited_penalty: f64,
    pub distance_weight_per_km: f64,
    pub distance_penalty_cap: f64,
    /// Stations and passengers within this many metres of a segment count as near it.
    pub nearby_radius_m: f64,
    /// A jump target must score strictly above this to beat a visited neighbour.
    pub score_floor: f64,
}

impl Default for ExploreWeights {
    fn default() -> Self {
        Self {
            station_weight: 10.0,
            passenger_weight: 20.0,
            visited_penalty: 50.0,
            distance_weight_per_km: 10.0,
            distance_penalty_cap: 50.0,
            nearby_radius_m: 300.0,
            score_floor: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level resource
// ---------------------------------------------------------------------------

#[derive(
    Resource,
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct GameParams {
    pub passengers: PassengerParams,
    pub motion: MotionParams,
    pub explore: ExploreWeights,
    pub network: NetworkGenParams,
}

impl crate::Saveable for GameParams {
    const SAVE_KEY: &'static str = "game_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

pub struct GameParamsPlugin;

impl Plugin for GameParamsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameParams>();
        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<GameParams>();
    }
}
