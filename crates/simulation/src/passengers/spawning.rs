//! Timed passenger generation at eligible stations.

use rand::Rng;

use crate::game_params::PassengerParams;
use crate::geometry::jitter;
use crate::levels::GameLevel;
use crate::track_network::{Station, StationId, TrackNetwork};

use super::ledger::PassengerLedger;
use super::types::*;

/// Largest batch a single station may produce on the given level.
pub fn max_batch(level_index: usize) -> usize {
    1 + level_index / 2
}

/// Whether the generation interval has elapsed.
pub fn generation_due(ledger: &PassengerLedger, level: &GameLevel, now_ms: u64) -> bool {
    now_ms.saturating_sub(ledger.last_generation_ms) >= level.passenger_frequency_interval_ms
}

/// Destination for a passenger leaving `origin`: the home station with
/// `personal_destination_probability`, otherwise any other station uniformly.
/// Never `origin` itself; `None` if there is nowhere else to go.
pub fn pick_destination<'a, R: Rng>(
    network: &'a TrackNetwork,
    origin: StationId,
    params: &PassengerParams,
    rng: &mut R,
) -> Option<&'a Station> {
    if let Some(home) = network.personal_station().filter(|home| home.id != origin) {
        if rng.gen_bool(params.personal_destination_probability.clamp(0.0, 1.0)) {
            return Some(home);
        }
    }
    let others: Vec<&Station> = network.stations.iter().filter(|s| s.id != origin).collect();
    if others.is_empty() {
        return None;
    }
    Some(others[rng.gen_range(0..others.len())])
}

/// Run one generation event. Returns the spawned passengers, which the
/// ledger already holds.
///
/// Nothing is generated once the waiting pool reaches the level's cap, and a
/// batch never overshoots it.
#[allow(clippy::too_many_arguments)]
pub fn generate_passengers<R: Rng>(
    network: &TrackNetwork,
    ledger: &mut PassengerLedger,
    level: &GameLevel,
    level_index: usize,
    params: &PassengerParams,
    now_ms: u64,
    tick: u64,
    rng: &mut R,
) -> Vec<Passenger> {
    ledger.last_generation_ms = now_ms;
    let cap = level.max_active_passengers as usize;
    let mut spawned = Vec::new();
    if ledger.waiting_count() >= cap {
        return spawned;
    }

    let batch_max = max_batch(level_index);
    for station in network.generating_stations() {
        let remaining = cap.saturating_sub(ledger.waiting_count());
        if remaining == 0 {
            break;
        }
        if !rng.gen_bool(params.station_spawn_probability.clamp(0.0, 1.0)) {
            continue;
        }
        let count = rng.gen_range(1..=batch_max).min(remaining);
        for _ in 0..count {
            let Some(destination) = pick_destination(network, station.id, params, rng) else {
                break;
            };
            let passenger = Passenger {
                id: ledger.allocate_id(),
                origin: station.id,
                destination: destination.id,
                position: jitter(station.position, params.jitter_deg, rng),
                destination_position: destination.position,
                created_at_ms: now_ms,
                created_tick: tick,
                picked_up_at_ms: None,
            };
            ledger.admit(passenger.clone());
            spawned.push(passenger);
        }
    }
    spawned
}
