//! Unit tests for generation, expiry, pickup, delivery and rewards.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::game_params::PassengerParams;
use crate::geometry::offset_m;
use crate::levels::{default_levels, GameLevel};
use crate::test_harness::fixtures::*;
use crate::track_network::{StationId, TrackNetwork};
use crate::train_motion::TrainState;

use super::*;

fn three_station_network() -> TrackNetwork {
    with_stations(
        chain_network(3),
        &[(0, 2, true), (1, 2, true), (2, 2, true)],
        None,
    )
}

fn waiting_at(
    ledger: &mut PassengerLedger,
    network: &TrackNetwork,
    origin: u32,
    destination: u32,
    created_at_ms: u64,
    created_tick: u64,
) -> PassengerId {
    let station = |s: u32| network.station(StationId(s)).unwrap().position;
    let id = ledger.allocate_id();
    ledger.admit(Passenger {
        id,
        origin: StationId(origin),
        destination: StationId(destination),
        position: station(origin),
        destination_position: station(destination),
        created_at_ms,
        created_tick,
        picked_up_at_ms: None,
    });
    id
}

fn train_at_station(network: &TrackNetwork, station: u32, capacity: u32) -> TrainState {
    TrainState {
        position: network.station(StationId(station)).unwrap().position,
        capacity,
        ..Default::default()
    }
}

fn level(max_active: u32) -> GameLevel {
    let mut level = default_levels().remove(0);
    level.max_active_passengers = max_active;
    level
}

// =============================================================================
// Rewards
// =============================================================================

#[test]
fn test_fast_delivery_earns_bonus() {
    let params = PassengerParams::default();
    let reward = delivery_reward(10, 10 + params.fast_bonus_window_ms - 1, &params);
    assert!(reward.fast);
    assert!(reward.on_time);
    assert_eq!(
        reward.money,
        params.base_reward_money + params.fast_bonus_money
    );
    assert_eq!(reward.points, params.base_points + params.fast_bonus_points);
    assert_eq!(reward.happiness, params.happiness_delivery_gain);
}

#[test]
fn test_on_time_delivery_pays_base_only() {
    let params = PassengerParams::default();
    let reward = delivery_reward(10, 10 + params.fast_bonus_window_ms + 1, &params);
    assert!(!reward.fast);
    assert!(reward.on_time);
    assert_eq!(reward.money, params.base_reward_money);
    assert_eq!(reward.points, params.base_points);
}

#[test]
fn test_late_delivery_pays_no_money() {
    let params = PassengerParams::default();
    let reward = delivery_reward(10, 10 + params.delivery_time_limit_ms + 1, &params);
    assert!(!reward.fast);
    assert!(!reward.on_time);
    assert_eq!(reward.money, 0);
    assert_eq!(reward.points, params.base_points);
    assert_eq!(reward.happiness, -params.happiness_late_loss);
}

// =============================================================================
// Expiry
// =============================================================================

#[test]
fn test_expiry_is_strictly_after_timeout() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    let id = waiting_at(&mut ledger, &network, 0, 1, 0, 0);

    assert!(ledger.expire_due(params.waiting_timeout_ms, &params).is_empty());
    assert_eq!(ledger.waiting_count(), 1);

    let expired = ledger.expire_due(params.waiting_timeout_ms + 1, &params);
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, id);
    assert!(ledger.is_retired(id));
    assert_eq!(ledger.waiting_count(), 0);
    assert_eq!(ledger.expired, 1);
}

#[test]
fn test_expiry_runs_once_per_passenger() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    waiting_at(&mut ledger, &network, 0, 1, 0, 0);

    let late = params.waiting_timeout_ms + 10;
    assert_eq!(ledger.expire_due(late, &params).len(), 1);
    assert!(ledger.expire_due(late, &params).is_empty());
    assert!(ledger.expire_due(late * 2, &params).is_empty());
    assert_eq!(ledger.expired, 1);
}

#[test]
fn test_riders_never_expire() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    waiting_at(&mut ledger, &network, 0, 2, 0, 0);
    let mut train = train_at_station(&network, 0, 4);
    assert_eq!(ledger.board_nearby(&mut train, 5, 1, &params).len(), 1);

    assert!(ledger
        .expire_due(params.waiting_timeout_ms * 10, &params)
        .is_empty());
    assert_eq!(train.manifest.len(), 1);
}

// =============================================================================
// Pickup and delivery
// =============================================================================

#[test]
fn test_pickup_respects_capacity() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    for _ in 0..5 {
        waiting_at(&mut ledger, &network, 0, 1, 0, 0);
    }
    let mut train = train_at_station(&network, 0, 3);

    let boarded = ledger.board_nearby(&mut train, 100, 1, &params);
    assert_eq!(boarded.len(), 3);
    assert_eq!(train.manifest.len(), 3);
    assert_eq!(ledger.waiting_count(), 2);
    assert!(train.manifest.iter().all(|p| p.picked_up_at_ms == Some(100)));

    assert!(ledger.board_nearby(&mut train, 200, 2, &params).is_empty());
    assert_eq!(train.manifest.len(), 3);
}

#[test]
fn test_pickup_skips_passengers_created_this_tick() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    waiting_at(&mut ledger, &network, 0, 1, 0, 7);
    let mut train = train_at_station(&network, 0, 4);

    assert!(ledger.board_nearby(&mut train, 0, 7, &params).is_empty());
    assert_eq!(ledger.board_nearby(&mut train, 100, 8, &params).len(), 1);
}

#[test]
fn test_pickup_ignores_distant_passengers() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    waiting_at(&mut ledger, &network, 2, 0, 0, 0);
    let mut train = train_at_station(&network, 0, 4);
    assert!(ledger.board_nearby(&mut train, 100, 1, &params).is_empty());
    assert_eq!(ledger.waiting_count(), 1);
}

#[test]
fn test_delivery_at_destination_pays_and_retires() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    let id = waiting_at(&mut ledger, &network, 0, 2, 10, 0);
    let mut train = train_at_station(&network, 0, 4);
    ledger.board_nearby(&mut train, 10, 1, &params);

    // Not there yet.
    assert!(ledger.deliver_arrivals(&mut train, 500, &params).is_empty());

    train.position = network.station(StationId(2)).unwrap().position;
    let delivered = ledger.deliver_arrivals(&mut train, 10 + params.fast_bonus_window_ms - 1, &params);
    assert_eq!(delivered.len(), 1);
    let (passenger, reward) = &delivered[0];
    assert_eq!(passenger.id, id);
    assert!(reward.fast);
    assert!(train.manifest.is_empty());
    assert!(ledger.is_retired(id));
    assert_eq!(ledger.delivered, 1);

    assert!(ledger.deliver_arrivals(&mut train, 50_000, &params).is_empty());
}

#[test]
fn test_passenger_is_in_exactly_one_place() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    for origin in 0..3 {
        waiting_at(&mut ledger, &network, origin, (origin + 1) % 3, 0, 0);
    }
    let mut train = train_at_station(&network, 0, 4);
    ledger.board_nearby(&mut train, 100, 1, &params);
    train.position = network.station(StationId(1)).unwrap().position;
    ledger.deliver_arrivals(&mut train, 200, &params);
    ledger.board_nearby(&mut train, 200, 2, &params);

    let waiting: BTreeSet<PassengerId> = ledger.waiting().iter().map(|p| p.id).collect();
    let riding: BTreeSet<PassengerId> = train.manifest.iter().map(|p| p.id).collect();
    assert!(waiting.is_disjoint(&riding));
    for id in waiting.iter().chain(riding.iter()) {
        assert!(!ledger.is_retired(*id));
    }
    assert_eq!(waiting.len() + riding.len() + ledger.delivered as usize, 3);
}

#[test]
fn test_retired_id_cannot_be_readmitted() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    waiting_at(&mut ledger, &network, 0, 1, 0, 0);
    let expired = ledger.expire_due(params.waiting_timeout_ms + 1, &params);

    ledger.admit(expired[0].clone());
    assert_eq!(ledger.waiting_count(), 0);
}

#[test]
fn test_reset_for_level_clears_everything() {
    let network = three_station_network();
    let params = PassengerParams::default();
    let mut ledger = PassengerLedger::default();
    let a = waiting_at(&mut ledger, &network, 0, 1, 0, 0);
    let b = waiting_at(&mut ledger, &network, 1, 2, 0, 0);
    let mut train = train_at_station(&network, 0, 4);
    ledger.board_nearby(&mut train, 100, 1, &params);

    ledger.reset_for_level(&mut train.manifest, 5_000);

    assert_eq!(ledger.waiting_count(), 0);
    assert!(train.manifest.is_empty());
    assert!(ledger.is_retired(a) && ledger.is_retired(b));
    assert_eq!(ledger.last_generation_ms, 5_000);
    assert_eq!(ledger.delivered, 0);
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_max_batch_grows_with_level() {
    assert_eq!(max_batch(0), 1);
    assert_eq!(max_batch(1), 1);
    assert_eq!(max_batch(2), 2);
    assert_eq!(max_batch(5), 3);
}

#[test]
fn test_generation_due_after_interval() {
    let mut ledger = PassengerLedger::default();
    ledger.last_generation_ms = 1_000;
    let level = level(10);
    let interval = level.passenger_frequency_interval_ms;
    assert!(!generation_due(&ledger, &level, 1_000 + interval - 1));
    assert!(generation_due(&ledger, &level, 1_000 + interval));
}

#[test]
fn test_destination_is_never_origin() {
    let network = with_stations(
        chain_network(3),
        &[(0, 2, true), (1, 2, true), (2, 2, false)],
        Some(2),
    );
    let params = PassengerParams::default();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..200 {
        for origin in 0..3 {
            let dest = pick_destination(&network, StationId(origin), &params, &mut rng).unwrap();
            assert_ne!(dest.id, StationId(origin));
        }
    }
}

#[test]
fn test_single_station_has_no_destination() {
    let network = with_stations(chain_network(1), &[(0, 2, true)], None);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    assert!(
        pick_destination(&network, StationId(0), &PassengerParams::default(), &mut rng).is_none()
    );
    let mut ledger = PassengerLedger::default();
    let params = PassengerParams {
        station_spawn_probability: 1.0,
        ..Default::default()
    };
    let spawned = generate_passengers(&network, &mut ledger, &level(10), 0, &params, 0, 0, &mut rng);
    assert!(spawned.is_empty());
}

#[test]
fn test_generation_never_exceeds_cap() {
    let network = three_station_network();
    let params = PassengerParams {
        station_spawn_probability: 1.0,
        ..Default::default()
    };
    let level = level(4);
    let mut ledger = PassengerLedger::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for round in 0..20u64 {
        let now = round * level.passenger_frequency_interval_ms;
        let spawned = generate_passengers(&network, &mut ledger, &level, 6, &params, now, round, &mut rng);
        assert!(ledger.waiting_count() <= 4, "round {round}: {}", ledger.waiting_count());
        assert_eq!(ledger.last_generation_ms, now);
        for p in &spawned {
            assert_ne!(p.origin, p.destination);
            assert_eq!(p.created_at_ms, now);
            assert_eq!(p.created_tick, round);
        }
    }
    assert_eq!(ledger.waiting_count(), 4);
}

#[test]
fn test_generation_skips_home_and_jitters_position() {
    let network = with_stations(chain_network(2), &[(0, 2, true), (1, 2, true)], Some(1));
    let params = PassengerParams {
        station_spawn_probability: 1.0,
        ..Default::default()
    };
    let mut ledger = PassengerLedger::default();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let spawned = generate_passengers(&network, &mut ledger, &level(10), 0, &params, 0, 0, &mut rng);

    assert!(!spawned.is_empty());
    let origin = network.station(StationId(0)).unwrap().position;
    let far = offset_m(origin, 100.0, 0.0);
    for p in &spawned {
        assert_eq!(p.origin, StationId(0));
        assert_eq!(p.destination, StationId(1));
        assert!(crate::geometry::distance_m(p.position, origin) < crate::geometry::distance_m(far, origin));
    }
}

#[test]
fn test_generation_is_deterministic_per_seed() {
    let network = three_station_network();
    let params = PassengerParams {
        station_spawn_probability: 0.5,
        ..Default::default()
    };
    let run = |seed: u64| {
        let mut ledger = PassengerLedger::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_passengers(&network, &mut ledger, &level(50), 4, &params, 0, 0, &mut rng)
    };
    assert_eq!(run(9), run(9));
}
