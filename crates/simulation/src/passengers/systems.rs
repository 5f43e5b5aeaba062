use bevy::prelude::*;

use crate::game_flow::GameFlow;
use crate::game_params::GameParams;
use crate::levels::LevelBook;
use crate::notifications::{NotificationEvent, NotificationPriority};
use crate::player_stats::PlayerStats;
use crate::sim_clock::SimClock;
use crate::sim_rng::SimRng;
use crate::track_network::{StationId, TrackNetwork};
use crate::train_motion::TrainState;

use super::ledger::PassengerLedger;
use super::spawning::{generate_passengers, generation_due};
use super::types::*;

#[allow(clippy::too_many_arguments)]
pub fn spawn_passengers_on_timer(
    flow: Res<GameFlow>,
    clock: Res<SimClock>,
    book: Res<LevelBook>,
    network: Res<TrackNetwork>,
    params: Res<GameParams>,
    mut ledger: ResMut<PassengerLedger>,
    mut rng: ResMut<SimRng>,
    mut events: EventWriter<PassengerEvent>,
) {
    if !clock.running(&flow) {
        return;
    }
    let Some(level) = book.active() else {
        return;
    };
    if !generation_due(&ledger, level, clock.elapsed_ms) {
        return;
    }
    let spawned = generate_passengers(
        &network,
        &mut ledger,
        level,
        book.active_index(),
        &params.passengers,
        clock.elapsed_ms,
        clock.tick,
        &mut rng.0,
    );
    for p in spawned {
        events.send(PassengerEvent::Spawned {
            id: p.id,
            origin: p.origin,
            destination: p.destination,
        });
    }
}

/// Expiry, then delivery, then pickup. Delivery and pickup are skipped
/// while the presentation layer is animating the train between points.
pub fn check_passenger_interactions(
    flow: Res<GameFlow>,
    clock: Res<SimClock>,
    params: Res<GameParams>,
    mut ledger: ResMut<PassengerLedger>,
    mut train: ResMut<TrainState>,
    mut events: EventWriter<PassengerEvent>,
) {
    if !clock.running(&flow) {
        return;
    }
    let params = &params.passengers;
    for p in ledger.expire_due(clock.elapsed_ms, params) {
        events.send(PassengerEvent::Expired {
            id: p.id,
            origin: p.origin,
            penalty_points: params.expiry_penalty_points,
        });
    }

    if train.animating {
        return;
    }
    for (p, reward) in ledger.deliver_arrivals(&mut train, clock.elapsed_ms, params) {
        events.send(PassengerEvent::Delivered {
            id: p.id,
            destination: p.destination,
            reward,
        });
    }
    for (id, origin) in ledger.board_nearby(&mut train, clock.elapsed_ms, clock.tick, params) {
        events.send(PassengerEvent::PickedUp { id, origin });
    }
}

fn station_name(network: &TrackNetwork, id: StationId) -> String {
    network
        .station(id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| format!("station {}", id.0))
}

/// Turn lifecycle events into score changes and player-facing messages.
pub fn apply_passenger_events(
    mut events: EventReader<PassengerEvent>,
    mut stats: ResMut<PlayerStats>,
    params: Res<GameParams>,
    network: Res<TrackNetwork>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for event in events.read() {
        match event {
            PassengerEvent::Spawned {
                id,
                origin,
                destination,
            } => {
                notifications.send(NotificationEvent::new(
                    format!(
                        "Passenger #{} waiting at {} for {}",
                        id.0,
                        station_name(&network, *origin),
                        station_name(&network, *destination)
                    ),
                    NotificationPriority::Info,
                ));
            }
            PassengerEvent::PickedUp { id, origin } => {
                notifications.send(NotificationEvent::new(
                    format!(
                        "Picked up passenger #{} at {}",
                        id.0,
                        station_name(&network, *origin)
                    ),
                    NotificationPriority::Info,
                ));
            }
            PassengerEvent::Delivered {
                id,
                destination,
                reward,
            } => {
                stats.money += reward.money;
                stats.points += reward.points;
                stats.delivered += 1;
                stats.adjust_happiness(reward.happiness);
                let text = if reward.fast {
                    format!(
                        "Fast delivery! Passenger #{} reached {}: +${} +{} pts",
                        id.0,
                        station_name(&network, *destination),
                        reward.money,
                        reward.points
                    )
                } else if reward.on_time {
                    format!(
                        "Passenger #{} delivered to {}: +${} +{} pts",
                        id.0,
                        station_name(&network, *destination),
                        reward.money,
                        reward.points
                    )
                } else {
                    format!(
                        "Late delivery of passenger #{} to {}: +{} pts, no fare",
                        id.0,
                        station_name(&network, *destination),
                        reward.points
                    )
                };
                notifications.send(NotificationEvent::new(text, NotificationPriority::Positive));
            }
            PassengerEvent::Expired {
                id,
                origin,
                penalty_points,
            } => {
                stats.points -= penalty_points;
                stats.expired += 1;
                stats.adjust_happiness(-params.passengers.happiness_expiry_loss);
                notifications.send(NotificationEvent::new(
                    format!(
                        "Passenger #{} gave up waiting at {}: -{} pts",
                        id.0,
                        station_name(&network, *origin),
                        penalty_points
                    ),
                    NotificationPriority::Warning,
                ));
            }
        }
    }
}
