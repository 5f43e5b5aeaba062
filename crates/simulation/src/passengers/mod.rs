//! Passenger lifecycle: timed generation at stations, expiry, pickup by
//! proximity to the train, delivery and rewards.
//!
//! ```text
//! waiting ──pickup──▶ riding ──delivery──▶ (retired, reward)
//!    │
//!    └──timeout──▶ (retired, penalty)
//! ```

mod ledger;
mod rewards;
mod spawning;
mod systems;
mod types;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

use crate::simulation_sets::TickSet;

pub use ledger::PassengerLedger;
pub use rewards::delivery_reward;
pub use spawning::{generate_passengers, generation_due, max_batch, pick_destination};
pub use systems::{apply_passenger_events, check_passenger_interactions, spawn_passengers_on_timer};
pub use types::*;

pub struct PassengersPlugin;

impl Plugin for PassengersPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PassengerLedger>()
            .add_event::<PassengerEvent>()
            .add_systems(
                FixedUpdate,
                spawn_passengers_on_timer.in_set(TickSet::Generate),
            )
            .add_systems(
                FixedUpdate,
                (check_passenger_interactions, apply_passenger_events)
                    .chain()
                    .in_set(TickSet::Interact),
            );
    }
}
