//! Game-started flag and the start/pause commands.
//!
//! Nothing in the heartbeat moves, spawns or scores while the game is not
//! started or the clock is paused.

use bevy::prelude::*;

use crate::notifications::{NotificationEvent, NotificationPriority};
use crate::sim_clock::SimClock;
use crate::simulation_sets::TickSet;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFlow {
    pub started: bool,
    /// `SimClock::elapsed_ms` at which the active level began.
    pub level_started_ms: u64,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct StartGameEvent;

/// Pause (`true`) or resume (`false`) the clock.
#[derive(Event, Debug, Clone, Copy)]
pub struct PauseGameEvent(pub bool);

pub fn handle_flow_commands(
    mut starts: EventReader<StartGameEvent>,
    mut pauses: EventReader<PauseGameEvent>,
    mut flow: ResMut<GameFlow>,
    mut clock: ResMut<SimClock>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for _ in starts.read() {
        if flow.started {
            continue;
        }
        flow.started = true;
        flow.level_started_ms = clock.elapsed_ms;
        clock.paused = false;
        info!("Game started at {} ms", clock.elapsed_ms);
        notifications.send(NotificationEvent::new(
            "Game started",
            NotificationPriority::Info,
        ));
    }
    for PauseGameEvent(paused) in pauses.read() {
        if clock.paused != *paused {
            clock.paused = *paused;
            let text = if *paused { "Paused" } else { "Resumed" };
            notifications.send(NotificationEvent::new(text, NotificationPriority::Info));
        }
    }
}

pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameFlow>()
            .add_event::<StartGameEvent>()
            .add_event::<PauseGameEvent>()
            .add_systems(FixedUpdate, handle_flow_commands.in_set(TickSet::Clock));
    }
}
