//! The single simulation time source.
//!
//! Every timestamp in the core (passenger creation, pickup, level elapsed
//! time) is an `elapsed_ms` value of [`SimClock`]. Wall-clock time is never
//! read.

use bevy::prelude::*;

use crate::config::TICK_MS;
use crate::game_flow::GameFlow;
use crate::simulation_sets::TickSet;

/// Tick counter plus simulated milliseconds.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SimClock {
    pub tick: u64,
    pub elapsed_ms: u64,
    pub paused: bool,
}

impl SimClock {
    /// Whether the heartbeat should do any work this tick.
    pub fn running(&self, flow: &GameFlow) -> bool {
        flow.started && !self.paused
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.elapsed_ms = self.elapsed_ms.saturating_add(TICK_MS);
    }

    /// Whole seconds since `since_ms`, as a float.
    pub fn seconds_since(&self, since_ms: u64) -> f64 {
        self.elapsed_ms.saturating_sub(since_ms) as f64 / 1000.0
    }
}

pub fn advance_clock(mut clock: ResMut<SimClock>, flow: Res<GameFlow>) {
    if clock.running(&flow) {
        clock.advance();
    }
}

pub struct SimClockPlugin;

impl Plugin for SimClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>().add_systems(
            FixedUpdate,
            advance_clock
                .in_set(TickSet::Clock)
                .after(crate::game_flow::handle_flow_commands),
        );
    }
}
