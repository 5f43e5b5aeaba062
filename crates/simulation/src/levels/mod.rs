//! Level sequence, objectives and unlock rules.
//!
//! Levels parameterise the passenger lifecycle (generation interval, waiting
//! cap) and the train (capacity). Completing every objective of a level
//! unlocks the next one by ascending id.

mod definitions;
mod rules;
mod systems;
mod types;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

use crate::simulation_sets::TickSet;

pub use definitions::{default_levels, load_levels_json, LevelLoadError};
pub use rules::{evaluate_objectives, time_limit_exceeded, validate_levels, LevelSelectError};
pub use systems::{evaluate_level_progress, handle_level_select, live_metrics};
pub use types::*;

pub struct LevelsPlugin;

impl Plugin for LevelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelBook>()
            .add_event::<SelectLevelEvent>()
            .add_event::<LevelCompletedEvent>()
            .add_systems(
                FixedUpdate,
                handle_level_select
                    .in_set(TickSet::Clock)
                    .after(crate::game_flow::handle_flow_commands)
                    .before(crate::sim_clock::advance_clock),
            )
            .add_systems(
                FixedUpdate,
                evaluate_level_progress.in_set(TickSet::Progress),
            );
    }
}
