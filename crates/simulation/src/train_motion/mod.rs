//! Single-train motion along the track network.
//!
//! The controller advances a path index one point per step and resolves
//! segment boundaries: transfer onto a connected segment, reverse in place
//! at a dead end, or (cruise and exploration fallbacks) jump to another
//! segment rather than freeze.
//!
//! ```text
//!            advance ok
//!          ┌──────────┐
//!          ▼          │
//!       [moving] ─────┘
//!          │ boundary
//!          ▼
//!   connection? ──yes──▶ transfer (goal-directed: maybe jump to a
//!          │                        better unvisited segment)
//!          no
//!          ▼
//!   cruise & already bounced here? ──yes──▶ jump to closest segment
//!          │
//!          no ──▶ reverse in place
//! ```
//!
//! Goal-directed mode plans a segment route with the path finder toward the
//! oldest rider's destination or the nearest waiting passenger, parks at the
//! goal station, and explores when there is nothing to do.

mod controller;
mod routing;
mod systems;
mod types;


use bevy::prelude::*;

use crate::simulation_sets::TickSet;

pub use controller::seat_train;
pub use routing::{best_explore_target, pick_goal, segment_score, MotionContext};
pub use systems::{handle_drive_mode, handle_track_selection, move_train};
pub use types::*;

pub struct TrainMotionPlugin;

impl Plugin for TrainMotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TrainState>()
            .init_resource::<MotionController>()
            .add_event::<StepTrainEvent>()
            .add_event::<SetDriveModeEvent>()
            .add_event::<SelectSegmentEvent>()
            .add_event::<SelectPointEvent>()
            .add_systems(
                FixedUpdate,
                (handle_drive_mode, handle_track_selection)
                    .in_set(TickSet::Clock)
                    .after(crate::sim_clock::advance_clock),
            )
            .add_systems(FixedUpdate, move_train.in_set(TickSet::Move));
    }
}
