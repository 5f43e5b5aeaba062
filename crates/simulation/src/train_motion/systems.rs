use bevy::prelude::*;

use crate::game_flow::GameFlow;
use crate::game_params::GameParams;
use crate::notifications::{NotificationEvent, NotificationPriority};
use crate::passengers::PassengerLedger;
use crate::sim_clock::SimClock;
use crate::track_network::TrackNetwork;

use super::routing::MotionContext;
use super::types::*;

pub fn handle_drive_mode(
    mut requests: EventReader<SetDriveModeEvent>,
    mut controller: ResMut<MotionController>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for SetDriveModeEvent(mode) in requests.read() {
        if controller.set_mode(*mode) {
            info!("Drive mode: {}", mode.label());
            notifications.send(NotificationEvent::new(
                format!("Drive mode: {}", mode.label()),
                NotificationPriority::Info,
            ));
        }
    }
}

/// Map clicks: enter the chosen segment, or the track nearest the point.
pub fn handle_track_selection(
    mut by_segment: EventReader<SelectSegmentEvent>,
    mut by_point: EventReader<SelectPointEvent>,
    network: Res<TrackNetwork>,
    params: Res<GameParams>,
    mut train: ResMut<TrainState>,
    mut controller: ResMut<MotionController>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for SelectSegmentEvent(id) in by_segment.read() {
        match controller.place(&mut train, &network, *id, 0) {
            Ok(()) => debug!("Train placed on segment {}", id.0),
            Err(e) => {
                warn!("Cannot place train on segment {}: {}", id.0, e);
                notifications.send(NotificationEvent::new(
                    format!("Unknown track segment {}", id.0),
                    NotificationPriority::Info,
                ));
            }
        }
    }
    for SelectPointEvent(point) in by_point.read() {
        match controller.select_point(&mut train, &network, *point, params.motion.select_radius_m) {
            Ok(id) => debug!("Train moved to segment {}", id.0),
            Err(_) => {
                notifications.send(NotificationEvent::new(
                    "No nearby track found",
                    NotificationPriority::Attention,
                ));
            }
        }
    }
}

/// Manual mode steps once per request; the automatic modes step every
/// `move_every_ticks` ticks.
#[allow(clippy::too_many_arguments)]
pub fn move_train(
    mut steps: EventReader<StepTrainEvent>,
    flow: Res<GameFlow>,
    clock: Res<SimClock>,
    network: Res<TrackNetwork>,
    params: Res<GameParams>,
    ledger: Res<PassengerLedger>,
    mut train: ResMut<TrainState>,
    mut controller: ResMut<MotionController>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    let requested = steps.read().count();
    if !clock.running(&flow) || network.is_empty() {
        return;
    }

    let count = match controller.mode {
        DriveMode::Manual => requested,
        DriveMode::Cruise | DriveMode::GoalDirected => {
            let every = params.motion.move_every_ticks.max(1);
            usize::from(clock.tick % every == 0)
        }
    };

    let ctx = MotionContext {
        network: &network,
        waiting: ledger.waiting(),
        weights: &params.explore,
    };
    for _ in 0..count {
        let outcome = controller.step(&mut train, &ctx);
        match outcome {
            StepOutcome::ExplorationComplete => {
                notifications.send(NotificationEvent::new(
                    "Every track explored; starting a new sweep",
                    NotificationPriority::Info,
                ));
            }
            StepOutcome::Jumped { to } => {
                debug!("Train jumped to segment {}", to.0);
            }
            _ => {}
        }
    }
}
