use bevy::prelude::*;

use crate::game_flow::GameFlow;
use crate::notifications::{NotificationEvent, NotificationPriority};
use crate::passengers::PassengerLedger;
use crate::player_stats::PlayerStats;
use crate::sim_clock::SimClock;
use crate::train_motion::{MotionController, TrainState};

use super::rules::LevelSelectError;
use super::types::*;

/// Metrics of the level being played, measured from its start.
pub fn live_metrics(stats: &PlayerStats, clock: &SimClock, flow: &GameFlow) -> LiveMetrics {
    LiveMetrics {
        money: stats.money as f64,
        delivered_passengers: stats.delivered,
        happiness: stats.happiness,
        elapsed_s: clock.seconds_since(flow.level_started_ms),
    }
}

/// Switch levels: refuse locked ones, otherwise reset the per-level state.
#[allow(clippy::too_many_arguments)]
pub fn handle_level_select(
    mut requests: EventReader<SelectLevelEvent>,
    mut book: ResMut<LevelBook>,
    mut stats: ResMut<PlayerStats>,
    mut ledger: ResMut<PassengerLedger>,
    mut train: ResMut<TrainState>,
    mut controller: ResMut<MotionController>,
    mut flow: ResMut<GameFlow>,
    clock: Res<SimClock>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for SelectLevelEvent(id) in requests.read() {
        let level = match book.select(*id) {
            Ok(level) => level,
            Err(err @ LevelSelectError::Locked(_)) => {
                notifications.send(NotificationEvent::new(
                    err.to_string(),
                    NotificationPriority::Attention,
                ));
                continue;
            }
            Err(err @ LevelSelectError::Unknown(_)) => {
                warn!("Level select refused: {}", err);
                notifications.send(NotificationEvent::new(
                    err.to_string(),
                    NotificationPriority::Attention,
                ));
                continue;
            }
        };

        train.capacity = level.train_capacity;
        ledger.reset_for_level(&mut train.manifest, clock.elapsed_ms);
        controller.clear_route();
        stats.reset();
        flow.level_started_ms = clock.elapsed_ms;
        info!("Level {} selected ({})", level.id.0, level.name);
        notifications.send(NotificationEvent::new(
            format!("Level {}: {}", level.id.0, level.name),
            NotificationPriority::Info,
        ));
    }
}

/// Evaluate the active level's objectives against this tick's metrics.
pub fn evaluate_level_progress(
    mut book: ResMut<LevelBook>,
    stats: Res<PlayerStats>,
    clock: Res<SimClock>,
    mut flow: ResMut<GameFlow>,
    mut completed: EventWriter<LevelCompletedEvent>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    if !clock.running(&flow) {
        return;
    }
    let metrics = live_metrics(&stats, &clock, &flow);
    let active = book.active_id();
    let evaluation = match book.apply_metrics(active, &metrics) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            warn!("Level evaluation skipped: {}", e);
            return;
        }
    };

    match evaluation {
        LevelEvaluation::InProgress | LevelEvaluation::AlreadyCompleted => {}
        LevelEvaluation::Completed { unlocked } => {
            let text = match unlocked {
                Some(next) => format!("Level {} complete! Level {} unlocked", active.0, next.0),
                None => format!("Level {} complete! All levels finished", active.0),
            };
            info!("{}", text);
            notifications.send(NotificationEvent::new(text, NotificationPriority::Positive));
            completed.send(LevelCompletedEvent {
                level: active,
                unlocked,
            });
        }
        LevelEvaluation::Failed => {
            flow.started = false;
            warn!("Level {} failed: time limit exceeded", active.0);
            notifications.send(NotificationEvent::new(
                format!("Time is up! Level {} failed", active.0),
                NotificationPriority::Warning,
            ));
        }
    }
}
