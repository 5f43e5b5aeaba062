use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

// =============================================================================
// Objectives
// =============================================================================

/// Unique identifier for a level. Levels unlock in ascending id order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct LevelId(pub u32);

/// Which live metric an objective tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Money earned during the level.
    Money,
    /// Passengers delivered during the level.
    Passengers,
    /// Happiness (0-100) at evaluation time.
    Happiness,
    /// Seconds survived in the level.
    Time,
}

impl ObjectiveKind {
    pub fn label(self) -> &'static str {
        match self {
            ObjectiveKind::Money => "money",
            ObjectiveKind::Passengers => "passengers",
            ObjectiveKind::Happiness => "happiness",
            ObjectiveKind::Time => "time",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct LevelObjective {
    pub kind: ObjectiveKind,
    pub target: f64,
    #[serde(default)]
    pub current: f64,
}

impl LevelObjective {
    pub fn new(kind: ObjectiveKind, target: f64) -> Self {
        Self {
            kind,
            target,
            current: 0.0,
        }
    }

    pub fn is_met(&self) -> bool {
        self.current >= self.target
    }
}

// =============================================================================
// Levels
// =============================================================================

/// One entry of the level sequence, with its tuning and progress flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct GameLevel {
    pub id: LevelId,
    pub name: String,
    pub objectives: Vec<LevelObjective>,
    /// Milliseconds between passenger generation events.
    pub passenger_frequency_interval_ms: u64,
    /// Waiting passengers above which generation pauses.
    pub max_active_passengers: u32,
    pub train_capacity: u32,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub completed: bool,
    /// Optional limit in seconds; exceeding it before completion fails the level.
    #[serde(default)]
    pub time_limit_s: Option<u64>,
}

/// Snapshot of the metrics objectives are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveMetrics {
    pub money: f64,
    pub delivered_passengers: u32,
    pub happiness: f32,
    pub elapsed_s: f64,
}

impl LiveMetrics {
    pub fn value_for(&self, kind: ObjectiveKind) -> f64 {
        match kind {
            ObjectiveKind::Money => self.money,
            ObjectiveKind::Passengers => self.delivered_passengers as f64,
            ObjectiveKind::Happiness => self.happiness as f64,
            ObjectiveKind::Time => self.elapsed_s,
        }
    }
}

/// Outcome of feeding metrics into a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelEvaluation {
    InProgress,
    /// Completed by this evaluation; `unlocked` is the next level, if any.
    Completed { unlocked: Option<LevelId> },
    /// Was already completed before this evaluation; nothing changed.
    AlreadyCompleted,
    /// The time limit ran out before the objectives were met.
    Failed,
}

// =============================================================================
// Resource
// =============================================================================

/// The ordered level sequence plus the currently played level.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct LevelBook {
    pub(crate) levels: Vec<GameLevel>,
    pub(crate) active: LevelId,
}

/// Sent when the active level completes.
#[derive(Event, Debug, Clone, Copy)]
pub struct LevelCompletedEvent {
    pub level: LevelId,
    pub unlocked: Option<LevelId>,
}

/// Request to play a different level.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectLevelEvent(pub LevelId);
