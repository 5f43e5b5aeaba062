//! Built-in level set and JSON loading.

use std::fmt;

use crate::errors::ConfigurationError;

use super::rules::validate_levels;
use super::types::*;

fn level(
    id: u32,
    name: &str,
    objectives: Vec<LevelObjective>,
    interval_ms: u64,
    max_active: u32,
    capacity: u32,
    time_limit_s: Option<u64>,
) -> GameLevel {
    GameLevel {
        id: LevelId(id),
        name: name.to_string(),
        objectives,
        passenger_frequency_interval_ms: interval_ms,
        max_active_passengers: max_active,
        train_capacity: capacity,
        unlocked: id == 1,
        completed: false,
        time_limit_s,
    }
}

/// The five levels shipped with the game, easiest first.
pub fn default_levels() -> Vec<GameLevel> {
    use ObjectiveKind::*;
    vec![
        level(
            1,
            "First Shift",
            vec![LevelObjective::new(Passengers, 3.0)],
            10_000,
            4,
            4,
            None,
        ),
        level(
            2,
            "Rush Hour",
            vec![
                LevelObjective::new(Money, 500.0),
                LevelObjective::new(Happiness, 55.0),
            ],
            8_000,
            6,
            4,
            None,
        ),
        level(
            3,
            "Crowded Platforms",
            vec![
                LevelObjective::new(Passengers, 12.0),
                LevelObjective::new(Happiness, 60.0),
            ],
            6_000,
            8,
            6,
            Some(600),
        ),
        level(
            4,
            "Night Service",
            vec![
                LevelObjective::new(Money, 2_000.0),
                LevelObjective::new(Time, 300.0),
            ],
            5_000,
            10,
            6,
            Some(900),
        ),
        level(
            5,
            "Metro Master",
            vec![
                LevelObjective::new(Money, 5_000.0),
                LevelObjective::new(Passengers, 40.0),
                LevelObjective::new(Happiness, 70.0),
            ],
            4_000,
            12,
            8,
            Some(1_200),
        ),
    ]
}

impl Default for LevelBook {
    fn default() -> Self {
        let levels = default_levels();
        let active = levels.first().map(|l| l.id).unwrap_or(LevelId(1));
        Self { levels, active }
    }
}

#[derive(Debug)]
pub enum LevelLoadError {
    Json(serde_json::Error),
    Invalid(ConfigurationError),
}

impl fmt::Display for LevelLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelLoadError::Json(e) => write!(f, "Malformed level data: {e}"),
            LevelLoadError::Invalid(e) => write!(f, "Invalid level data: {e}"),
        }
    }
}

impl std::error::Error for LevelLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelLoadError::Json(e) => Some(e),
            LevelLoadError::Invalid(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for LevelLoadError {
    fn from(e: serde_json::Error) -> Self {
        LevelLoadError::Json(e)
    }
}

impl From<ConfigurationError> for LevelLoadError {
    fn from(e: ConfigurationError) -> Self {
        LevelLoadError::Invalid(e)
    }
}

/// Parse a JSON array of levels and validate each one. Ids must be unique.
pub fn load_levels_json(json: &str) -> Result<Vec<GameLevel>, LevelLoadError> {
    let levels: Vec<GameLevel> = serde_json::from_str(json)?;
    validate_levels(&levels)?;
    Ok(levels)
}
