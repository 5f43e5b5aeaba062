// ---------------------------------------------------------------------------
// Error types for the simulation core
// ---------------------------------------------------------------------------

use std::fmt;

use crate::levels::LevelId;

/// Caller bugs detected at construction time. These are the only errors the
/// simulation core hands back to its caller; everything else is resolved by a
/// local fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A motion controller needs at least one track segment.
    EmptyNetwork,
    /// A level must define at least one objective.
    NoObjectives { level: LevelId },
    /// A level id was referenced that is not in the level book.
    UnknownLevel(LevelId),
    /// The level book itself is empty.
    NoLevels,
    /// Two level definitions share an id.
    DuplicateLevel(LevelId),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::EmptyNetwork => {
                write!(f, "Track network has no segments; the train cannot move")
            }
            ConfigurationError::NoObjectives { level } => {
                write!(f, "Level {} defines no objectives", level.0)
            }
            ConfigurationError::UnknownLevel(level) => write!(f, "Unknown level {}", level.0),
            ConfigurationError::NoLevels => write!(f, "No levels defined"),
            ConfigurationError::DuplicateLevel(level) => {
                write!(f, "Level {} is defined more than once", level.0)
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Recoverable lookup failures inside the track network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    /// The candidate set was empty.
    NotFound,
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::NotFound => write!(f, "No matching track segment"),
        }
    }
}

impl std::error::Error for TrackError {}
