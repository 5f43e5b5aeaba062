//! Objective evaluation and unlock rules.

use std::collections::BTreeSet;

use crate::errors::ConfigurationError;

use super::types::*;

/// Recompute every objective's `current` from `metrics`.
///
/// Pure: the input level is not modified. A level whose objectives are all
/// met comes back with `completed = true`. An already completed level is
/// returned unchanged, so repeated calls are idempotent.
pub fn evaluate_objectives(level: &GameLevel, metrics: &LiveMetrics) -> GameLevel {
    let mut updated = level.clone();
    if updated.completed {
        return updated;
    }
    for objective in &mut updated.objectives {
        objective.current = metrics.value_for(objective.kind);
    }
    updated.completed =
        !updated.objectives.is_empty() && updated.objectives.iter().all(LevelObjective::is_met);
    updated
}

/// Whether the level's time limit has run out.
pub fn time_limit_exceeded(level: &GameLevel, metrics: &LiveMetrics) -> bool {
    level
        .time_limit_s
        .is_some_and(|limit| metrics.elapsed_s > limit as f64)
}

impl GameLevel {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.objectives.is_empty() {
            return Err(ConfigurationError::NoObjectives { level: self.id });
        }
        Ok(())
    }
}

/// Per-level checks plus id uniqueness.
pub fn validate_levels(levels: &[GameLevel]) -> Result<(), ConfigurationError> {
    let mut seen = BTreeSet::new();
    for level in levels {
        level.validate()?;
        if !seen.insert(level.id) {
            return Err(ConfigurationError::DuplicateLevel(level.id));
        }
    }
    Ok(())
}

impl LevelBook {
    /// Validate, sort by id and unlock the first level.
    pub fn new(mut levels: Vec<GameLevel>) -> Result<Self, ConfigurationError> {
        if levels.is_empty() {
            return Err(ConfigurationError::NoLevels);
        }
        validate_levels(&levels)?;
        levels.sort_by_key(|l| l.id);
        levels[0].unlocked = true;
        let active = levels[0].id;
        Ok(Self { levels, active })
    }

    pub fn levels(&self) -> &[GameLevel] {
        &self.levels
    }

    pub fn level(&self, id: LevelId) -> Option<&GameLevel> {
        self.levels.iter().find(|l| l.id == id)
    }

    pub fn active_id(&self) -> LevelId {
        self.active
    }

    /// The level being played. `None` only if the book was built by hand
    /// with an id that is not in it.
    pub fn active(&self) -> Option<&GameLevel> {
        self.level(self.active)
    }

    /// 0-based position of the active level in the sequence.
    pub fn active_index(&self) -> usize {
        self.levels
            .iter()
            .position(|l| l.id == self.active)
            .unwrap_or(0)
    }

    /// Level following `id` in ascending id order.
    pub fn next_after(&self, id: LevelId) -> Option<LevelId> {
        self.levels.iter().map(|l| l.id).find(|next| *next > id)
    }

    /// Switch the active level; refused for unknown or locked levels.
    pub fn select(&mut self, id: LevelId) -> Result<&GameLevel, LevelSelectError> {
        let Some(index) = self.levels.iter().position(|l| l.id == id) else {
            return Err(LevelSelectError::Unknown(id));
        };
        if !self.levels[index].unlocked {
            return Err(LevelSelectError::Locked(id));
        }
        self.active = id;
        Ok(&self.levels[index])
    }

    /// Feed live metrics into level `id`, store the result and unlock the
    /// next level if it just completed.
    pub fn apply_metrics(
        &mut self,
        id: LevelId,
        metrics: &LiveMetrics,
    ) -> Result<LevelEvaluation, ConfigurationError> {
        let index = self
            .levels
            .iter()
            .position(|l| l.id == id)
            .ok_or(ConfigurationError::UnknownLevel(id))?;

        if self.levels[index].completed {
            return Ok(LevelEvaluation::AlreadyCompleted);
        }

        let updated = evaluate_objectives(&self.levels[index], metrics);
        let completed = updated.completed;
        let failed = !completed && time_limit_exceeded(&updated, metrics);
        self.levels[index] = updated;

        if failed {
            return Ok(LevelEvaluation::Failed);
        }
        if !completed {
            return Ok(LevelEvaluation::InProgress);
        }

        let unlocked = self.next_after(id);
        if let Some(next) = unlocked {
            if let Some(level) = self.levels.iter_mut().find(|l| l.id == next) {
                level.unlocked = true;
            }
        }
        Ok(LevelEvaluation::Completed { unlocked })
    }

    /// Copy persisted progress (objective `current`, `unlocked`,
    /// `completed`) onto the matching levels. Definitions stay as loaded.
    pub fn merge_progress(&mut self, saved: &[GameLevel]) {
        for stored in saved {
            let Some(level) = self.levels.iter_mut().find(|l| l.id == stored.id) else {
                continue;
            };
            level.unlocked |= stored.unlocked;
            level.completed = stored.completed;
            for objective in &mut level.objectives {
                if let Some(saved_obj) = stored.objectives.iter().find(|o| o.kind == objective.kind)
                {
                    objective.current = saved_obj.current;
                }
            }
        }
        if let Some(first) = self.levels.first_mut() {
            first.unlocked = true;
        }
    }
}

/// Why a level switch was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSelectError {
    Unknown(LevelId),
    Locked(LevelId),
}

impl std::fmt::Display for LevelSelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelSelectError::Unknown(id) => write!(f, "Level {} does not exist", id.0),
            LevelSelectError::Locked(id) => write!(f, "Level {} is still locked", id.0),
        }
    }
}

impl std::error::Error for LevelSelectError {}
