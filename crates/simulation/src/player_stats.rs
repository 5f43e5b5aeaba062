use bevy::prelude::*;

use crate::config::{HAPPINESS_MAX, HAPPINESS_START};

/// Running score of the current level.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub money: i64,
    pub points: i64,
    /// 0..=100.
    pub happiness: f32,
    pub delivered: u32,
    pub expired: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            money: 0,
            points: 0,
            happiness: HAPPINESS_START,
            delivered: 0,
            expired: 0,
        }
    }
}

impl PlayerStats {
    pub fn adjust_happiness(&mut self, delta: f32) {
        self.happiness = (self.happiness + delta).clamp(0.0, HAPPINESS_MAX);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
