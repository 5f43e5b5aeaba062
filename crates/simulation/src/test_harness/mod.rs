//! # TestSession: headless integration test harness
//!
//! Wraps a [`GameSession`] built on small hand-made networks so integration
//! tests can drive the heartbeat tick by tick and assert on the resulting
//! resources. Random passenger spawning is off by default; tests admit the
//! passengers they need.

mod assertions;
pub mod fixtures;
mod queries;

use std::ops::{Deref, DerefMut};

use crate::game_params::GameParams;
use crate::levels::GameLevel;
use crate::session::{GameSession, SessionConfig};
use crate::track_network::TrackNetwork;

use fixtures::{chain_network, with_stations};

pub struct TestSession {
    session: GameSession,
}

impl TestSession {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Three chained segments with a station in the middle of each
    /// (`S1`..`S3`), default levels, no random spawning.
    pub fn new() -> Self {
        Self::with_network(with_stations(
            chain_network(3),
            &[(0, 2, true), (1, 2, true), (2, 2, true)],
            None,
        ))
    }

    pub fn with_network(network: TrackNetwork) -> Self {
        Self::from_config(SessionConfig {
            network: Some(network),
            params: quiet_params(),
            ..Default::default()
        })
    }

    pub fn with_levels(network: TrackNetwork, levels: Vec<GameLevel>) -> Self {
        Self::from_config(SessionConfig {
            network: Some(network),
            levels: Some(levels),
            params: quiet_params(),
            ..Default::default()
        })
    }

    pub fn from_config(config: SessionConfig) -> Self {
        let session = GameSession::new(config).expect("test session config is valid");
        Self { session }
    }

    /// Start the game and run the tick that processes the start command.
    pub fn started(mut self) -> Self {
        self.session.start();
        self.session.tick(1);
        self
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Default parameters with random generation switched off.
pub fn quiet_params() -> GameParams {
    let mut params = GameParams::default();
    params.passengers.station_spawn_probability = 0.0;
    params
}

impl Deref for TestSession {
    type Target = GameSession;

    fn deref(&self) -> &GameSession {
        &self.session
    }
}

impl DerefMut for TestSession {
    fn deref_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }
}
