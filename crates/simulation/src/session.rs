//! Narrow command/query facade over the simulation `App`.
//!
//! Commands are queued as events and take effect on the next tick; queries
//! read the resources directly. Dropping the session drops the `App`, every
//! timer with it, and any geocoding lookup still in flight.

use std::sync::Arc;

use bevy::ecs::event::event_update_system;
use bevy::prelude::*;

use crate::config::DEFAULT_LOCATION;
use crate::errors::ConfigurationError;
use crate::game_flow::{PauseGameEvent, StartGameEvent};
use crate::game_params::GameParams;
use crate::geocoding::{Geocoder, GeocoderHandle, RelocateEvent};
use crate::geometry::Coordinate;
use crate::levels::{GameLevel, LevelBook, LevelId, SelectLevelEvent};
use crate::map_frame::MapFrame;
use crate::notifications::NotificationLog;
use crate::passengers::PassengerLedger;
use crate::player_stats::PlayerStats;
use crate::routes::{RouteBook, SaveRouteEvent};
use crate::sim_clock::SimClock;
use crate::sim_rng::SimRng;
use crate::track_network::{generate_network, SegmentId, TrackNetwork};
use crate::train_motion::{
    seat_train, DriveMode, MotionController, SelectPointEvent, SelectSegmentEvent,
    SetDriveModeEvent, StepTrainEvent, TrainState,
};
use crate::SimulationPlugin;

/// How to build a session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Map centre for network generation.
    pub center: Coordinate,
    pub seed: u64,
    /// `None` uses the built-in level set.
    pub levels: Option<Vec<GameLevel>>,
    pub params: GameParams,
    /// A prepared network; `None` generates one around `center`.
    pub network: Option<TrackNetwork>,
    pub geocoder: Option<Arc<dyn Geocoder>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            center: DEFAULT_LOCATION,
            seed: 1,
            levels: None,
            params: GameParams::default(),
            network: None,
            geocoder: None,
        }
    }
}

pub struct GameSession {
    app: App,
}

impl GameSession {
    /// Build the world. Fails on an empty network or invalid levels.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigurationError> {
        Self::with_plugins(config, |_| {})
    }

    /// Like [`GameSession::new`], letting the host add its own plugins
    /// (persistence, presentation) before the app is finalised.
    pub fn with_plugins(
        config: SessionConfig,
        extend: impl FnOnce(&mut App),
    ) -> Result<Self, ConfigurationError> {
        let book = match config.levels {
            Some(levels) => LevelBook::new(levels)?,
            None => LevelBook::default(),
        };
        let mut rng = SimRng::from_seed_u64(config.seed);
        let network = match config.network {
            Some(network) => network,
            None => {
                let mut network =
                    generate_network(config.center, &config.params.network, &mut rng.0);
                network.revision = 1;
                network
            }
        };
        let controller = MotionController::new(&network)?;
        let mut train = TrainState::default();
        if let Some(level) = book.active() {
            train.capacity = level.train_capacity;
        }
        seat_train(&mut train, &network)?;
        info!(
            "Session ready: {} segments, {} stations, {} levels",
            network.segments.len(),
            network.stations.len(),
            book.levels().len()
        );

        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin);
        app.insert_resource(rng)
            .insert_resource(config.params)
            .insert_resource(book)
            .insert_resource(network)
            .insert_resource(train)
            .insert_resource(controller);
        if let Some(geocoder) = config.geocoder {
            app.insert_resource(GeocoderHandle(geocoder));
        }
        extend(&mut app);
        app.finish();
        app.cleanup();
        Ok(Self { app })
    }

    // -------------------------------------------------------------------------
    // Heartbeat
    // -------------------------------------------------------------------------

    /// Run `n` heartbeat ticks.
    ///
    /// Event buffers are rotated after every tick. Every reader runs once per
    /// tick, so an event survives exactly until its readers have seen it.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            let world = self.app.world_mut();
            world.run_schedule(FixedUpdate);
            if let Err(e) = world.run_system_cached(event_update_system) {
                warn!("Event buffer rotation failed: {e}");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    fn send<E: Event>(&mut self, event: E) {
        self.app.world_mut().send_event(event);
    }

    pub fn start(&mut self) {
        self.send(StartGameEvent);
    }

    pub fn pause(&mut self, paused: bool) {
        self.send(PauseGameEvent(paused));
    }

    pub fn select_segment(&mut self, id: SegmentId) {
        self.send(SelectSegmentEvent(id));
    }

    pub fn select_point(&mut self, point: Coordinate) {
        self.send(SelectPointEvent(point));
    }

    pub fn set_drive_mode(&mut self, mode: DriveMode) {
        self.send(SetDriveModeEvent(mode));
    }

    pub fn step_train(&mut self) {
        self.send(StepTrainEvent);
    }

    pub fn select_level(&mut self, id: LevelId) {
        self.send(SelectLevelEvent(id));
    }

    pub fn relocate(&mut self, address: impl Into<String>) {
        self.send(RelocateEvent {
            address: address.into(),
        });
    }

    pub fn save_route(&mut self, name: impl Into<String>) {
        self.send(SaveRouteEvent { name: name.into() });
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn frame(&self) -> &MapFrame {
        self.app.world().resource::<MapFrame>()
    }

    pub fn stats(&self) -> &PlayerStats {
        self.app.world().resource::<PlayerStats>()
    }

    pub fn train(&self) -> &TrainState {
        self.app.world().resource::<TrainState>()
    }

    pub fn levels(&self) -> &LevelBook {
        self.app.world().resource::<LevelBook>()
    }

    pub fn notifications(&self) -> &NotificationLog {
        self.app.world().resource::<NotificationLog>()
    }

    pub fn clock(&self) -> &SimClock {
        self.app.world().resource::<SimClock>()
    }

    pub fn network(&self) -> &TrackNetwork {
        self.app.world().resource::<TrackNetwork>()
    }

    pub fn controller(&self) -> &MotionController {
        self.app.world().resource::<MotionController>()
    }

    pub fn passengers(&self) -> &PassengerLedger {
        self.app.world().resource::<PassengerLedger>()
    }

    pub fn routes(&self) -> &RouteBook {
        self.app.world().resource::<RouteBook>()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// The underlying app, for hosts that drive extra schedules.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
