//! Address lookup and network relocation.
//!
//! The geocoder itself is an external collaborator behind the [`Geocoder`]
//! trait. A `RelocateEvent` runs the lookup on the `AsyncComputeTaskPool`;
//! when it finishes the network is regenerated around the result and the
//! train re-seated. Lookup failures never reach the caller: they resolve to
//! `DEFAULT_LOCATION`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, AsyncComputeTaskPool, Task};

use crate::config::DEFAULT_LOCATION;
use crate::errors::ConfigurationError;
use crate::game_params::GameParams;
use crate::geometry::Coordinate;
use crate::notifications::{NotificationEvent, NotificationPriority};
use crate::passengers::PassengerLedger;
use crate::sim_clock::SimClock;
use crate::sim_rng::SimRng;
use crate::simulation_sets::TickSet;
use crate::track_network::{generate_network, TrackNetwork};
use crate::train_motion::{seat_train, MotionController, TrainState};

// =============================================================================
// Collaborator contract
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    EmptyAddress,
    NotFound(String),
    /// The backing service failed (network, quota, malformed reply).
    Service(String),
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::EmptyAddress => write!(f, "empty address"),
            GeocodeError::NotFound(address) => write!(f, "no match for '{}'", address),
            GeocodeError::Service(msg) => write!(f, "geocoding service error: {}", msg),
        }
    }
}

impl std::error::Error for GeocodeError {}

pub trait Geocoder: Send + Sync + 'static {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

/// The geocoder in use. Absent until the host registers one.
#[derive(Resource, Clone)]
pub struct GeocoderHandle(pub Arc<dyn Geocoder>);

/// Fixed lookup table, matched case-insensitively on trimmed input.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: BTreeMap<String, Coordinate>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, at: Coordinate) -> Self {
        self.entries.insert(normalize(address), at);
        self
    }
}

fn normalize(address: &str) -> String {
    address.trim().to_lowercase()
}

impl Geocoder for StaticGeocoder {
    fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let key = normalize(address);
        if key.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        self.entries
            .get(&key)
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(address.trim().to_string()))
    }
}

/// Map a lookup result to a map centre.
pub fn resolve_center(address: &str, result: Result<Coordinate, GeocodeError>) -> Coordinate {
    match result {
        Ok(at) => at,
        Err(e) => {
            warn!(
                "Geocoding '{}' failed ({}); using the default location",
                address, e
            );
            DEFAULT_LOCATION
        }
    }
}

// =============================================================================
// Relocation
// =============================================================================

/// Move the map to the place named by `address`.
#[derive(Event, Debug, Clone)]
pub struct RelocateEvent {
    pub address: String,
}

/// The lookup in flight, if any. A newer request replaces (and cancels) it.
#[derive(Resource, Default)]
pub struct PendingRelocation {
    lookup: Option<(String, Task<Result<Coordinate, GeocodeError>>)>,
}

impl PendingRelocation {
    pub fn in_flight(&self) -> bool {
        self.lookup.is_some()
    }
}

/// Regenerate the network around `center` and put the train back on it.
///
/// Waiting and riding passengers are cleared (their stations are gone), the
/// controller forgets its route and visited set, and `revision` is bumped.
#[allow(clippy::too_many_arguments)]
pub fn rebuild_network(
    center: Coordinate,
    params: &GameParams,
    rng: &mut SimRng,
    network: &mut TrackNetwork,
    train: &mut TrainState,
    controller: &mut MotionController,
    ledger: &mut PassengerLedger,
    now_ms: u64,
) -> Result<(), ConfigurationError> {
    let mut fresh = generate_network(center, &params.network, &mut rng.0);
    if fresh.is_empty() {
        return Err(ConfigurationError::EmptyNetwork);
    }
    fresh.revision = network.revision + 1;
    *network = fresh;

    ledger.reset_for_level(&mut train.manifest, now_ms);
    seat_train(train, network)?;
    controller.reset();
    info!(
        "Network regenerated around ({:.4}, {:.4}): {} segments, {} stations",
        center.lat,
        center.lng,
        network.segments.len(),
        network.stations.len()
    );
    Ok(())
}

pub fn start_relocation(
    mut requests: EventReader<RelocateEvent>,
    geocoder: Option<Res<GeocoderHandle>>,
    mut pending: ResMut<PendingRelocation>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for RelocateEvent { address } in requests.read() {
        let Some(geocoder) = geocoder.as_ref() else {
            notifications.send(NotificationEvent::new(
                "Address search is unavailable",
                NotificationPriority::Attention,
            ));
            continue;
        };
        let service = Arc::clone(&geocoder.0);
        let query = address.clone();
        let task = AsyncComputeTaskPool::get().spawn(async move { service.geocode(&query) });
        if pending.lookup.is_some() {
            debug!("Superseding in-flight lookup with '{}'", address);
        }
        pending.lookup = Some((address.clone(), task));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn poll_relocation(
    mut pending: ResMut<PendingRelocation>,
    params: Res<GameParams>,
    clock: Res<SimClock>,
    mut rng: ResMut<SimRng>,
    mut network: ResMut<TrackNetwork>,
    mut train: ResMut<TrainState>,
    mut controller: ResMut<MotionController>,
    mut ledger: ResMut<PassengerLedger>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    let Some((_, task)) = pending.lookup.as_mut() else {
        return;
    };
    let Some(result) = block_on(futures_lite::future::poll_once(task)) else {
        return;
    };
    let Some((address, _)) = pending.lookup.take() else {
        return;
    };

    let found = result.is_ok();
    let center = resolve_center(&address, result);
    match rebuild_network(
        center,
        &params,
        &mut rng,
        &mut network,
        &mut train,
        &mut controller,
        &mut ledger,
        clock.elapsed_ms,
    ) {
        Ok(()) => {
            let text = if found {
                format!("Moved to {}", address.trim())
            } else {
                format!("Could not find '{}'; showing the default city", address.trim())
            };
            notifications.send(NotificationEvent::new(text, NotificationPriority::Info));
        }
        Err(e) => {
            warn!("Relocation to '{}' abandoned: {}", address, e);
            notifications.send(NotificationEvent::new(
                "Could not build a network there",
                NotificationPriority::Warning,
            ));
        }
    }
}

pub struct GeocodingPlugin;

impl Plugin for GeocodingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingRelocation>()
            .add_event::<RelocateEvent>()
            .add_systems(
                FixedUpdate,
                (start_relocation, poll_relocation)
                    .chain()
                    .in_set(TickSet::Clock)
                    .after(crate::train_motion::handle_track_selection),
            );
    }
}
