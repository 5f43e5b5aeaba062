//! Train-movement and passenger-matching simulation core for a metro game.
//!
//! A single train runs over a track network of polyline segments; passengers
//! appear at stations, ride to their destinations and pay out rewards; levels
//! set objectives that unlock the next level. Everything runs inside a bevy
//! `App` on a fixed 10 Hz heartbeat (see [`simulation_sets::TickSet`]).
//! Rendering, map widgets, geocoding services and storage are collaborators
//! at the edges: [`map_frame`], [`geocoding`] and the `save` crate.

use std::collections::BTreeMap;
use std::time::Duration;

use bevy::prelude::*;

pub mod config;
pub mod errors;
pub mod game_flow;
pub mod game_params;
pub mod geocoding;
pub mod geometry;
pub mod levels;
pub mod map_frame;
pub mod notifications;
pub mod passengers;
pub mod path_finder;
pub mod player_stats;
pub mod routes;
pub mod session;
pub mod sim_clock;
pub mod sim_rng;
pub mod simulation_sets;
pub mod track_network;
pub mod train_motion;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

// ---------------------------------------------------------------------------
// Saveable resources
// ---------------------------------------------------------------------------

/// A resource persisted through the progress file's extension map.
///
/// Implementors own their byte format; the save crate only moves opaque
/// bytes keyed by `SAVE_KEY`.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Stable key in the extension map.
    const SAVE_KEY: &'static str;

    /// `None` skips the entry (e.g. nothing worth persisting).
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// `bitcode::decode`, falling back to `Default` with a warning.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    match bitcode::decode(bytes) {
        Ok(v) => v,
        Err(e) => {
            warn!(
                "Saveable {}: failed to decode {} bytes, falling back to default: {}",
                key,
                bytes.len(),
                e
            );
            T::default()
        }
    }
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;

/// Type-erased operations for one registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
}

/// Every `Saveable` resource, filled in by plugins at build time.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Register `T` under its `SAVE_KEY`. A second registration of the same
    /// key is ignored (and asserts in debug builds).
    pub fn register<T: Saveable>(&mut self) {
        let key = T::SAVE_KEY.to_string();
        if self.entries.iter().any(|e| e.key == key) {
            warn!(
                "SaveableRegistry: duplicate key '{}', ignoring second registration",
                key
            );
            debug_assert!(false, "SaveableRegistry: duplicate key '{}'", key);
            return;
        }
        self.entries.push(SaveableEntry {
            key,
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                let value = T::load_from_bytes(bytes);
                world.insert_resource(value);
            }),
        });
    }

    /// Collect the bytes of every registered resource present in `world`.
    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        let mut extensions = BTreeMap::new();
        for entry in &self.entries {
            if let Some(bytes) = (entry.save_fn)(world) {
                extensions.insert(entry.key.clone(), bytes);
            }
        }
        extensions
    }

    /// Restore registered resources. Keys missing from `extensions` leave
    /// the current resource untouched.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Everything the heartbeat needs. The host adds `MinimalPlugins` (or
/// `DefaultPlugins`) alongside it.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_duration(Duration::from_millis(
            config::TICK_MS,
        )));
        simulation_sets::configure_tick_sets(app);

        app.init_resource::<SaveableRegistry>()
            .init_resource::<track_network::TrackNetwork>()
            .init_resource::<player_stats::PlayerStats>();

        // Heartbeat and shared state
        app.add_plugins((
            sim_clock::SimClockPlugin,
            game_flow::GameFlowPlugin,
            sim_rng::SimRngPlugin,
            game_params::GameParamsPlugin,
            notifications::NotificationsPlugin,
        ));

        // Gameplay
        app.add_plugins((
            levels::LevelsPlugin,
            passengers::PassengersPlugin,
            train_motion::TrainMotionPlugin,
            routes::RoutesPlugin,
        ));

        // Collaborator edges
        app.add_plugins((geocoding::GeocodingPlugin, map_frame::MapFramePlugin));
    }
}

#[cfg(test)]
mod saveable_tests {
    use super::*;

    #[derive(Resource, Default, Debug, PartialEq)]
    struct LapCounter {
        laps: u32,
    }

    impl Saveable for LapCounter {
        const SAVE_KEY: &'static str = "lap_counter";

        fn save_to_bytes(&self) -> Option<Vec<u8>> {
            (self.laps != 0).then(|| self.laps.to_le_bytes().to_vec())
        }

        fn load_from_bytes(bytes: &[u8]) -> Self {
            let laps = u32::from_le_bytes(bytes.try_into().unwrap_or([0; 4]));
            LapCounter { laps }
        }
    }

    #[test]
    fn test_registry_register_and_save() {
        let mut world = World::new();
        world.insert_resource(LapCounter { laps: 42 });

        let mut registry = SaveableRegistry::default();
        registry.register::<LapCounter>();

        let extensions = registry.save_all(&world);
        assert_eq!(extensions.len(), 1);
        assert!(extensions.contains_key("lap_counter"));
        assert_eq!(extensions["lap_counter"], 42u32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_registry_save_skips_default() {
        let mut world = World::new();
        world.insert_resource(LapCounter { laps: 0 });

        let mut registry = SaveableRegistry::default();
        registry.register::<LapCounter>();

        let extensions = registry.save_all(&world);
        assert!(extensions.is_empty(), "default state should be skipped");
    }

    #[test]
    fn test_registry_load_all() {
        let mut world = World::new();
        world.insert_resource(LapCounter::default());

        let mut registry = SaveableRegistry::default();
        registry.register::<LapCounter>();

        let mut extensions = BTreeMap::new();
        extensions.insert("lap_counter".to_string(), 99u32.to_le_bytes().to_vec());

        registry.load_all(&mut world, &extensions);

        let counter = world.resource::<LapCounter>();
        assert_eq!(counter.laps, 99);
    }

    #[test]
    fn test_registry_load_ignores_unknown_keys() {
        let mut world = World::new();
        world.insert_resource(LapCounter { laps: 5 });

        let mut registry = SaveableRegistry::default();
        registry.register::<LapCounter>();

        let mut extensions = BTreeMap::new();
        extensions.insert("unknown_feature".to_string(), vec![0xFF, 0xFF]);

        registry.load_all(&mut world, &extensions);

        let counter = world.resource::<LapCounter>();
        assert_eq!(counter.laps, 5);
    }

    #[test]
    #[should_panic(expected = "duplicate key")]
    fn test_registry_duplicate_key_panics_in_debug() {
        let mut registry = SaveableRegistry::default();
        registry.register::<LapCounter>();
        registry.register::<LapCounter>();
    }
}
