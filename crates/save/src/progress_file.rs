// ---------------------------------------------------------------------------
// ProgressFile: everything that survives between sessions
// ---------------------------------------------------------------------------

use std::collections::BTreeMap;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use simulation::levels::{GameLevel, LevelBook};
use simulation::routes::{RouteBook, SavedRoute};
use simulation::SaveableRegistry;

/// Current progress file schema version.
/// v1 = levels, routes, extension map
pub const CURRENT_PROGRESS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct ProgressFile {
    pub version: u32,
    /// Level definitions with objective progress and unlock flags.
    pub levels: Vec<GameLevel>,
    pub routes: Vec<SavedRoute>,
    /// Bytes of every registered `Saveable`, keyed by `SAVE_KEY`.
    pub extensions: BTreeMap<String, Vec<u8>>,
}

impl Default for ProgressFile {
    fn default() -> Self {
        Self {
            version: CURRENT_PROGRESS_VERSION,
            levels: Vec::new(),
            routes: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }
}

/// Snapshot the persistent parts of `world`.
pub fn collect_progress(world: &World) -> ProgressFile {
    let levels = world
        .get_resource::<LevelBook>()
        .map(|book| book.levels().to_vec())
        .unwrap_or_default();
    let routes = world
        .get_resource::<RouteBook>()
        .map(|book| book.routes().to_vec())
        .unwrap_or_default();
    let extensions = world
        .get_resource::<SaveableRegistry>()
        .map(|registry| registry.save_all(world))
        .unwrap_or_default();
    ProgressFile {
        version: CURRENT_PROGRESS_VERSION,
        levels,
        routes,
        extensions,
    }
}

/// Apply a loaded file: level progress merges by id, routes replace the
/// book, registered resources decode their own bytes.
pub fn restore_progress(world: &mut World, file: &ProgressFile) {
    if let Some(mut book) = world.get_resource_mut::<LevelBook>() {
        book.merge_progress(&file.levels);
    }
    world.insert_resource(RouteBook::from_routes(file.routes.clone()));
    if world.contains_resource::<SaveableRegistry>() {
        world.resource_scope(|world, registry: Mut<SaveableRegistry>| {
            registry.load_all(world, &file.extensions);
        });
    }
    info!(
        "Restored {} levels, {} routes, {} extensions",
        file.levels.len(),
        file.routes.len(),
        file.extensions.len()
    );
}
