use std::sync::Arc;

use bevy::prelude::*;
use simulation::levels::LevelCompletedEvent;
use simulation::notifications::{NotificationEvent, NotificationPriority};
use simulation::simulation_sets::TickSet;

use crate::codec::{decode_progress, encode_progress};
use crate::progress_file::{collect_progress, restore_progress};
use crate::save_error::SaveError;
use crate::store::{FileStore, ProgressStore, ProgressStoreHandle};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone, Copy)]
pub struct SaveProgressEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct LoadProgressEvent;

/// Work queued for the exclusive save/load systems this tick.
#[derive(Resource, Debug, Default)]
pub(crate) struct PendingProgressIo {
    save: bool,
    load: bool,
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// Persists level progress, saved routes and every registered `Saveable`.
///
/// Requests are collected after the `Report` phase and served by exclusive
/// systems at the end of the same tick. Completing a level saves
/// automatically.
#[derive(Default)]
pub struct SavePlugin {
    store: Option<Arc<dyn ProgressStore>>,
}

impl SavePlugin {
    pub fn with_store(store: impl ProgressStore) -> Self {
        Self {
            store: Some(Arc::new(store)),
        }
    }
}

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        let store = self
            .store
            .clone()
            .unwrap_or_else(|| Arc::new(FileStore::default_location()));
        app.insert_resource(ProgressStoreHandle(store))
            .init_resource::<simulation::SaveableRegistry>()
            .init_resource::<PendingProgressIo>()
            .add_event::<SaveProgressEvent>()
            .add_event::<LoadProgressEvent>()
            .add_systems(
                FixedUpdate,
                (
                    detect_progress_requests,
                    exclusive_save.run_if(save_requested),
                    exclusive_load.run_if(load_requested),
                )
                    .chain()
                    .after(TickSet::Report),
            );
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

fn detect_progress_requests(
    mut saves: EventReader<SaveProgressEvent>,
    mut loads: EventReader<LoadProgressEvent>,
    mut completed: EventReader<LevelCompletedEvent>,
    mut pending: ResMut<PendingProgressIo>,
) {
    let autosave = completed.read().count() > 0;
    if saves.read().count() > 0 || autosave {
        pending.save = true;
    }
    if loads.read().count() > 0 {
        pending.load = true;
    }
}

fn save_requested(pending: Res<PendingProgressIo>) -> bool {
    pending.save
}

fn load_requested(pending: Res<PendingProgressIo>) -> bool {
    pending.load
}

fn notify(world: &mut World, text: String, priority: NotificationPriority) {
    world.send_event(NotificationEvent::new(text, priority));
}

pub(crate) fn save_world(world: &World) -> Result<usize, SaveError> {
    let store = world
        .get_resource::<ProgressStoreHandle>()
        .ok_or(SaveError::NoData)?
        .0
        .clone();
    let bytes = encode_progress(&collect_progress(world));
    store.write(&bytes)?;
    Ok(bytes.len())
}

pub(crate) fn load_world(world: &mut World) -> Result<(), SaveError> {
    let store = world
        .get_resource::<ProgressStoreHandle>()
        .ok_or(SaveError::NoData)?
        .0
        .clone();
    let file = decode_progress(&store.read()?)?;
    restore_progress(world, &file);
    Ok(())
}

/// Encode and write the world's progress. Runs with full world access.
pub(crate) fn exclusive_save(world: &mut World) {
    world.resource_mut::<PendingProgressIo>().save = false;
    match save_world(world) {
        Ok(size) => {
            info!("Progress saved ({} bytes)", size);
            notify(world, "Progress saved".into(), NotificationPriority::Info);
        }
        Err(e) => {
            error!("Save failed: {e}");
            notify(world, format!("Save failed: {e}"), NotificationPriority::Warning);
        }
    }
}

/// Read, validate and apply stored progress. A failed load leaves the world
/// untouched.
pub(crate) fn exclusive_load(world: &mut World) {
    world.resource_mut::<PendingProgressIo>().load = false;
    match load_world(world) {
        Ok(()) => notify(world, "Progress loaded".into(), NotificationPriority::Info),
        Err(e) => {
            warn!("Load failed: {e}");
            notify(world, format!("Load failed: {e}"), NotificationPriority::Warning);
        }
    }
}
