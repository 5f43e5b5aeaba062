// ---------------------------------------------------------------------------
// Progress stores: where encoded progress bytes live
// ---------------------------------------------------------------------------

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;

use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;

/// Default file name of [`FileStore::default_location`].
pub const PROGRESS_FILE_NAME: &str = "metro_progress.bin";

/// Byte storage for one progress slot.
pub trait ProgressStore: Send + Sync + 'static {
    /// The last written bytes, or `SaveError::NoData` if nothing was saved.
    fn read(&self) -> Result<Vec<u8>, SaveError>;

    fn write(&self, bytes: &[u8]) -> Result<(), SaveError>;
}

/// The store the save systems use.
#[derive(Resource, Clone)]
pub struct ProgressStoreHandle(pub Arc<dyn ProgressStore>);

/// A file on disk, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `metro_progress.bin` in the working directory.
    pub fn default_location() -> Self {
        Self::new(PROGRESS_FILE_NAME)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ProgressStore for FileStore {
    fn read(&self) -> Result<Vec<u8>, SaveError> {
        Ok(std::fs::read(&self.path)?)
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SaveError> {
        atomic_write(&self.path, bytes)?;
        Ok(())
    }
}

/// In-memory slot. Clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().map(|s| s.is_none()).unwrap_or(true)
    }

    /// Overwrite the stored bytes directly.
    pub fn put(&self, bytes: Vec<u8>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(bytes);
        }
    }
}

impl ProgressStore for MemoryStore {
    fn read(&self) -> Result<Vec<u8>, SaveError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| SaveError::Corrupted("memory store lock poisoned".into()))?;
        slot.clone().ok_or(SaveError::NoData)
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SaveError> {
        self.put(bytes.to_vec());
        Ok(())
    }
}
