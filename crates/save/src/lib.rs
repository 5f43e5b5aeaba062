//! Persistence for the metro simulation.
//!
//! A [`ProgressFile`] (level progress, saved routes, and the bytes of every
//! registered `Saveable` resource) is encoded with bitcode, lz4-compressed
//! when large, wrapped in a checksummed header and handed to a
//! [`ProgressStore`].

mod atomic_write;
pub mod codec;
pub mod file_header;
pub mod progress_file;
pub mod save_error;
mod save_plugin;
pub mod saveable_ext;
pub mod store;


pub use progress_file::{ProgressFile, CURRENT_PROGRESS_VERSION};
pub use save_error::SaveError;
pub use save_plugin::{LoadProgressEvent, SaveProgressEvent, SavePlugin};
pub use saveable_ext::SaveableAppExt;
pub use store::{FileStore, MemoryStore, ProgressStore, ProgressStoreHandle};
