// ---------------------------------------------------------------------------
// SaveError: typed failures of the progress save/load pipeline
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while saving or loading progress.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Bitcode encoding failed.
    Encode(String),
    /// Bitcode decoding or decompression failed.
    Decode(String),
    /// Header present but the bytes behind it are damaged.
    Corrupted(String),
    /// File written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Nothing has been saved yet.
    NoData,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::Corrupted(msg) => write!(f, "Progress file is corrupted: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: file is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::NoData => write!(f, "No saved progress available"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            return SaveError::NoData;
        }
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
