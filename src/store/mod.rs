//! Capture stores: where capture records physically live.
//!
//! A store hands out [`CaptureSlot`]s addressed by capture key. It knows
//! nothing about the record format; the data mapper decides what goes in.

mod directory;
mod temporary;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use directory::{normalize_base_path, DirectoryCaptureStore, DEFAULT_CAPTURE_FILE_EXTENSION};
pub use temporary::TemporaryCaptureStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("No capture record at {0}")]
    Missing(PathBuf),
    #[error("Capture key {0:?} cannot be used as a file name")]
    InvalidKey(String),
    #[error("Temporary capture store has already been disposed")]
    Disposed,
}

pub trait CaptureStore: Send + Sync {
    /// Return the slot a new record for `key` gets written to. Whatever the
    /// slot held before is overwritten by the next write.
    fn fresh_slot(&self, key: &str) -> Result<CaptureSlot, StoreError>;

    /// Return the slot currently holding the record for `key`.
    fn existing_slot(&self, key: &str) -> Result<CaptureSlot, StoreError>;
}

/// A single addressable capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSlot {
    path: PathBuf,
}

impl CaptureSlot {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if nothing has been written to the slot yet.
    pub fn is_empty(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }

    /// Replace the slot's content with `bytes`.
    ///
    /// The bytes land in a sibling temp file that is flushed, synced and then
    /// renamed over the slot, so readers see either the old state or the
    /// complete new record.
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::Missing(self.path.clone()))
            }
            Err(err) => Err(StoreError::Io(err)),
        }
    }
}

/// Reject keys that would not stay inside the store directory.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let escapes = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(|c: char| matches!(c, '/' | '\\' | '\0'));
    if escapes {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Delete `path` if it exists.
pub(crate) fn purge_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
