//! Throwaway capture store living in a private temp directory

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use tempfile::TempDir;

use super::{purge_file, validate_key, CaptureSlot, CaptureStore, StoreError};

/// Capture store for a single test run.
///
/// Slots are memoized per key, so capture and replay within one store see the
/// same file. Everything is removed by [`dispose`](Self::dispose), or on drop.
pub struct TemporaryCaptureStore {
    dir: Mutex<Option<TempDir>>,
    slots: Mutex<HashMap<String, CaptureSlot>>,
}

impl TemporaryCaptureStore {
    pub fn new() -> Result<Self, StoreError> {
        let dir = tempfile::Builder::new()
            .prefix("capture-replay-")
            .tempdir()?;
        tracing::debug!(dir = %dir.path().display(), "Created temporary capture store");
        Ok(Self {
            dir: Mutex::new(Some(dir)),
            slots: Mutex::new(HashMap::new()),
        })
    }

    /// Root of the temp directory, or `None` once disposed.
    pub fn root(&self) -> Option<PathBuf> {
        self.dir.lock().as_ref().map(|dir| dir.path().to_path_buf())
    }

    pub fn is_disposed(&self) -> bool {
        self.dir.lock().is_none()
    }

    /// Delete the temp directory and everything in it. Idempotent.
    pub fn dispose(&self) -> Result<(), StoreError> {
        self.slots.lock().clear();
        if let Some(dir) = self.dir.lock().take() {
            let path = dir.path().to_path_buf();
            dir.close()?;
            tracing::debug!(dir = %path.display(), "Disposed temporary capture store");
        }
        Ok(())
    }

    fn root_or_disposed(&self) -> Result<PathBuf, StoreError> {
        self.root().ok_or(StoreError::Disposed)
    }
}

impl CaptureStore for TemporaryCaptureStore {
    fn fresh_slot(&self, key: &str) -> Result<CaptureSlot, StoreError> {
        validate_key(key)?;
        let root = self.root_or_disposed()?;

        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(key) {
            return Ok(slot.clone());
        }

        let path = root.join(key);
        purge_file(&path)?;
        fs::File::create(&path)?;
        let slot = CaptureSlot::new(path);
        slots.insert(key.to_string(), slot.clone());
        Ok(slot)
    }

    fn existing_slot(&self, key: &str) -> Result<CaptureSlot, StoreError> {
        validate_key(key)?;
        let root = self.root_or_disposed()?;

        if let Some(slot) = self.slots.lock().get(key) {
            return Ok(slot.clone());
        }
        let path = root.join(key);
        if !path.is_file() {
            return Err(StoreError::Missing(path));
        }
        Ok(CaptureSlot::new(path))
    }
}
