//! Directory-backed capture store for captures that outlive the test run

use std::fs;
use std::path::{PathBuf, MAIN_SEPARATOR};

use super::{purge_file, validate_key, CaptureSlot, CaptureStore, StoreError};
use crate::error::CaptureReplayError;

pub const DEFAULT_CAPTURE_FILE_EXTENSION: &str = ".json";

/// Make sure a base path ends with a path separator.
pub fn normalize_base_path(path: &str) -> String {
    if path.ends_with('/') || path.ends_with(MAIN_SEPARATOR) {
        path.to_string()
    } else {
        format!("{path}{MAIN_SEPARATOR}")
    }
}

/// Stores one file per capture key at `<base>/<key><extension>`.
#[derive(Debug, Clone)]
pub struct DirectoryCaptureStore {
    base_path: String,
    extension: String,
}

impl DirectoryCaptureStore {
    pub fn new(base_path: impl Into<String>) -> Result<Self, CaptureReplayError> {
        Self::with_extension(base_path, DEFAULT_CAPTURE_FILE_EXTENSION)
    }

    pub fn with_extension(
        base_path: impl Into<String>,
        extension: impl Into<String>,
    ) -> Result<Self, CaptureReplayError> {
        let base_path = base_path.into();
        if base_path.trim().is_empty() {
            return Err(CaptureReplayError::Configuration(
                "You must specify a path for capture files.".to_string(),
            ));
        }
        Ok(Self {
            base_path: normalize_base_path(&base_path),
            extension: extension.into(),
        })
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(PathBuf::from(format!(
            "{}{}{}",
            self.base_path, key, self.extension
        )))
    }

    /// Keys of every capture file currently in the directory, sorted.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.base_path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = name.strip_suffix(self.extension.as_str()) {
                if !key.is_empty() {
                    keys.push(key.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Remove every capture file in the directory. Returns how many went.
    pub fn purge_all(&self) -> Result<usize, StoreError> {
        let keys = self.keys()?;
        for key in &keys {
            purge_file(&self.slot_path(key)?)?;
        }
        tracing::info!(base = %self.base_path, removed = keys.len(), "Purged capture files");
        Ok(keys.len())
    }
}

impl CaptureStore for DirectoryCaptureStore {
    fn fresh_slot(&self, key: &str) -> Result<CaptureSlot, StoreError> {
        let path = self.slot_path(key)?;
        fs::create_dir_all(&self.base_path)?;
        purge_file(&path)?;
        tracing::debug!(key, path = %path.display(), "Provisioned fresh capture slot");
        Ok(CaptureSlot::new(path))
    }

    fn existing_slot(&self, key: &str) -> Result<CaptureSlot, StoreError> {
        let path = self.slot_path(key)?;
        if !path.is_file() {
            return Err(StoreError::Missing(path));
        }
        Ok(CaptureSlot::new(path))
    }
}
