//! Turn a [`Config`] into a ready-to-use advice.

use std::sync::Arc;

use super::settings::{Config, StoreConfig};
use crate::advice::CaptureReplayAdvice;
use crate::data::{JsonDataMapper, TypeRegistry};
use crate::error::CaptureReplayError;
use crate::store::{CaptureStore, DirectoryCaptureStore, TemporaryCaptureStore};

/// Build the capture store described by `config`.
pub fn build_store(config: &StoreConfig) -> Result<Arc<dyn CaptureStore>, CaptureReplayError> {
    match config {
        StoreConfig::Directory { path, extension } => {
            let path = path.as_deref().ok_or_else(|| {
                CaptureReplayError::Configuration(
                    "You must specify a path for capture files.".to_string(),
                )
            })?;
            Ok(Arc::new(DirectoryCaptureStore::with_extension(
                path,
                extension.as_str(),
            )?))
        }
        StoreConfig::Temporary => {
            let store = TemporaryCaptureStore::new().map_err(|err| {
                CaptureReplayError::Configuration(format!(
                    "Could not create temporary capture directory: {err}"
                ))
            })?;
            Ok(Arc::new(store))
        }
    }
}

/// Wire store, data mapper and advice together.
///
/// Returns `Ok(None)` when the mode is OFF: no advice gets installed at all,
/// so call sites run their real implementation without any detour.
pub fn wire(
    config: &Config,
    types: TypeRegistry,
) -> Result<Option<Arc<CaptureReplayAdvice>>, CaptureReplayError> {
    let mode = config.mode.ok_or_else(|| {
        CaptureReplayError::Configuration(
            "Capture/replay is used but no mode (off/disabled/capture/replay) has been set."
                .to_string(),
        )
    })?;

    if mode.is_off() {
        tracing::info!("Capture/replay is off; no interception installed");
        return Ok(None);
    }

    let store = build_store(&config.store)?;
    let mapper = JsonDataMapper::new(store)
        .with_types(types)
        .with_pretty(config.pretty);
    let advice = CaptureReplayAdvice::builder()
        .mode(mode)
        .data_mapper(Arc::new(mapper))
        .build()?;

    tracing::info!(mode = %mode, "Capture/replay interception installed");
    Ok(Some(Arc::new(advice)))
}
