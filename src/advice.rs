//! The capture/replay state machine and call routing.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::data::{CallIdentity, DataMapper, Replayable};
use crate::error::CaptureReplayError;
use crate::mode::Mode;

/// Holds the current [`Mode`] and decides what an intercepted call does.
pub struct CaptureReplayAdvice {
    mode: RwLock<Mode>,
    data_mapper: Arc<dyn DataMapper>,
}

impl CaptureReplayAdvice {
    pub fn new(mode: Mode, data_mapper: Arc<dyn DataMapper>) -> Self {
        Self {
            mode: RwLock::new(mode),
            data_mapper,
        }
    }

    pub fn builder() -> CaptureReplayAdviceBuilder {
        CaptureReplayAdviceBuilder::default()
    }

    pub fn mode(&self) -> Mode {
        *self.mode.read()
    }

    /// Switch to `mode`. Entering or leaving OFF is rejected and leaves the
    /// current mode untouched.
    pub fn set_mode(&self, mode: Mode) -> Result<(), CaptureReplayError> {
        let mut current = self.mode.write();
        let from = *current;
        if let Err(err) = from.check_transition(mode) {
            tracing::warn!(from = %from, to = %mode, "Rejected capture/replay mode change");
            return Err(err);
        }
        if from != mode {
            tracing::info!(from = %from, to = %mode, "Capture/replay mode changed");
        }
        *current = mode;
        Ok(())
    }

    pub fn data_mapper(&self) -> &Arc<dyn DataMapper> {
        &self.data_mapper
    }

    /// Route one call according to the current mode.
    ///
    /// `proceed` runs the real implementation. It is skipped in REPLAY.
    pub fn around<R, F>(&self, call: &CallIdentity, proceed: F) -> Result<R, CaptureReplayError>
    where
        R: Replayable,
        F: FnOnce() -> R,
    {
        self.try_around(call, || Ok::<R, CaptureReplayError>(proceed()))
    }

    /// Like [`around`](Self::around) for a fallible real call.
    ///
    /// An error from `proceed` is returned as-is and nothing gets captured.
    pub fn try_around<R, E, F>(&self, call: &CallIdentity, proceed: F) -> Result<R, E>
    where
        R: Replayable,
        E: From<CaptureReplayError>,
        F: FnOnce() -> Result<R, E>,
    {
        match self.mode() {
            Mode::Capture => {
                let value = proceed()?;
                self.data_mapper
                    .write_value(call, &value)
                    .map_err(CaptureReplayError::from)?;
                Ok(value)
            }
            Mode::Replay => Ok(self
                .data_mapper
                .read_value(call)
                .map_err(CaptureReplayError::from)?),
            Mode::Disabled => proceed(),
            Mode::Off => Err(CaptureReplayError::IllegalUsage(
                "Capturing/replaying is switched off. You should not use CaptureReplayAdvice directly."
                    .to_string(),
            )
            .into()),
        }
    }
}

impl fmt::Debug for CaptureReplayAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureReplayAdvice")
            .field("mode", &self.mode())
            .field("types", self.data_mapper.types())
            .finish()
    }
}

/// Collects the advice's collaborators and checks them in [`build`](Self::build).
#[derive(Default)]
pub struct CaptureReplayAdviceBuilder {
    mode: Option<Mode>,
    data_mapper: Option<Arc<dyn DataMapper>>,
}

impl CaptureReplayAdviceBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn data_mapper(mut self, data_mapper: Arc<dyn DataMapper>) -> Self {
        self.data_mapper = Some(data_mapper);
        self
    }

    pub fn build(self) -> Result<CaptureReplayAdvice, CaptureReplayError> {
        let mode = self.mode.ok_or_else(|| {
            CaptureReplayError::Configuration(
                "Capture/replay is used but no mode (off/disabled/capture/replay) has been set."
                    .to_string(),
            )
        })?;
        let data_mapper = self.data_mapper.ok_or_else(|| {
            CaptureReplayError::Configuration(
                "Capture/replay is used but no data mapper has been set.".to_string(),
            )
        })?;
        Ok(CaptureReplayAdvice::new(mode, data_mapper))
    }
}
