//! Call-site glue between designated operations and the advice.
//!
//! There is no implicit weaving: a capturable operation routes itself through
//! an [`Interceptor`], or its owner is wrapped in [`Capturing`]. When wiring
//! decided the mode is OFF no advice is installed and both simply call through.

use std::sync::Arc;

use crate::advice::CaptureReplayAdvice;
use crate::data::{CallIdentity, Replayable};
use crate::error::CaptureReplayError;

#[derive(Clone, Default)]
pub struct Interceptor {
    advice: Option<Arc<CaptureReplayAdvice>>,
}

impl Interceptor {
    pub fn new(advice: Arc<CaptureReplayAdvice>) -> Self {
        Self {
            advice: Some(advice),
        }
    }

    /// An interceptor with no advice installed.
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Accept whatever wiring produced, which is `None` for mode OFF.
    pub fn from_wiring(advice: Option<Arc<CaptureReplayAdvice>>) -> Self {
        Self { advice }
    }

    pub fn advice(&self) -> Option<&Arc<CaptureReplayAdvice>> {
        self.advice.as_ref()
    }

    pub fn is_installed(&self) -> bool {
        self.advice.is_some()
    }

    pub fn call<R, F>(&self, call: &CallIdentity, proceed: F) -> Result<R, CaptureReplayError>
    where
        R: Replayable,
        F: FnOnce() -> R,
    {
        match &self.advice {
            Some(advice) => advice.around(call, proceed),
            None => Ok(proceed()),
        }
    }

    pub fn try_call<R, E, F>(&self, call: &CallIdentity, proceed: F) -> Result<R, E>
    where
        R: Replayable,
        E: From<CaptureReplayError>,
        F: FnOnce() -> Result<R, E>,
    {
        match &self.advice {
            Some(advice) => advice.try_around(call, proceed),
            None => proceed(),
        }
    }
}

/// Decorator giving every call on `T` a capture/replay detour.
///
/// [`inner`](Self::inner) reaches the target directly, bypassing interception.
pub struct Capturing<T> {
    inner: T,
    interceptor: Interceptor,
}

impl<T> Capturing<T> {
    pub fn new(inner: T, interceptor: Interceptor) -> Self {
        Self { inner, interceptor }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn call<R, F>(&self, call: &CallIdentity, operation: F) -> Result<R, CaptureReplayError>
    where
        R: Replayable,
        F: FnOnce(&T) -> R,
    {
        self.interceptor.call(call, || operation(&self.inner))
    }

    pub fn try_call<R, E, F>(&self, call: &CallIdentity, operation: F) -> Result<R, E>
    where
        R: Replayable,
        E: From<CaptureReplayError>,
        F: FnOnce(&T) -> Result<R, E>,
    {
        self.interceptor.try_call(call, || operation(&self.inner))
    }
}
