//! Capturable test doubles and advice builders

use std::path::Path;
use std::sync::Arc;

use capture_replay::{
    CallIdentity, CaptureReplayAdvice, CaptureReplayError, CaptureStore, Capturing,
    DirectoryCaptureStore, Interceptor, JsonDataMapper, Mode, TemporaryCaptureStore, TypeRegistry,
};
use parking_lot::Mutex;

/// A bean with one capturable getter and a plain setter.
///
/// The setter is never intercepted, so tests can change what the real
/// getter would return while replay keeps answering from the capture.
pub struct CapturableBean {
    string: Mutex<String>,
    reads: Mutex<usize>,
}

impl CapturableBean {
    pub fn new() -> Self {
        Self {
            string: Mutex::new(String::new()),
            reads: Mutex::new(0),
        }
    }

    pub fn set_string(&self, value: &str) {
        *self.string.lock() = value.to_string();
    }

    pub fn get_string(&self) -> String {
        *self.reads.lock() += 1;
        self.string.lock().clone()
    }

    /// How many times the real getter ran
    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

impl Default for CapturableBean {
    fn default() -> Self {
        Self::new()
    }
}

/// Capturing wrapper exposing `get_string` the way a call site would.
pub struct CapturedBean {
    pub bean: Capturing<CapturableBean>,
    pub advice: Arc<CaptureReplayAdvice>,
}

impl CapturedBean {
    pub fn get_string(&self) -> Result<String, CaptureReplayError> {
        self.bean
            .call(&CallIdentity::new("getString"), CapturableBean::get_string)
    }

    pub fn set_string(&self, value: &str) {
        self.bean.inner().set_string(value);
    }
}

pub fn captured_bean(store: Arc<dyn CaptureStore>, mode: Mode) -> CapturedBean {
    let advice = advice_over(store, mode, TypeRegistry::new());
    CapturedBean {
        bean: Capturing::new(CapturableBean::new(), Interceptor::new(advice.clone())),
        advice,
    }
}

pub fn advice_over(
    store: Arc<dyn CaptureStore>,
    mode: Mode,
    types: TypeRegistry,
) -> Arc<CaptureReplayAdvice> {
    let mapper = JsonDataMapper::new(store).with_types(types);
    Arc::new(
        CaptureReplayAdvice::builder()
            .mode(mode)
            .data_mapper(Arc::new(mapper))
            .build()
            .expect("advice with mode and mapper should build"),
    )
}

pub fn temporary_store() -> Arc<TemporaryCaptureStore> {
    Arc::new(TemporaryCaptureStore::new().expect("temp store should be created"))
}

pub fn directory_store(dir: &Path) -> Arc<DirectoryCaptureStore> {
    Arc::new(
        DirectoryCaptureStore::new(dir.to_string_lossy()).expect("directory store should build"),
    )
}
