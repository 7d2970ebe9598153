//! Capture real call results once, replay them deterministically afterwards.
//!
//! In CAPTURE mode an intercepted call runs for real and its return value is
//! written to a capture file named after the method and its argument hashes.
//! In REPLAY mode the same call is answered from that file without running.

pub mod advice;
pub mod config;
pub mod data;
pub mod error;
pub mod interceptor;
pub mod mode;
pub mod store;

pub use advice::{CaptureReplayAdvice, CaptureReplayAdviceBuilder};
pub use config::{wire, Config};
pub use data::{
    CallIdentity, CaptureKey, CapturedRecord, DataMapper, JsonDataMapper, Polymorphic,
    Replayable, TypeRegistry, TypeTagged,
};
pub use error::{CaptureReplayError, DataMappingError, MappingCause, MappingOperation};
pub use interceptor::{Capturing, Interceptor};
pub use mode::Mode;
pub use store::{CaptureSlot, CaptureStore, DirectoryCaptureStore, StoreError, TemporaryCaptureStore};
