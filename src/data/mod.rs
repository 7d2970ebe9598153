//! Capture keys, capture records and the mappers that persist them

pub mod call;
pub mod fingerprint;
mod lenient;
pub mod mapper;
pub mod record;
pub mod registry;

pub use call::{CallIdentity, CaptureKey};
pub use fingerprint::{argument_hash, symbol_hash, value_hash, NULL_ARGUMENT_HASH};
pub use mapper::{DataMapper, JsonDataMapper};
pub use record::{decode_lenient, CapturedRecord, Polymorphic, Replayable, TypeTagged};
pub use registry::TypeRegistry;
