//! Data mappers turn call identities and values into capture records on disk.

use std::sync::Arc;

use super::call::CallIdentity;
use super::record::{CapturedRecord, Replayable};
use super::registry::TypeRegistry;
use crate::error::{DataMappingError, MappingCause};
use crate::store::CaptureStore;

pub trait DataMapper: Send + Sync {
    /// Persist `record` under the key derived from `call`, replacing any
    /// earlier record for the same key.
    fn write(&self, call: &CallIdentity, record: &CapturedRecord) -> Result<(), DataMappingError>;

    /// Load the record stored under the key derived from `call`.
    fn read(&self, call: &CallIdentity) -> Result<CapturedRecord, DataMappingError>;

    /// Types allowed to stand behind polymorphic return values.
    fn types(&self) -> &TypeRegistry;
}

impl dyn DataMapper {
    /// Capture a typed value.
    pub fn write_value<R: Replayable>(
        &self,
        call: &CallIdentity,
        value: &R,
    ) -> Result<(), DataMappingError> {
        let record = value
            .to_record()
            .map_err(|err| DataMappingError::write(call.capture_key().into_string(), err))?;
        self.write(call, &record)
    }

    /// Replay a typed value, rebuilding the concrete type that was captured.
    pub fn read_value<R: Replayable>(&self, call: &CallIdentity) -> Result<R, DataMappingError> {
        let record = self.read(call)?;
        R::from_record(record, self.types())
            .map_err(|cause| DataMappingError::read(call.capture_key().into_string(), cause))
    }
}

/// Writes one JSON document per capture key into a [`CaptureStore`].
///
/// The document looks like `{"type": "<concrete type>", "value": ...}`.
pub struct JsonDataMapper {
    store: Arc<dyn CaptureStore>,
    types: TypeRegistry,
    pretty: bool,
}

impl JsonDataMapper {
    pub fn new(store: Arc<dyn CaptureStore>) -> Self {
        Self {
            store,
            types: TypeRegistry::new(),
            pretty: true,
        }
    }

    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Pretty-print capture files (the default) or write them compactly.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn store(&self) -> &Arc<dyn CaptureStore> {
        &self.store
    }

    fn encode(&self, record: &CapturedRecord) -> serde_json::Result<Vec<u8>> {
        if self.pretty {
            serde_json::to_vec_pretty(record)
        } else {
            serde_json::to_vec(record)
        }
    }
}

impl DataMapper for JsonDataMapper {
    fn write(&self, call: &CallIdentity, record: &CapturedRecord) -> Result<(), DataMappingError> {
        let key = call.capture_key();
        let fail = |cause: MappingCause| DataMappingError::write(key.as_str(), cause);

        let slot = self.store.fresh_slot(key.as_str()).map_err(|e| fail(e.into()))?;
        let bytes = self.encode(record).map_err(|e| fail(e.into()))?;
        slot.write_bytes(&bytes).map_err(|e| fail(e.into()))?;

        tracing::debug!(
            key = %key,
            type_name = %record.type_name,
            path = %slot.path().display(),
            "Captured call result"
        );
        Ok(())
    }

    fn read(&self, call: &CallIdentity) -> Result<CapturedRecord, DataMappingError> {
        let key = call.capture_key();
        let fail = |cause: MappingCause| DataMappingError::read(key.as_str(), cause);

        let slot = self.store.existing_slot(key.as_str()).map_err(|e| fail(e.into()))?;
        let bytes = slot.read_bytes().map_err(|e| fail(e.into()))?;
        let record: CapturedRecord = serde_json::from_slice(&bytes).map_err(|e| fail(e.into()))?;

        tracing::debug!(key = %key, type_name = %record.type_name, "Replayed call result");
        Ok(record)
    }

    fn types(&self) -> &TypeRegistry {
        &self.types
    }
}
