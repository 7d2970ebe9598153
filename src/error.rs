//! Error types shared across capture, replay and wiring

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum CaptureReplayError {
    /// A required collaborator was missing while wiring things up.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// An operation was invoked in a mode that forbids it.
    #[error("Illegal capture/replay usage: {0}")]
    IllegalUsage(String),
    #[error(transparent)]
    DataMapping(#[from] DataMappingError),
}

impl CaptureReplayError {
    pub fn is_illegal_usage(&self) -> bool {
        matches!(self, Self::IllegalUsage(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_data_mapping(&self) -> bool {
        matches!(self, Self::DataMapping(_))
    }
}

/// Which step of capturing or replaying failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingOperation {
    /// Hashing the call's arguments into a capture key, in any mode.
    Key,
    Write,
    Read,
}

/// A capture record could not be written or read.
///
/// Always names the capture key so a failing test points straight at the file.
#[derive(Error, Debug)]
#[error("{}: {cause}", describe(*operation, key))]
pub struct DataMappingError {
    operation: MappingOperation,
    key: String,
    #[source]
    cause: MappingCause,
}

fn describe(operation: MappingOperation, key: &str) -> String {
    match operation {
        MappingOperation::Key => format!("Could not derive a capture key for {key}"),
        MappingOperation::Write => format!("Could not write test data to capture file {key}"),
        MappingOperation::Read => format!("Could not read from capture file {key}"),
    }
}

impl DataMappingError {
    /// An argument could not be hashed, so no key and no file exist yet.
    pub fn key_derivation(call: impl Into<String>, cause: impl Into<MappingCause>) -> Self {
        Self {
            operation: MappingOperation::Key,
            key: call.into(),
            cause: cause.into(),
        }
    }

    pub fn write(key: impl Into<String>, cause: impl Into<MappingCause>) -> Self {
        Self {
            operation: MappingOperation::Write,
            key: key.into(),
            cause: cause.into(),
        }
    }

    pub fn read(key: impl Into<String>, cause: impl Into<MappingCause>) -> Self {
        Self {
            operation: MappingOperation::Read,
            key: key.into(),
            cause: cause.into(),
        }
    }

    pub fn operation(&self) -> MappingOperation {
        self.operation
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cause(&self) -> &MappingCause {
        &self.cause
    }

    /// True when replay found no record, i.e. capture has to run first.
    pub fn is_missing_record(&self) -> bool {
        matches!(self.cause, MappingCause::Store(StoreError::Missing(_)))
    }
}

#[derive(Error, Debug)]
pub enum MappingCause {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Type {0} is not registered for replay")]
    UnknownType(String),
    #[error("Captured value has type {found}, expected {expected}")]
    TypeMismatch { expected: String, found: String },
}

impl From<std::io::Error> for MappingCause {
    fn from(err: std::io::Error) -> Self {
        Self::Store(StoreError::Io(err))
    }
}

pub type Result<T, E = CaptureReplayError> = std::result::Result<T, E>;
