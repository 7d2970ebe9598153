//! Call identities and the capture keys derived from them

use std::fmt;

use serde::Serialize;

use super::fingerprint::{argument_hash, symbol_hash, value_hash, NULL_ARGUMENT_HASH};
use crate::error::{CaptureReplayError, DataMappingError};

/// Method name plus the hashes of its positional arguments.
///
/// Arguments are hashed as they are added, so the identity never holds on to
/// the argument values themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallIdentity {
    method_name: String,
    argument_hashes: Vec<i64>,
}

impl CallIdentity {
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            argument_hashes: Vec::new(),
        }
    }

    /// Build an identity from JSON argument values (`null` hashes to 0).
    pub fn from_values(method_name: impl Into<String>, arguments: &[serde_json::Value]) -> Self {
        Self {
            method_name: method_name.into(),
            argument_hashes: arguments.iter().map(value_hash).collect(),
        }
    }

    /// Append a content-hashed argument.
    pub fn arg<T: Serialize + ?Sized>(mut self, argument: &T) -> Result<Self, CaptureReplayError> {
        let hash = argument_hash(argument).map_err(|err| {
            DataMappingError::key_derivation(
                format!("{}(<argument {}>)", self.method_name, self.arity()),
                err,
            )
        })?;
        self.argument_hashes.push(hash);
        Ok(self)
    }

    /// Append an argument by its canonical string form, e.g. an enum
    /// constant whose `Display` is its name.
    pub fn symbol(mut self, canonical: impl fmt::Display) -> Self {
        self.argument_hashes.push(symbol_hash(&canonical.to_string()));
        self
    }

    /// Append an absent argument.
    pub fn null(mut self) -> Self {
        self.argument_hashes.push(NULL_ARGUMENT_HASH);
        self
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn argument_hashes(&self) -> &[i64] {
        &self.argument_hashes
    }

    pub fn arity(&self) -> usize {
        self.argument_hashes.len()
    }

    pub fn capture_key(&self) -> CaptureKey {
        let mut key = self.method_name.clone();
        for hash in &self.argument_hashes {
            key.push('-');
            key.push_str(&hash.to_string());
        }
        CaptureKey(key)
    }
}

/// `methodName-hash0-hash1-...`, also the capture file's stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaptureKey(String);

impl CaptureKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CaptureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CaptureKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
