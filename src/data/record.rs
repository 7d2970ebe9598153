//! Type-tagged capture records and the traits that move values in and out of them.

use std::ops::{Deref, DerefMut};

use serde::de::{self, DeserializeOwned};
use serde::ser;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::lenient::Lenient;
use super::registry::{decode_in_scope, TypeRegistry};
use crate::error::MappingCause;

/// What a capture file holds: the concrete type name and the value.
///
/// Unknown members are ignored when reading, so records written by a newer
/// version of a type still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedRecord {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: Value,
}

impl CapturedRecord {
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }
}

/// The capture half of a replayable value: its concrete runtime type name and
/// its JSON form.
///
/// Object safe, so a trait that lists it as a supertrait lets a
/// `Box<dyn Trait>` report the type actually behind it.
pub trait TypeTagged {
    fn type_tag(&self) -> &'static str;

    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T: Serialize + 'static> TypeTagged for T {
    fn type_tag(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// A value that can be captured and later rebuilt from its record.
pub trait Replayable: Sized {
    fn to_record(&self) -> serde_json::Result<CapturedRecord>;

    fn from_record(record: CapturedRecord, types: &TypeRegistry) -> Result<Self, MappingCause>;
}

impl<T> Replayable for T
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn to_record(&self) -> serde_json::Result<CapturedRecord> {
        Ok(CapturedRecord::new(self.type_tag(), self.to_json()?))
    }

    fn from_record(record: CapturedRecord, types: &TypeRegistry) -> Result<Self, MappingCause> {
        let expected = std::any::type_name::<T>();
        if record.type_name != expected {
            return Err(MappingCause::TypeMismatch {
                expected: expected.to_string(),
                found: record.type_name,
            });
        }
        types.decode_scoped(|| decode_lenient(record.value))
    }
}

/// Decode `value` as `T`, accepting a lone value wherever a collection is
/// expected, including inside fields, list items and map values.
pub fn decode_lenient<T: DeserializeOwned>(value: Value) -> serde_json::Result<T> {
    T::deserialize(Lenient(value))
}

/// A boxed value whose concrete type is only known at runtime.
///
/// Serialized as a nested `{"type": ..., "value": ...}` record naming the
/// concrete type. Deserializing looks that name up in the [`TypeRegistry`]
/// of the record being replayed, so it works as a return value as well as in
/// fields and collections of other replayable values.
pub struct Polymorphic<B: ?Sized>(pub Box<B>);

impl<B: ?Sized> Polymorphic<B> {
    pub fn new(inner: Box<B>) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> Box<B> {
        self.0
    }
}

impl<B: ?Sized + TypeTagged> Polymorphic<B> {
    /// Type name of the value behind the box.
    pub fn type_tag(&self) -> &'static str {
        let inner: &B = &self.0;
        inner.type_tag()
    }
}

impl<B: ?Sized> Deref for Polymorphic<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.0
    }
}

impl<B: ?Sized> DerefMut for Polymorphic<B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.0
    }
}

impl<B: ?Sized + TypeTagged> Serialize for Polymorphic<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let inner: &B = &self.0;
        let value = inner.to_json().map_err(ser::Error::custom)?;
        CapturedRecord::new(inner.type_tag(), value).serialize(serializer)
    }
}

impl<'de, B: ?Sized + 'static> Deserialize<'de> for Polymorphic<B> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = CapturedRecord::deserialize(deserializer)?;
        decode_in_scope::<B>(&record.type_name, record.value)
            .map(Polymorphic)
            .map_err(de::Error::custom)
    }
}
