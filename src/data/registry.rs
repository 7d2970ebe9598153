//! Allow-list of concrete types that may stand behind a polymorphic value.
//!
//! Replay never resolves arbitrary type names: a recorded name is only turned
//! back into a value if a decoder was registered for it against the declared
//! base type.
//!
//! While a record is decoded the registry is put in scope for the current
//! thread, so `Polymorphic` values nested in fields and collections resolve
//! their types through the same allow-list as a top-level one.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::record::decode_lenient;
use crate::error::MappingCause;

type Decoder<B> = Box<dyn Fn(Value) -> serde_json::Result<Box<B>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct TypeRegistry {
    decoders: Arc<HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>>,
}

struct Scope {
    types: TypeRegistry,
    unknown: Option<String>,
}

thread_local! {
    static SCOPES: RefCell<Vec<Scope>> = const { RefCell::new(Vec::new()) };
}

/// Pops the innermost scope, also when decoding panics.
struct ScopeGuard;

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `T` to be replayed where a `Box<B>` is declared.
    ///
    /// `T` is registered under its Rust type name, which is the name the
    /// capture side records for it.
    pub fn register<B, T>(&mut self, upcast: fn(T) -> Box<B>) -> &mut Self
    where
        B: ?Sized + 'static,
        T: DeserializeOwned + 'static,
    {
        self.register_as(std::any::type_name::<T>(), upcast)
    }

    /// Like [`register`](Self::register) but under an explicit name.
    pub fn register_as<B, T>(&mut self, type_name: &str, upcast: fn(T) -> Box<B>) -> &mut Self
    where
        B: ?Sized + 'static,
        T: DeserializeOwned + 'static,
    {
        let decoder: Decoder<B> = Box::new(move |value| decode_lenient::<T>(value).map(upcast));
        Arc::make_mut(&mut self.decoders)
            .insert((TypeId::of::<B>(), type_name.to_string()), Arc::new(decoder));
        self
    }

    pub fn contains<B: ?Sized + 'static>(&self, type_name: &str) -> bool {
        self.decoders
            .contains_key(&(TypeId::of::<B>(), type_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Rebuild the concrete value recorded as `type_name` behind a `Box<B>`.
    pub fn decode<B: ?Sized + 'static>(
        &self,
        type_name: &str,
        value: Value,
    ) -> Result<Box<B>, MappingCause> {
        let decoder = self
            .decoders
            .get(&(TypeId::of::<B>(), type_name.to_string()))
            .and_then(|entry| entry.downcast_ref::<Decoder<B>>())
            .ok_or_else(|| MappingCause::UnknownType(type_name.to_string()))?;
        Ok(decoder(value)?)
    }

    /// Run `decode` with this registry in scope for nested polymorphic values.
    ///
    /// A failure caused by an unregistered nested type is reported as
    /// [`MappingCause::UnknownType`] rather than as a bare JSON error.
    pub(crate) fn decode_scoped<T>(
        &self,
        decode: impl FnOnce() -> serde_json::Result<T>,
    ) -> Result<T, MappingCause> {
        SCOPES.with(|scopes| {
            scopes.borrow_mut().push(Scope {
                types: self.clone(),
                unknown: None,
            })
        });
        let _guard = ScopeGuard;

        let result = decode();
        let unknown = SCOPES.with(|scopes| {
            scopes
                .borrow_mut()
                .last_mut()
                .and_then(|scope| scope.unknown.take())
        });
        match (result, unknown) {
            (Ok(value), _) => Ok(value),
            (Err(_), Some(name)) => Err(MappingCause::UnknownType(name)),
            (Err(err), None) => Err(err.into()),
        }
    }
}

/// Decode a polymorphic value through the registry currently in scope.
pub(crate) fn decode_in_scope<B: ?Sized + 'static>(
    type_name: &str,
    value: Value,
) -> Result<Box<B>, MappingCause> {
    let types = SCOPES.with(|scopes| scopes.borrow().last().map(|scope| scope.types.clone()));
    let result = match types {
        Some(types) => types.decode::<B>(type_name, value),
        None => Err(MappingCause::UnknownType(type_name.to_string())),
    };
    if let Err(MappingCause::UnknownType(name)) = &result {
        SCOPES.with(|scopes| {
            if let Some(scope) = scopes.borrow_mut().last_mut() {
                scope.unknown.get_or_insert_with(|| name.clone());
            }
        });
    }
    result
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.decoders.keys().map(|(_, name)| name.as_str()).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry").field("types", &names).finish()
    }
}
