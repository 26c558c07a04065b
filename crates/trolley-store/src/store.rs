//! The session storage contract.

use crate::StoreError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// Key/value session backend consumed by a cart.
///
/// Values cross the boundary as JSON; any `Serialize`/`DeserializeOwned`
/// type can be stored. Methods take `&self` so a single backend can be
/// shared between carts (see the blanket impls for `&S` and `Arc<S>`).
///
/// Every operation is treated as an atomic get or put by callers; a
/// backend with weaker atomicity must uphold that itself.
pub trait SessionStore {
    /// Check whether a key is present.
    fn has(&self, key: &str) -> Result<bool, StoreError>;

    /// Get a value by key.
    ///
    /// Returns `None` if the key doesn't exist.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError>;

    /// Put a key/value pair, overwriting any previous value.
    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError>;

    /// Remove a key. No-op if the key doesn't exist.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: SessionStore> SessionStore for &S {
    fn has(&self, key: &str) -> Result<bool, StoreError> {
        (**self).has(key)
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        (**self).get(key)
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

impl<S: SessionStore> SessionStore for Arc<S> {
    fn has(&self, key: &str) -> Result<bool, StoreError> {
        (**self).has(key)
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        (**self).get(key)
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}
