//! # Key-value store
//!
//! Everything the session layer persists goes through [`KeyValueStore`]: a
//! synchronous, string-keyed, string-valued interface shaped after the
//! browser's `localStorage`. Implementations live in sibling modules:
//!
//! | Backend | Module | Platform |
//! |---------|--------|----------|
//! | [`MemoryStore`](crate::MemoryStore) | [`crate::memory`] | everywhere (tests, desktop fallback) |
//! | [`FileStore`](crate::FileStore) | [`crate::file_store`] | native |
//! | `LocalStorageStore` | `crate::local_storage` | wasm32 with the `web` feature |
//!
//! Values written through [`put_versioned`] are wrapped in a
//! [`Versioned`](crate::record::Versioned) envelope; [`get_versioned`] reads
//! them back (including legacy bare payloads).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::record;

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Serialize `value` into a versioned envelope and store it under `key`.
pub fn put_versioned<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let encoded = record::encode(key, value)?;
    tracing::debug!(key, bytes = encoded.len(), "persisting blob");
    store.set(key, &encoded)
}

/// Read and decode the blob under `key`. `Ok(None)` means the key is absent.
pub fn get_versioned<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(raw) => record::decode(key, &raw).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_versioned_roundtrip_through_store() {
        let store = MemoryStore::new();
        put_versioned(&store, "tags", &vec!["a".to_string(), "b".to_string()]).unwrap();

        let raw = store.get("tags").unwrap().unwrap();
        assert!(raw.contains("\"version\":1"));

        let tags: Vec<String> = get_versioned(&store, "tags").unwrap().unwrap();
        assert_eq!(tags, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<Vec<String>> = get_versioned(&store, "nothing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_arc_store_delegates() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set("k", "v").unwrap();
        assert_eq!(KeyValueStore::get(&store, "k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert!(KeyValueStore::get(&store, "k").unwrap().is_none());
    }
}
