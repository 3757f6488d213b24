//! # Browser localStorage store
//!
//! [`LocalStorageStore`] is the [`KeyValueStore`] used on the **web platform**.
//! It reads and writes `window.localStorage` through `web-sys`, which is exactly
//! the synchronous, per-origin, string-valued storage the session layer is
//! designed around.
//!
//! ## Scoping
//!
//! Each instance may carry a namespace. Keys are then stored as
//! `"<namespace>:<key>"`, so several accounts or test harnesses can share an
//! origin without seeing each other's data.
//!
//! ## Error handling
//!
//! A missing `window` or a browser with storage disabled yields
//! [`StoreError::Unavailable`]. Quota errors from `setItem` surface the same
//! way; the session layer logs them and keeps its in-memory state.

use web_sys::Storage;

use crate::error::StoreError;
use crate::kv::KeyValueStore;

/// `window.localStorage`-backed KeyValueStore for the web platform.
#[derive(Clone, Debug, Default)]
pub struct LocalStorageStore {
    namespace: Option<String>,
}

impl LocalStorageStore {
    /// Store over the unprefixed origin storage.
    pub fn new() -> Self {
        Self::with_namespace(None)
    }

    /// - `Some("user-uuid")` → keys `"user-uuid:<key>"`
    /// - `None` → bare keys, as the legacy web client wrote them
    pub fn with_namespace(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
        }
    }

    fn storage(&self) -> Result<Storage, StoreError> {
        let window = web_sys::window()
            .ok_or_else(|| StoreError::Unavailable("no window object".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("localStorage denied: {e:?}")))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".to_string()))
    }

    fn scoped(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}:{key}"),
            None => key.to_string(),
        }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage()?
            .get_item(&self.scoped(key))
            .map_err(|e| StoreError::Unavailable(format!("getItem({key}) failed: {e:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage()?
            .set_item(&self.scoped(key), value)
            .map_err(|e| StoreError::Unavailable(format!("setItem({key}) failed: {e:?}")))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(&self.scoped(key))
            .map_err(|e| StoreError::Unavailable(format!("removeItem({key}) failed: {e:?}")))
    }
}
