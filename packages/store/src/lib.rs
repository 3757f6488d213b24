pub mod config;
pub mod error;
pub mod kv;
pub mod record;

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file_store;
#[cfg(not(target_arch = "wasm32"))]
pub use file_store::{default_data_dir, FileStore};

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local_storage::LocalStorageStore;

pub use config::SessionConfig;
pub use error::StoreError;
pub use kv::{get_versioned, put_versioned, KeyValueStore};
pub use record::{Versioned, SCHEMA_VERSION};
