//! # Filesystem-backed key-value store
//!
//! [`FileStore`] is a [`KeyValueStore`] implementation that keeps one file per
//! key under a base directory. It is used on desktop and mobile platforms, where
//! there is no browser `localStorage`, to retain session data across restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── user.json
//! ├── savedAssessments.json
//! ├── userNotes.json
//! ├── comparisons.json
//! └── searchHistory.json
//! ```
//!
//! Keys are escaped before becoming file names: each byte outside
//! `[A-Za-z0-9._-]` becomes `%XX`. The encoding is reversible, so distinct keys
//! always map to distinct files (`a/b` is `a%2Fb.json`, `a_b` is `a_b.json`).
//!
//! ## Platform data directories
//!
//! [`default_data_dir`] wraps [`dirs::data_dir()`]:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/security-assessor/` |
//! | Linux | `~/.local/share/security-assessor/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\security-assessor\` |

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::kv::KeyValueStore;

const APP_DIR: &str = "security-assessor";

/// Platform data directory for the application, if the platform has one.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR))
}

/// Filesystem-backed KeyValueStore for desktop and mobile persistence.
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    /// Store rooted at [`default_data_dir`].
    pub fn in_data_dir() -> Result<Self, StoreError> {
        default_data_dir()
            .map(Self::new)
            .ok_or_else(|| StoreError::Unavailable("no platform data directory".to_string()))
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{}.json", escape_key(key)))
    }
}

fn escape_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name
}

fn io_err(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.base).map_err(|e| io_err(key, e))?;
        let path = self.key_path(key);
        // Readers only ever see a complete blob.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| io_err(key, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_err(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(key, e)),
        }
    }
}
