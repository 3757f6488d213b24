//! # Session configuration (`session.toml`)
//!
//! Defines the TOML configuration read when a session context is built
//! (filename: [`SessionConfig::filename`] = `"session.toml"`). It controls how
//! storage keys are named, how long the simulated auth round trips take, and
//! the collection limits.
//!
//! ## Structure
//!
//! ```toml
//! [storage]
//! key_prefix = ""              # prepended to every storage key
//!
//! [auth]
//! login_latency_ms = 800
//! signup_latency_ms = 1000
//!
//! [history]
//! max_entries = 50
//!
//! [saved]
//! dedupe_by_assessment = false # true keeps one saved record per assessment id
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`SessionConfig`] | Top-level config. TOML (de)serialisation, env loading, canonical filename, storage key helper. |
//! | [`StorageConfig`] | `key_prefix` for namespacing keys in a shared store. |
//! | [`AuthConfig`] | Simulated login/signup latency. |
//! | [`HistoryConfig`] | Search history retention cap, default **50**. |
//! | [`SavedConfig`] | Saved-assessment duplicate policy. |
//!
//! Every section derives or implements `Default`, so a missing or empty file is
//! equivalent to the default configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Environment variable naming a `session.toml` to load.
pub const CONFIG_ENV_VAR: &str = "SESSION_CONFIG";

/// Top-level configuration stored in `session.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub saved: SavedConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Prepended verbatim to every key. Empty keeps the legacy key names.
    #[serde(default)]
    pub key_prefix: String,
}

/// Simulated network latency for the mocked auth calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_login_latency")]
    pub login_latency_ms: u64,
    #[serde(default = "default_signup_latency")]
    pub signup_latency_ms: u64,
}

fn default_login_latency() -> u64 {
    800
}

fn default_signup_latency() -> u64 {
    1000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_latency_ms: default_login_latency(),
            signup_latency_ms: default_signup_latency(),
        }
    }
}

impl AuthConfig {
    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }

    pub fn signup_latency(&self) -> Duration {
        Duration::from_millis(self.signup_latency_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Most-recent entries kept; older ones are evicted on insert.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedConfig {
    /// When set, saving an already-saved assessment returns the existing record.
    /// Off by default: every save creates a new record.
    #[serde(default)]
    pub dedupe_by_assessment: bool,
}

impl SessionConfig {
    /// Builder method to set the storage key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage.key_prefix = prefix.into();
        self
    }

    /// Builder method to set both simulated auth latencies.
    pub fn with_auth_latency(mut self, login_ms: u64, signup_ms: u64) -> Self {
        self.auth.login_latency_ms = login_ms;
        self.auth.signup_latency_ms = signup_ms;
        self
    }

    /// Builder method to set the search history cap.
    pub fn with_history_cap(mut self, max_entries: usize) -> Self {
        self.history.max_entries = max_entries;
        self
    }

    /// Builder method to choose the saved-assessment duplicate policy.
    pub fn with_saved_dedupe(mut self, dedupe: bool) -> Self {
        self.saved.dedupe_by_assessment = dedupe;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "session.toml"
    }

    /// Full storage key for a logical key, with the configured prefix.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.storage.key_prefix, key)
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            key: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|e| StoreError::InvalidConfig {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from the file named by `SESSION_CONFIG` (a `.env` file is honoured),
    /// or fall back to defaults when the variable is unset.
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();

        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => {
                tracing::debug!(%path, "loading session config");
                Self::load(Path::new(&path))
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.storage.key_prefix, "");
        assert_eq!(config.auth.login_latency(), Duration::from_millis(800));
        assert_eq!(config.auth.signup_latency(), Duration::from_millis(1000));
        assert_eq!(config.history.max_entries, 50);
        assert!(!config.saved.dedupe_by_assessment);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = SessionConfig::from_toml("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = SessionConfig::from_toml(
            r#"
            [history]
            max_entries = 10

            [saved]
            dedupe_by_assessment = true
            "#,
        )
        .unwrap();
        assert_eq!(config.history.max_entries, 10);
        assert!(config.saved.dedupe_by_assessment);
        assert_eq!(config.auth, AuthConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = SessionConfig::default()
            .with_key_prefix("sa:")
            .with_auth_latency(0, 5)
            .with_history_cap(20);
        let text = config.to_toml().unwrap();
        assert_eq!(SessionConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_storage_key_prefix() {
        let config = SessionConfig::default().with_key_prefix("tenant-a/");
        assert_eq!(config.storage_key("user"), "tenant-a/user");
        assert_eq!(SessionConfig::default().storage_key("user"), "user");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SessionConfig::filename());
        std::fs::write(&path, "[auth]\nlogin_latency_ms = 5\n").unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.auth.login_latency_ms, 5);
        assert_eq!(config.auth.signup_latency_ms, 1000);

        std::fs::write(&path, "[auth\n").unwrap();
        assert!(matches!(
            SessionConfig::load(&path),
            Err(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SessionConfig::filename());
        std::fs::write(&path, "[storage]\nkey_prefix = \"sa.\"\n\n[history]\nmax_entries = 7\n")
            .unwrap();

        // Single test owns the variable; set and unset run in sequence.
        std::env::set_var(CONFIG_ENV_VAR, &path);
        let config = SessionConfig::from_env().unwrap();
        assert_eq!(config.storage.key_prefix, "sa.");
        assert_eq!(config.history.max_entries, 7);
        assert_eq!(config.auth, AuthConfig::default());

        std::env::remove_var(CONFIG_ENV_VAR);
        assert_eq!(SessionConfig::from_env().unwrap(), SessionConfig::default());
    }
}
