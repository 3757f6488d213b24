//! # Versioned blob envelope
//!
//! Every persisted value is stored as JSON wrapped in a small envelope:
//!
//! ```json
//! {"version": 1, "data": <payload>}
//! ```
//!
//! Decoding rules:
//!
//! - an envelope with `version <= SCHEMA_VERSION` decodes `data`;
//! - an envelope from a newer schema is rejected with
//!   [`StoreError::UnsupportedVersion`] so the caller can leave it untouched;
//! - anything else is treated as a legacy, unversioned payload and decoded
//!   directly. The next write upgrades it to an envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u32,
    pub data: T,
}

impl<T> Versioned<T> {
    pub fn current(data: T) -> Self {
        Self {
            version: SCHEMA_VERSION,
            data,
        }
    }
}

/// Encode `value` as a current-version envelope.
pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(&Versioned::current(value)).map_err(|source| StoreError::Serialize {
        key: key.to_string(),
        source,
    })
}

/// Decode an envelope or a legacy bare payload.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, StoreError> {
    let deserialize_err = |source| StoreError::Deserialize {
        key: key.to_string(),
        source,
    };

    let value: Value = serde_json::from_str(raw).map_err(deserialize_err)?;

    let payload = match envelope_version(&value) {
        Some(found) if found > SCHEMA_VERSION => {
            return Err(StoreError::UnsupportedVersion {
                key: key.to_string(),
                found,
                supported: SCHEMA_VERSION,
            });
        }
        Some(_) => match value {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            other => other,
        },
        None => {
            tracing::debug!(key, "decoding legacy unversioned blob");
            value
        }
    };

    serde_json::from_value(payload).map_err(deserialize_err)
}

/// The envelope version, if `value` is shaped like an envelope.
fn envelope_version(value: &Value) -> Option<u32> {
    let map = value.as_object()?;
    if map.len() != 2 || !map.contains_key("data") {
        return None;
    }
    map.get("version")?.as_u64().and_then(|v| u32::try_from(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        query: String,
        #[serde(default)]
        hits: u32,
    }

    #[test]
    fn test_encode_wraps_payload() {
        let raw = encode("k", &vec![1, 2, 3]).unwrap();
        assert_eq!(raw, r#"{"version":1,"data":[1,2,3]}"#);
    }

    #[test]
    fn test_decode_current_envelope() {
        let entries: Vec<Entry> =
            decode("k", r#"{"version":1,"data":[{"query":"slack","hits":3}]}"#).unwrap();
        assert_eq!(
            entries,
            vec![Entry {
                query: "slack".into(),
                hits: 3
            }]
        );
    }

    #[test]
    fn test_decode_legacy_bare_payload() {
        let entries: Vec<Entry> = decode("k", r#"[{"query":"zoom"}]"#).unwrap();
        assert_eq!(entries[0].query, "zoom");
        assert_eq!(entries[0].hits, 0);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let entries: Vec<Entry> = decode(
            "k",
            r#"{"version":1,"data":[{"query":"jira","hits":1,"addedLater":true}]}"#,
        )
        .unwrap();
        assert_eq!(entries[0].hits, 1);
    }

    #[test]
    fn test_decode_rejects_newer_version() {
        let err = decode::<Vec<Entry>>("history", r#"{"version":7,"data":[]}"#).unwrap_err();
        match err {
            StoreError::UnsupportedVersion {
                key,
                found,
                supported,
            } => {
                assert_eq!(key, "history");
                assert_eq!(found, 7);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_corrupt_input() {
        let err = decode::<Vec<Entry>>("k", "{not json").unwrap_err();
        assert!(matches!(err, StoreError::Deserialize { .. }));
    }
}
