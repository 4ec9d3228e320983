//! JSON encoding of observed values.
//!
//! A stored `null` counts as "no value", the same as a missing entry. Any
//! other JSON, including `0`, `false` and `""`, is a real value.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StorageError;
use crate::storage::Storage;

/// Decode raw stored text for `key`. `Ok(None)` for JSON `null`.
pub(crate) fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Option<T>, StorageError> {
    let malformed = |source| StorageError::Malformed {
        key: key.to_owned(),
        source,
    };
    let value: Value = serde_json::from_str(raw).map_err(malformed)?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value).map(Some).map_err(malformed)
}

pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_owned(),
        source,
    })
}

/// Read and decode the entry for `key`.
pub(crate) fn load<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>, StorageError> {
    match storage.get_item(key)? {
        Some(raw) => decode(key, &raw),
        None => Ok(None),
    }
}

/// Encode `value` and overwrite the entry for `key`.
pub(crate) fn save<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = encode(key, value)?;
    storage.set_item(key, &raw)?;
    tracing::debug!(key, bytes = raw.len(), "wrote back local state");
    Ok(())
}
