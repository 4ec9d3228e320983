//! Storage-backed signal scoped to one instance.
//!
//! DESIGN
//! ======
//! The value is resolved once at creation: the stored entry when it holds
//! non-null JSON, the caller's default otherwise. From then on each setter
//! call commits to the signal first and writes the entry immediately after,
//! inside the same call, so writes are never coalesced or reordered.
//!
//! Other instances writing the same key are not observed here; use
//! [`crate::synced`] for that.

#[cfg(test)]
#[path = "local_test.rs"]
mod local_test;

use std::sync::Arc;

use leptos::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::context::{StorageContext, use_storage};
use crate::error::StorageError;
use crate::storage::Storage;

/// Create a storage-backed signal for `key` using the context backend.
///
/// `initial` is only called when nothing usable is stored. Pass `|| value`
/// for a literal default.
///
/// # Errors
///
/// Fails when the stored entry is not valid JSON for `T`, or when the store
/// cannot be read or the resolved value cannot be written back.
pub fn use_local_state<T>(
    initial: impl FnOnce() -> T,
    key: impl Into<String>,
) -> Result<(ReadSignal<T>, LocalSetter<T>), StorageError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    use_local_state_in(&use_storage(), initial, key)
}

/// [`use_local_state`] against an explicit backend.
///
/// # Errors
///
/// See [`use_local_state`].
pub fn use_local_state_in<T>(
    ctx: &StorageContext,
    initial: impl FnOnce() -> T,
    key: impl Into<String>,
) -> Result<(ReadSignal<T>, LocalSetter<T>), StorageError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let key: Arc<str> = key.into().into();
    let value = resolve(ctx.storage(), &key, initial)?;
    codec::save(ctx.storage(), &key, &value)?;

    let signal = RwSignal::new(value);
    let setter = LocalSetter {
        key,
        storage: ctx.storage_handle(),
        signal,
    };
    Ok((signal.read_only(), setter))
}

/// Stored value for `key`, or `initial()` when the entry is missing or `null`.
pub(crate) fn resolve<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
    initial: impl FnOnce() -> T,
) -> Result<T, StorageError> {
    if let Some(value) = codec::load(storage, key)? {
        tracing::debug!(key, "restored local state from storage");
        return Ok(value);
    }
    tracing::debug!(key, "no stored local state; using initial value");
    Ok(initial())
}

/// Write half of a local state. Every call persists the new value.
pub struct LocalSetter<T: Send + Sync + 'static> {
    key: Arc<str>,
    storage: Arc<dyn Storage>,
    signal: RwSignal<T>,
}

impl<T> LocalSetter<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Replace the value and write it back.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the write-back fails. The signal keeps
    /// the new value either way.
    pub fn set(&self, value: T) -> Result<(), StorageError> {
        self.signal.set(value);
        self.write_back()
    }

    /// Derive the next value from the current one and write it back.
    ///
    /// # Errors
    ///
    /// See [`LocalSetter::set`].
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<(), StorageError> {
        // Disposed owner: nothing left to update.
        let Some(next) = self.signal.try_with_untracked(f) else {
            return Ok(());
        };
        self.set(next)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn write_back(&self) -> Result<(), StorageError> {
        self.signal
            .try_with_untracked(|value| codec::save(self.storage.as_ref(), &self.key, value))
            .unwrap_or(Ok(()))
    }
}

impl<T: Send + Sync + 'static> Clone for LocalSetter<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            storage: self.storage.clone(),
            signal: self.signal,
        }
    }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for LocalSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSetter").field("key", &self.key).finish_non_exhaustive()
    }
}
