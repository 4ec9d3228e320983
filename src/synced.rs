//! Storage-backed signal that follows writes made by other instances.
//!
//! DESIGN
//! ======
//! Creation and the setter behave exactly like [`crate::local`]. In
//! addition, a change-feed listener is registered for the lifetime of the
//! current reactive owner. A notification for this key (or a full clear)
//! re-reads the entry, because the feed carries no value:
//!
//! - entry present: the signal becomes `Some(decoded)`;
//! - entry absent: the signal becomes `None`. The initial value is *not*
//!   re-resolved, so `None` is only ever seen after an external delete.
//!
//! External values are not written back; the entry already holds them.
//!
//! The feed never reports an instance's own writes, so the setter and the
//! listener never both react to the same write. Within an instance, the last
//! applied of the two wins.

#[cfg(test)]
#[path = "synced_test.rs"]
mod synced_test;

use std::sync::Arc;

use leptos::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::context::{StorageContext, use_storage};
use crate::error::StorageError;
use crate::local::resolve;
use crate::storage::{Storage, affects};

/// Create a cross-instance synced, storage-backed signal for `key` using the
/// context backend.
///
/// Must be called under a reactive owner (inside a component); the change
/// listener is released when that owner is cleaned up.
///
/// # Errors
///
/// Same as [`crate::use_local_state`].
pub fn use_synced_local_state<T>(
    initial: impl FnOnce() -> T,
    key: impl Into<String>,
) -> Result<(ReadSignal<Option<T>>, SyncedSetter<T>), StorageError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    use_synced_local_state_in(&use_storage(), initial, key)
}

/// [`use_synced_local_state`] against an explicit backend.
///
/// # Errors
///
/// Same as [`crate::use_local_state`].
pub fn use_synced_local_state_in<T>(
    ctx: &StorageContext,
    initial: impl FnOnce() -> T,
    key: impl Into<String>,
) -> Result<(ReadSignal<Option<T>>, SyncedSetter<T>), StorageError>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let key: Arc<str> = key.into().into();
    let value = resolve(ctx.storage(), &key, initial)?;
    codec::save(ctx.storage(), &key, &value)?;

    let signal = RwSignal::new(Some(value));
    let storage = ctx.storage_handle();

    let listener_key = key.clone();
    let listener_storage = storage.clone();
    let subscription = ctx.changes().subscribe(Arc::new(move |changed: Option<&str>| {
        if affects(changed, &listener_key) {
            apply_external(listener_storage.as_ref(), &listener_key, signal);
        }
    }));

    if Owner::current().is_none() {
        tracing::warn!(key = %key, "synced local state created without a reactive owner; listener released immediately");
    }
    on_cleanup(move || drop(subscription));

    let setter = SyncedSetter {
        key,
        storage,
        signal,
    };
    Ok((signal.read_only(), setter))
}

fn apply_external<T>(storage: &dyn Storage, key: &str, signal: RwSignal<Option<T>>)
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    match codec::load::<T>(storage, key) {
        Ok(value) => {
            tracing::debug!(key, present = value.is_some(), "applied external storage change");
            signal.set(value);
        }
        Err(e) => {
            tracing::error!(key, error = %e, "ignoring unreadable external storage change");
        }
    }
}

/// Write half of a synced local state.
pub struct SyncedSetter<T: Send + Sync + 'static> {
    key: Arc<str>,
    storage: Arc<dyn Storage>,
    signal: RwSignal<Option<T>>,
}

impl<T> SyncedSetter<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Replace the value and write it back; other instances are notified by the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the write-back fails. The signal keeps
    /// the new value either way.
    pub fn set(&self, value: T) -> Result<(), StorageError> {
        self.signal.set(Some(value));
        self.write_back()
    }

    /// Derive the next value from the current one, which is `None` after an
    /// external delete.
    ///
    /// # Errors
    ///
    /// See [`SyncedSetter::set`].
    pub fn update(&self, f: impl FnOnce(Option<&T>) -> T) -> Result<(), StorageError> {
        let Some(next) = self.signal.try_with_untracked(|prev| f(prev.as_ref())) else {
            return Ok(());
        };
        self.set(next)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn write_back(&self) -> Result<(), StorageError> {
        self.signal
            .try_with_untracked(|value| match value {
                Some(value) => codec::save(self.storage.as_ref(), &self.key, value),
                None => Ok(()),
            })
            .unwrap_or(Ok(()))
    }
}

impl<T: Send + Sync + 'static> Clone for SyncedSetter<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            storage: self.storage.clone(),
            signal: self.signal,
        }
    }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for SyncedSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncedSetter").field("key", &self.key).finish_non_exhaustive()
    }
}
