//! Injected collaborators: the persistent key-value store and its
//! cross-instance change feed.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is shared by every running instance of the application. Writes
//! are last-writer-wins and unsynchronized. The change feed tells an instance
//! that *another* instance modified the store; it never echoes an instance's
//! own writes back to it.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::sync::Arc;

use crate::error::StorageError;

/// Persistent string key-value store (`localStorage` contract).
pub trait Storage: Send + Sync {
    /// Read the raw text stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the store cannot be reached.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous text.
    ///
    /// # Errors
    ///
    /// Returns an error when the store is unreachable, full, or refuses the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Callback invoked with the changed key, or `None` when the whole store was cleared.
pub type Listener = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Broadcast channel for store modifications made by other instances.
pub trait ChangeFeed: Send + Sync {
    /// Register `listener` until the returned guard is dropped.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Scoped listener registration. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A guard with nothing to release.
    pub fn inert() -> Self {
        Self { release: None }
    }

    /// Unregister now instead of at drop.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// `true` when a notification for `changed` concerns `key`.
///
/// A `None` key means the store was cleared, which touches every key.
pub(crate) fn affects(changed: Option<&str>, key: &str) -> bool {
    changed.is_none_or(|changed| changed == key)
}
