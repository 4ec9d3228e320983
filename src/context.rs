//! Storage backend resolution through Leptos context.
//!
//! DESIGN
//! ======
//! Components never name a backend. An app (or a test) provides one with
//! [`provide_storage`]; without it the browser backend is used.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::sync::Arc;

use leptos::prelude::*;

use crate::browser::{LocalStorage, StorageEvents};
use crate::memory::MemoryInstance;
use crate::storage::{ChangeFeed, Storage};

/// A store together with the change feed reporting other instances' writes to it.
#[derive(Clone)]
pub struct StorageContext {
    storage: Arc<dyn Storage>,
    changes: Arc<dyn ChangeFeed>,
}

impl StorageContext {
    pub fn new(storage: impl Storage + 'static, changes: impl ChangeFeed + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
            changes: Arc::new(changes),
        }
    }

    /// `window.localStorage` and its `storage` event.
    pub fn browser() -> Self {
        Self::new(LocalStorage, StorageEvents)
    }

    /// One in-memory instance acting as both store and feed.
    pub fn memory(instance: MemoryInstance) -> Self {
        let shared = Arc::new(instance);
        Self {
            storage: shared.clone(),
            changes: shared,
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn changes(&self) -> &dyn ChangeFeed {
        self.changes.as_ref()
    }

    pub(crate) fn storage_handle(&self) -> Arc<dyn Storage> {
        self.storage.clone()
    }
}

impl Default for StorageContext {
    fn default() -> Self {
        Self::browser()
    }
}

impl std::fmt::Debug for StorageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageContext").finish_non_exhaustive()
    }
}

/// Make `ctx` the backend for every local state created below the current owner.
pub fn provide_storage(ctx: StorageContext) {
    provide_context(ctx);
}

/// The provided backend, or the browser backend when none was provided.
pub fn use_storage() -> StorageContext {
    use_context::<StorageContext>().unwrap_or_default()
}
