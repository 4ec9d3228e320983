//! In-process store with browser `localStorage` notification semantics.
//!
//! DESIGN
//! ======
//! One [`MemoryStorage`] is the shared store; each [`MemoryInstance`] plays
//! the part of one running instance (one tab). A write through an instance
//! notifies every *other* instance's listeners, and a write that leaves the
//! stored text unchanged notifies nobody. Writes made directly on
//! `MemoryStorage` come from outside every instance and notify all of them.
//!
//! Listeners run after the locks are released, so they may read the store.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;
use crate::storage::{ChangeFeed, Listener, Storage, Subscription};

/// Writer id used for writes that did not come from any instance.
const EXTERNAL: u64 = 0;

#[derive(Default)]
struct Shared {
    entries: Mutex<HashMap<String, String>>,
    listeners: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
    quota: Option<usize>,
}

struct Registration {
    id: u64,
    instance: u64,
    listener: Listener,
}

/// Shared in-memory store. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
}

/// One instance's view of a [`MemoryStorage`].
#[derive(Clone)]
pub struct MemoryInstance {
    id: u64,
    shared: Arc<Shared>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl Shared {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, writer: u64, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut entries = lock(&self.entries);
            if entries.get(key).is_some_and(|current| current == value) {
                return Ok(());
            }
            if let Some(quota) = self.quota {
                let others: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                if others + key.len() + value.len() > quota {
                    return Err(StorageError::QuotaExceeded { key: key.to_owned() });
                }
            }
            entries.insert(key.to_owned(), value.to_owned());
        }
        self.notify(writer, Some(key));
        Ok(())
    }

    fn remove(&self, writer: u64, key: &str) {
        let removed = lock(&self.entries).remove(key).is_some();
        if removed {
            self.notify(writer, Some(key));
        }
    }

    fn clear(&self, writer: u64) {
        let had_entries = {
            let mut entries = lock(&self.entries);
            let had_entries = !entries.is_empty();
            entries.clear();
            had_entries
        };
        if had_entries {
            self.notify(writer, None);
        }
    }

    fn notify(&self, writer: u64, key: Option<&str>) {
        let targets: Vec<Listener> = lock(&self.listeners)
            .iter()
            .filter(|reg| reg.instance != writer)
            .map(|reg| reg.listener.clone())
            .collect();
        for listener in targets {
            listener(key);
        }
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the total of key and value lengths
    /// would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                quota: Some(bytes),
                ..Shared::default()
            }),
        }
    }

    /// Open a new instance (a new "tab") on this store.
    pub fn instance(&self) -> MemoryInstance {
        MemoryInstance {
            id: self.shared.next_id(),
            shared: self.shared.clone(),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.shared.get(key)
    }

    /// Write from outside every instance; all instances are notified.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] when the quota would be exceeded.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.shared.set(EXTERNAL, key, value)
    }

    /// Delete an entry from outside every instance.
    pub fn remove_item(&self, key: &str) {
        self.shared.remove(EXTERNAL, key);
    }

    /// Delete every entry; listeners receive a `None` key.
    pub fn clear(&self) {
        self.shared.clear(EXTERNAL);
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live subscriptions across all instances.
    pub fn listener_count(&self) -> usize {
        lock(&self.shared.listeners).len()
    }
}

impl MemoryInstance {
    /// Delete an entry as this instance; other instances are notified.
    pub fn remove_item(&self, key: &str) {
        self.shared.remove(self.id, key);
    }
}

impl Storage for MemoryInstance {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.shared.get(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.shared.set(self.id, key, value)
    }
}

impl ChangeFeed for MemoryInstance {
    fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.shared.next_id();
        lock(&self.shared.listeners).push(Registration {
            id,
            instance: self.id,
            listener,
        });
        let shared = self.shared.clone();
        Subscription::new(move || {
            lock(&shared.listeners).retain(|reg| reg.id != id);
        })
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for MemoryInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryInstance").field("id", &self.id).finish_non_exhaustive()
    }
}
