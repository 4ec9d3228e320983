//! Leptos signals backed by `localStorage`.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components use [`use_local_state`] for a value that survives reloads, or
//! [`use_synced_local_state`] for one that also follows writes made by other
//! open tabs. The backend comes from Leptos context ([`provide_storage`]),
//! defaulting to the browser under the `hydrate` feature.
//!
//! ```ignore
//! let (count, set_count) = use_local_state(|| 0, "count")?;
//! set_count.update(|n| n + 1)?;
//! ```

pub mod browser;
mod codec;
pub mod context;
pub mod error;
pub mod local;
pub mod memory;
pub mod storage;
pub mod synced;

pub use browser::{LocalStorage, StorageEvents};
pub use context::{StorageContext, provide_storage, use_storage};
pub use error::StorageError;
pub use local::{LocalSetter, use_local_state, use_local_state_in};
pub use memory::{MemoryInstance, MemoryStorage};
pub use storage::{ChangeFeed, Listener, Storage, Subscription};
pub use synced::{SyncedSetter, use_synced_local_state, use_synced_local_state_in};
