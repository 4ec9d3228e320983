//! Browser `window.localStorage` backend and `storage` event feed.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only the `hydrate` build talks to web-sys. Elsewhere (SSR, native tests)
//! both types are deterministic no-ops: reads find nothing, writes are
//! accepted and dropped, and subscriptions never fire.
//!
//! TRADE-OFFS
//! ==========
//! JS closures are not `Send`, so registered listeners live in a
//! thread-local table and the [`Subscription`] guard only carries their id.

#[cfg(test)]
#[path = "browser_test.rs"]
mod browser_test;

use crate::error::StorageError;
use crate::storage::{ChangeFeed, Listener, Storage, Subscription};

/// `window.localStorage`, looked up on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

/// The window's `storage` event, fired for writes made by other tabs.
#[derive(Clone, Copy, Debug, Default)]
pub struct StorageEvents;

#[cfg(feature = "hydrate")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}

#[cfg(feature = "hydrate")]
fn is_quota_error(err: &wasm_bindgen::JsValue) -> bool {
    use wasm_bindgen::JsCast;
    err.dyn_ref::<web_sys::DomException>()
        .is_some_and(|e| e.name() == "QuotaExceededError")
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?
                .get_item(key)
                .map_err(|_| StorageError::Unavailable)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Ok(None)
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.set_item(key, value).map_err(|err| {
                if is_quota_error(&err) {
                    StorageError::QuotaExceeded { key: key.to_owned() }
                } else {
                    StorageError::Rejected {
                        key: key.to_owned(),
                        reason: format!("{err:?}"),
                    }
                }
            })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }
}

#[cfg(feature = "hydrate")]
mod listeners {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;

    use crate::storage::Listener;

    type Callback = Closure<dyn FnMut(web_sys::StorageEvent)>;

    thread_local! {
        static REGISTERED: RefCell<HashMap<u64, Callback>> = RefCell::new(HashMap::new());
        static NEXT_ID: Cell<u64> = const { Cell::new(0) };
    }

    /// Attach `listener` to the window `storage` event. `None` without a window.
    pub(super) fn register(listener: Listener) -> Option<u64> {
        let window = web_sys::window()?;
        let callback = Callback::new(move |event: web_sys::StorageEvent| {
            listener(event.key().as_deref());
        });
        if let Err(err) =
            window.add_event_listener_with_callback("storage", callback.as_ref().unchecked_ref())
        {
            tracing::warn!(error = ?err, "failed to attach storage listener");
            return None;
        }
        let id = NEXT_ID.with(|next| {
            let id = next.get() + 1;
            next.set(id);
            id
        });
        REGISTERED.with(|map| map.borrow_mut().insert(id, callback));
        Some(id)
    }

    pub(super) fn unregister(id: u64) {
        let Some(callback) = REGISTERED.with(|map| map.borrow_mut().remove(&id)) else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window
                .remove_event_listener_with_callback("storage", callback.as_ref().unchecked_ref());
        }
    }
}

impl ChangeFeed for StorageEvents {
    fn subscribe(&self, listener: Listener) -> Subscription {
        #[cfg(feature = "hydrate")]
        {
            match listeners::register(listener) {
                Some(id) => Subscription::new(move || listeners::unregister(id)),
                None => Subscription::inert(),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            drop(listener);
            Subscription::inert()
        }
    }
}
