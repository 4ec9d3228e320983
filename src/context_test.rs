use super::*;
use crate::memory::MemoryStorage;

#[test]
fn provided_memory_backend_is_resolved() {
    let store = MemoryStorage::new();
    store.set_item("count", "3").unwrap();
    let owner = Owner::new();
    owner.with(|| {
        provide_storage(StorageContext::memory(store.instance()));
        let ctx = use_storage();
        assert_eq!(ctx.storage().get_item("count").unwrap().as_deref(), Some("3"));
    });
}

#[test]
fn child_owner_sees_parent_backend() {
    let store = MemoryStorage::new();
    store.set_item("count", "9").unwrap();
    let parent = Owner::new();
    parent.with(|| {
        provide_storage(StorageContext::memory(store.instance()));
        let child = parent.child();
        child.with(|| {
            let ctx = use_storage();
            assert_eq!(ctx.storage().get_item("count").unwrap().as_deref(), Some("9"));
        });
    });
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn missing_context_falls_back_to_inert_browser_backend() {
    let owner = Owner::new();
    owner.with(|| {
        let ctx = use_storage();
        ctx.storage().set_item("count", "1").unwrap();
        assert_eq!(ctx.storage().get_item("count").unwrap(), None);
    });
}

#[test]
fn memory_context_feed_reaches_other_instances() {
    let store = MemoryStorage::new();
    let a = StorageContext::memory(store.instance());
    let b = StorageContext::memory(store.instance());
    let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = hits.clone();
    let _sub = b.changes().subscribe(std::sync::Arc::new(move |_key: Option<&str>| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }));

    a.storage().set_item("count", "1").unwrap();

    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
}
