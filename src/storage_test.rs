use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

// =============================================================
// Subscription
// =============================================================

#[test]
fn subscription_releases_on_drop() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let sub = Subscription::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(released.load(Ordering::SeqCst), 0);
    drop(sub);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn explicit_release_runs_exactly_once() {
    let released = Arc::new(AtomicUsize::new(0));
    let counter = released.clone();
    let sub = Subscription::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    sub.release();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn inert_subscription_drops_quietly() {
    let sub = Subscription::inert();
    assert_eq!(format!("{sub:?}"), "Subscription { active: false }");
}

// =============================================================
// affects
// =============================================================

#[test]
fn affects_matching_key_only() {
    assert!(affects(Some("count"), "count"));
    assert!(!affects(Some("theme"), "count"));
}

#[test]
fn clear_affects_every_key() {
    assert!(affects(None, "count"));
}
