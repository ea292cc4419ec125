//! Chain State Tests
//!
//! `tail()` resolves after everything called before it, and reports the
//! failure of a preceding `for_each` but never of isolated operations.

use crate::*;
use serialstore::{OperationKind, Outcome, QueueEntry};

#[tokio::test]
async fn test_tail_on_idle_store() {
    let (store, _) = create_store();
    store.tail().await.unwrap();
}

#[tokio::test]
async fn test_tail_waits_for_prior_operations() {
    let (store, _) = create_store();
    for i in 0..20 {
        store.set(format!("k{}", i), i as i64);
    }
    store.tail().await.unwrap();

    let metrics = store.metrics();
    assert_eq!(metrics.completed, 20);
    assert_eq!(metrics.pending(), 0);
}

#[tokio::test]
async fn test_isolated_failure_leaves_chain_healthy() {
    let (store, engine) = create_store();
    engine.fail_next(RequestKind::Get, "boom");

    assert!(store.get("x").await.is_err());
    store.tail().await.unwrap();
}

#[tokio::test]
async fn test_visit_failure_reaches_tail() {
    let (store, _) = create_store();
    store.set("a", 1i64);

    let visit = store.for_each(|_, _| Err(anyhow::anyhow!("bad entry")));
    let tail = store.tail();

    let visit_err = visit.await.unwrap_err();
    let tail_err = tail.await.unwrap_err();
    assert!(visit_err.is_visit());
    assert!(tail_err.is_visit());
    assert_eq!(visit_err.to_string(), tail_err.to_string());
}

#[tokio::test]
async fn test_chain_keeps_running_after_visit_failure() {
    let (store, _) = create_store();
    store.set("a", 1i64);
    store.for_each(|_, _| anyhow::bail!("stop"));
    let after = store.set("b", 2i64);
    let tail = store.tail();

    after.await.unwrap();
    tail.await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_isolation_override_on_custom_entry() {
    let (store, engine) = create_store();

    engine.fail_next(RequestKind::Count, "disk");
    let entry = QueueEntry::count().isolate_failure(false);
    assert_eq!(entry.kind(), OperationKind::Count);
    assert!(store.submit(entry).await.is_err());
    assert!(store.tail().await.is_err());

    store.set("a", 1i64);
    let visit = QueueEntry::for_each(|_, _| anyhow::bail!("ignored")).isolate_failure(true);
    assert!(store.submit(visit).await.is_err());
    store.tail().await.unwrap();
}

#[tokio::test]
async fn test_submit_returns_raw_outcome() {
    let (store, _) = create_store();
    store.set("k", "v");
    let outcome = store.submit(QueueEntry::has("k")).await.unwrap();
    assert_eq!(outcome, Outcome::Bool(true));
    let outcome = store.submit(QueueEntry::count()).await.unwrap();
    assert_eq!(outcome, Outcome::Count(1));
}
