//! Connection and Session Lifecycle Tests
//!
//! Covers the single memoized open, session reuse, and recovery from
//! sessions the engine ended on its own.

use crate::*;
use serialstore::{ConnectionState, Error};

// =============================================================================
// CONNECTION GATE
// =============================================================================

#[tokio::test]
async fn test_engine_opened_lazily_and_once() {
    let (store, engine) = create_store();
    assert_eq!(store.connection_state(), ConnectionState::Unopened);
    assert_eq!(engine.stats().opens, 0);

    store.set("a", 1i64);
    store.get("a");
    store.count().await.unwrap();

    assert_eq!(store.connection_state(), ConnectionState::Ready);
    assert_eq!(engine.stats().opens, 1);
    assert_eq!(engine.database_version(DB), Some(1));
}

#[tokio::test]
async fn test_open_failure_is_memoized_for_every_operation() {
    let engine = MemoryEngine::new();
    engine.fail_next(RequestKind::Open, "blocked by another connection");
    let store = builder(&engine).open().unwrap();

    let get_err = store.get("a").await.unwrap_err();
    assert!(get_err.is_open_failure());

    let set_err = store.set("a", 1i64).await.unwrap_err();
    let ready_err = store.ready().await.unwrap_err();
    assert_eq!(set_err.to_string(), get_err.to_string());
    assert_eq!(ready_err.to_string(), get_err.to_string());

    // The fault was one-shot; a retry would have succeeded
    assert_eq!(engine.stats().opens, 1);
    assert_eq!(store.connection_state(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_open_failure_reaches_queued_handles() {
    let engine = MemoryEngine::new();
    engine.fail_next(RequestKind::Open, "nope");
    let store = builder(&engine).open().unwrap();

    let handles = vec![store.clear(), store.set("k", "v"), store.delete("k")];
    for result in futures::future::join_all(handles).await {
        assert!(matches!(result, Err(Error::OpenFailure { .. })));
    }
    assert_eq!(store.metrics().failed, 3);
}

#[tokio::test]
async fn test_newer_database_version_is_adopted() {
    let engine = MemoryEngine::new();
    let newer = builder(&engine).version(5).open().unwrap();
    newer.set("k", "v").await.unwrap();

    let store = builder(&engine).version(2).open().unwrap();
    assert_eq!(store.get("k").await.unwrap(), Some(Value::from("v")));
    assert_eq!(store.connection_state(), ConnectionState::Ready);
    assert_eq!(engine.database_version(DB), Some(5));
}

#[tokio::test]
async fn test_unavailable_engine_refuses_store() {
    let engine = MemoryEngine::unavailable();
    let err = builder(&engine).open().unwrap_err();
    assert!(matches!(err, Error::Unavailable(_)));
    assert!(engine.requests().is_empty());
}

#[tokio::test]
async fn test_second_object_store_is_provisioned() {
    let engine = MemoryEngine::new();
    let first = builder(&engine).open().unwrap();
    first.set("shared", "first").await.unwrap();

    let second = builder(&engine).store_name("other").open().unwrap();
    second.set("shared", "second").await.unwrap();

    assert_eq!(engine.database_version(DB), Some(2));
    assert_eq!(second.get("shared").await.unwrap(), Some(Value::from("second")));
    assert_eq!(first.get("shared").await.unwrap(), Some(Value::from("first")));
}

#[tokio::test]
async fn test_original_config_reopens_after_store_provisioning() {
    let engine = MemoryEngine::new();
    let first = builder(&engine).open().unwrap();
    first.set("k", "v").await.unwrap();

    let other = builder(&engine).store_name("other").open().unwrap();
    other.set("k", "other").await.unwrap();
    drop(first);
    assert_eq!(engine.database_version(DB), Some(2));

    let reopened = builder(&engine).open().unwrap();
    assert_eq!(reopened.get("k").await.unwrap(), Some(Value::from("v")));
    assert_eq!(reopened.connection_state(), ConnectionState::Ready);
    assert_eq!(engine.database_version(DB), Some(2));
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

#[tokio::test]
async fn test_consecutive_operations_share_one_session() {
    let (store, engine) = create_store();
    for i in 0..10 {
        store.set(format!("k{}", i), i as i64);
    }
    store.count().await.unwrap();

    assert_eq!(engine.stats().sessions_begun, 1);
    let metrics = store.metrics();
    assert_eq!(metrics.sessions_opened, 1);
    assert_eq!(metrics.sessions_reused, 10);
}

#[tokio::test]
async fn test_completed_sessions_are_replaced() {
    let (store, engine) = create_store_with(MemoryEngineConfig {
        auto_complete_after: Some(2),
        ..MemoryEngineConfig::default()
    });

    for i in 0..6 {
        store.set(format!("k{}", i), i as i64);
    }
    assert_eq!(store.count().await.unwrap(), 6);

    // Two requests per session, seven requests in total
    assert_eq!(engine.stats().sessions_begun, 4);
    assert_eq!(store.metrics().stale_sessions, 0);
}

#[tokio::test]
async fn test_aborted_session_is_replaced() {
    let (store, engine) = create_store();
    store.set("a", 1i64).await.unwrap();

    engine.abort_sessions();
    assert_eq!(store.get("a").await.unwrap(), Some(Value::Int(1)));

    let metrics = store.metrics();
    assert_eq!(metrics.sessions_opened, 2);
    assert_eq!(metrics.sessions_ended, 1);
    assert_eq!(engine.live_sessions(), 1);
}

#[tokio::test]
async fn test_silently_stale_session_is_discarded() {
    let (store, engine) = create_store();
    store.set("a", 1i64).await.unwrap();

    engine.expire_sessions_silently();
    assert_eq!(store.get("a").await.unwrap(), Some(Value::Int(1)));

    let metrics = store.metrics();
    assert_eq!(metrics.stale_sessions, 1);
    assert_eq!(metrics.sessions_opened, 2);
}

#[tokio::test]
async fn test_without_probe_stale_session_fails_once() {
    let engine = MemoryEngine::new();
    let store = builder(&engine).probe_before_reuse(false).open().unwrap();
    store.set("a", 1i64).await.unwrap();

    engine.expire_sessions_silently();
    let err = store.get("a").await.unwrap_err();
    assert!(err.is_session_inactive());

    // The failed request invalidated the cached session
    assert_eq!(store.get("a").await.unwrap(), Some(Value::Int(1)));
    assert_eq!(store.metrics().stale_sessions, 0);
}

#[tokio::test]
async fn test_dropping_store_drains_queued_operations() {
    let (store, engine) = create_store();
    let pending = store.set("late", "write");
    drop(store);

    pending.await.unwrap();
    assert_eq!(put_keys(&engine), vec!["late"]);
}

#[tokio::test]
async fn test_settle_delay_is_honoured() {
    let engine = MemoryEngine::new();
    let store = builder(&engine)
        .settle_delay(std::time::Duration::from_millis(5))
        .open()
        .unwrap();

    let started = std::time::Instant::now();
    store.set("a", 1i64);
    store.set("b", 2i64);
    store.count().await.unwrap();

    // Two settle pauses precede the count
    assert!(started.elapsed() >= std::time::Duration::from_millis(10));
}
