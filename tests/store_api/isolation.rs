//! Failure Isolation Tests
//!
//! A failed operation reports to its own handle only; later operations run
//! and succeed normally.

use crate::*;
use serialstore::{Error, OperationKind};

#[tokio::test]
async fn test_malformed_entry_get_does_not_block_later_set() {
    let (store, engine) = create_store();
    store.ready().await.unwrap();
    engine.write_raw(DB, STORE, "broken", vec![0xc1]).unwrap();

    let bad = store.get("broken");
    let set = store.set("fine", "yes");
    let get = store.get("fine");

    assert!(matches!(bad.await, Err(Error::Serialization(_))));
    set.await.unwrap();
    assert_eq!(get.await.unwrap(), Some(Value::from("yes")));
}

#[tokio::test]
async fn test_primitive_failure_reports_operation_kind() {
    let (store, engine) = create_store();
    engine.fail_next(RequestKind::Put, "quota exceeded");

    let err = store.set("k", "v").await.unwrap_err();
    match err {
        Error::Primitive { kind, reason } => {
            assert_eq!(kind, OperationKind::Set);
            assert!(reason.contains("quota exceeded"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!store.has("k").await.unwrap());
}

#[tokio::test]
async fn test_failure_in_middle_of_batch() {
    let (store, engine) = create_store();
    engine.fail_next(RequestKind::Delete, "locked");

    let handles = vec![
        store.set("a", 1i64),
        store.delete("a"),
        store.set("b", 2i64),
    ];
    let results = futures::future::join_all(handles).await;

    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_failed_session_is_replaced_for_next_operation() {
    let (store, engine) = create_store();
    store.set("a", 1i64).await.unwrap();

    // The fault ends the session with an error
    engine.fail_next(RequestKind::Count, "io");
    assert!(store.count().await.is_err());

    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(store.metrics().sessions_opened, 2);
    assert_eq!(store.metrics().sessions_ended, 1);
}

#[tokio::test]
async fn test_each_caller_gets_own_result() {
    let (store, engine) = create_store();
    store.set("x", 1i64).await.unwrap();

    engine.fail_next(RequestKind::Get, "flaky");
    let failing = store.get("x");
    let passing = store.get("x");

    assert!(passing.await.unwrap().is_some());
    assert!(failing.await.is_err());
}
