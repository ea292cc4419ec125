//! Iteration Tests
//!
//! `for_each` visits every entry once in key order, and stops at the first
//! callback failure.

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

async fn fill(store: &Store, n: usize) {
    for i in 0..n {
        store.set(format!("key{:03}", i), i as i64);
    }
    store.tail().await.unwrap();
}

#[tokio::test]
async fn test_visits_every_entry_once() {
    let (store, _) = create_store();
    fill(&store, 25).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store
        .for_each(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 25);
}

#[tokio::test]
async fn test_callback_receives_value_and_key_in_order() {
    let (store, _) = create_store();
    store.set("b", 2i64);
    store.set("a", 1i64);
    store.set("c", 3i64);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store
        .for_each(move |value, key| {
            sink.lock().unwrap().push((key.to_string(), value.clone()));
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("a".to_string(), Value::Int(1)),
            ("b".to_string(), Value::Int(2)),
            ("c".to_string(), Value::Int(3)),
        ]
    );
}

#[tokio::test]
async fn test_stops_at_kth_failure() {
    let (store, _) = create_store();
    fill(&store, 10).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let err = store
        .for_each(move |_, key| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 4 {
                anyhow::bail!("refusing {}", key);
            }
            Ok(())
        })
        .await
        .unwrap_err();

    assert!(err.is_visit());
    assert_eq!(
        err.visit_error().map(|e| e.to_string()),
        Some("refusing key003".to_string())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_empty_store_never_calls_back() {
    let (store, _) = create_store();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    store
        .for_each(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_callback_state_lives_in_closure() {
    let (store, _) = create_store();
    for (k, v) in [("a", 2i64), ("b", 3), ("c", 5)] {
        store.set(k, v);
    }

    let total = Arc::new(Mutex::new(0i64));
    let sum = Arc::clone(&total);
    store
        .for_each(move |value, _| {
            let n = value
                .as_int()
                .ok_or_else(|| anyhow::anyhow!("not an int"))?;
            *sum.lock().unwrap() += n;
            Ok(())
        })
        .await
        .unwrap();

    assert_eq!(*total.lock().unwrap(), 10);
}

#[tokio::test]
async fn test_cursor_failure_is_primitive_not_visit() {
    let (store, engine) = create_store();
    fill(&store, 3).await;

    engine.fail_next(RequestKind::Advance, "cursor lost");
    let err = store.for_each(|_, _| Ok(())).await.unwrap_err();
    assert!(err.is_primitive());
    assert!(!err.is_visit());
}
