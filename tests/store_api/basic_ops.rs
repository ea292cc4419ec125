//! Basic Store Operations Tests
//!
//! Tests for get, set, has, delete, clear, count and keys.

use crate::*;

// =============================================================================
// GET / SET TESTS
// =============================================================================

#[tokio::test]
async fn test_set_and_get_roundtrip() {
    let (store, _) = create_store();

    store.set("key1", 42i64).await.unwrap();
    assert_eq!(store.get("key1").await.unwrap(), Some(Value::Int(42)));
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let (store, _) = create_store();
    assert_eq!(store.get("nonexistent").await.unwrap(), None);
}

#[tokio::test]
async fn test_standard_values_roundtrip() {
    let (store, _) = create_store();

    for (key, value) in standard_test_values() {
        store.set(key, value);
    }
    for (key, value) in standard_test_values() {
        assert_eq!(store.get(key).await.unwrap(), Some(value), "key {}", key);
    }
}

#[tokio::test]
async fn test_composite_value_roundtrip() {
    let (store, _) = create_store();
    let original = composite_value();

    store.set("person", original.clone()).await.unwrap();
    let loaded = store.get("person").await.unwrap().unwrap();

    assert_eq!(loaded, original);
    assert_eq!(
        loaded.get_field("address").and_then(|a| a.get_field("zip")),
        Some(&Value::Int(1100))
    );
}

#[tokio::test]
async fn test_set_overwrites() {
    let (store, _) = create_store();
    store.set("k", "first");
    store.set("k", "second");
    assert_eq!(store.get("k").await.unwrap(), Some(Value::from("second")));
    assert_eq!(store.count().await.unwrap(), 1);
}

// =============================================================================
// HAS / COUNT TESTS
// =============================================================================

#[tokio::test]
async fn test_has_and_count_after_clear_and_set() {
    let (store, _) = create_store();
    store.set("stale", true);

    store.clear();
    store.set("a", 1i64);
    let has_a = store.has("a");
    let count = store.count();
    let has_b = store.has("b");

    assert!(has_a.await.unwrap());
    assert_eq!(count.await.unwrap(), 1);
    assert!(!has_b.await.unwrap());
}

#[tokio::test]
async fn test_has_is_true_for_null_value() {
    let (store, _) = create_store();
    store.set("nothing", Value::Null).await.unwrap();
    assert!(store.has("nothing").await.unwrap());
}

// =============================================================================
// DELETE / CLEAR TESTS
// =============================================================================

#[tokio::test]
async fn test_delete_removes_key() {
    let (store, _) = create_store();
    store.set("a", 1i64);
    store.set("b", 2i64);
    store.delete("a").await.unwrap();

    assert!(!store.has("a").await.unwrap());
    assert_eq!(store.keys().await.unwrap(), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_delete_missing_key_succeeds() {
    let (store, _) = create_store();
    store.delete("ghost").await.unwrap();
}

#[tokio::test]
async fn test_clear_on_empty_store_is_idempotent() {
    let (store, _) = create_store();
    store.clear().await.unwrap();
    store.clear().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_set_has_scenario() {
    let (store, _) = create_store();

    let r1 = store.clear();
    let r2 = store.set("x", "1");
    let r3 = store.has("x");
    let r4 = store.clear();
    let r5 = store.has("x");

    r1.await.unwrap();
    r2.await.unwrap();
    assert!(r3.await.unwrap());
    r4.await.unwrap();
    assert!(!r5.await.unwrap());
}

// =============================================================================
// KEYS TESTS
// =============================================================================

#[tokio::test]
async fn test_keys_sorted() {
    let (store, _) = create_store();
    for key in ["pear", "apple", "fig"] {
        store.set(key, key);
    }
    assert_eq!(store.keys().await.unwrap(), vec!["apple", "fig", "pear"]);
}

#[tokio::test]
async fn test_keys_on_empty_store() {
    let (store, _) = create_store();
    assert!(store.keys().await.unwrap().is_empty());
}
