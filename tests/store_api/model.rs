//! Model-Based Property Tests
//!
//! Random operation sequences are submitted without awaiting, then every
//! handle is compared against a sequential `BTreeMap` model. Any reordering
//! or cross-talk between handles shows up as a mismatch.

use crate::*;
use proptest::prelude::*;
use serialstore::ResultHandle;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    Set(String, i64),
    Get(String),
    Delete(String),
    Has(String),
    Count,
    Clear,
    Keys,
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(str::to_string)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| Op::Set(k, v)),
        3 => key_strategy().prop_map(Op::Get),
        2 => key_strategy().prop_map(Op::Delete),
        2 => key_strategy().prop_map(Op::Has),
        1 => Just(Op::Count),
        1 => Just(Op::Clear),
        1 => Just(Op::Keys),
    ]
}

enum Pending {
    Unit(ResultHandle<()>),
    Value(ResultHandle<Option<Value>>),
    Bool(ResultHandle<bool>),
    Count(ResultHandle<u64>),
    Keys(ResultHandle<Vec<String>>),
}

#[derive(Debug, PartialEq)]
enum Observed {
    Unit,
    Value(Option<Value>),
    Bool(bool),
    Count(u64),
    Keys(Vec<String>),
}

fn expected(model: &mut BTreeMap<String, i64>, op: &Op) -> Observed {
    match op {
        Op::Set(k, v) => {
            model.insert(k.clone(), *v);
            Observed::Unit
        }
        Op::Get(k) => Observed::Value(model.get(k).map(|v| Value::Int(*v))),
        Op::Delete(k) => {
            model.remove(k);
            Observed::Unit
        }
        Op::Has(k) => Observed::Bool(model.contains_key(k)),
        Op::Count => Observed::Count(model.len() as u64),
        Op::Clear => {
            model.clear();
            Observed::Unit
        }
        Op::Keys => Observed::Keys(model.keys().cloned().collect()),
    }
}

fn submit(store: &Store, op: &Op) -> Pending {
    match op {
        Op::Set(k, v) => Pending::Unit(store.set(k.clone(), *v)),
        Op::Get(k) => Pending::Value(store.get(k.clone())),
        Op::Delete(k) => Pending::Unit(store.delete(k.clone())),
        Op::Has(k) => Pending::Bool(store.has(k.clone())),
        Op::Count => Pending::Count(store.count()),
        Op::Clear => Pending::Unit(store.clear()),
        Op::Keys => Pending::Keys(store.keys()),
    }
}

async fn resolve(pending: Pending) -> Observed {
    match pending {
        Pending::Unit(h) => h.await.map(|_| Observed::Unit),
        Pending::Value(h) => h.await.map(Observed::Value),
        Pending::Bool(h) => h.await.map(Observed::Bool),
        Pending::Count(h) => h.await.map(Observed::Count),
        Pending::Keys(h) => h.await.map(Observed::Keys),
    }
    .expect("operation failed")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_queue_matches_sequential_model(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let observed: Vec<Observed> = runtime.block_on(async {
            let (store, _) = create_store();
            let pending: Vec<_> = ops.iter().map(|op| submit(&store, op)).collect();

            // Resolve newest first to show await order is irrelevant
            let mut results = Vec::with_capacity(pending.len());
            for p in pending.into_iter().rev() {
                results.push(resolve(p).await);
            }
            results.reverse();
            results
        });

        let mut model = BTreeMap::new();
        let wanted: Vec<Observed> = ops.iter().map(|op| expected(&mut model, op)).collect();
        prop_assert_eq!(observed, wanted);
    }
}
