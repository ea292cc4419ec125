//! Ordered object stores
//!
//! Each database holds a set of named object stores. A store is a
//! `BTreeMap` from key to MessagePack-encoded value, so cursors walk keys in
//! order and every read decodes an independent copy of the stored value.

use serialstore_core::{Key, Value};
use serialstore_engine::{EngineError, EngineResult};
use std::collections::BTreeMap;
use std::ops::Bound;

/// One named, ordered object store.
#[derive(Debug, Clone, Default)]
pub(crate) struct ObjectStore {
    data: BTreeMap<Key, Vec<u8>>,
}

impl ObjectStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &str) -> EngineResult<Option<Value>> {
        self.data.get(key).map(|bytes| decode(bytes)).transpose()
    }

    pub(crate) fn put(&mut self, key: &str, value: &Value) -> EngineResult<()> {
        let bytes = encode(value)?;
        self.data.insert(key.to_string(), bytes);
        Ok(())
    }

    /// Store bytes as-is, bypassing encoding.
    pub(crate) fn put_raw(&mut self, key: &str, bytes: Vec<u8>) {
        self.data.insert(key.to_string(), bytes);
    }

    pub(crate) fn delete(&mut self, key: &str) {
        self.data.remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// First entry strictly after `after`, or the first entry overall.
    pub(crate) fn next_after(&self, after: Option<&str>) -> EngineResult<Option<(Key, Value)>> {
        let lower = match after {
            Some(k) => Bound::Excluded(k),
            None => Bound::Unbounded,
        };
        match self
            .data
            .range::<str, _>((lower, Bound::Unbounded))
            .next()
        {
            Some((k, bytes)) => Ok(Some((k.clone(), decode(bytes)?))),
            None => Ok(None),
        }
    }
}

fn encode(value: &Value) -> EngineResult<Vec<u8>> {
    rmp_serde::to_vec(value).map_err(|e| EngineError::Encoding(e.to_string()))
}

fn decode(bytes: &[u8]) -> EngineResult<Value> {
    rmp_serde::from_slice(bytes).map_err(|e| EngineError::Encoding(e.to_string()))
}
