//! Queue entries and their outcomes
//!
//! A [`QueueEntry`] is one pending storage operation: its kind, its
//! arguments, an optional visit callback, and an optional transform applied
//! to the raw outcome. Entries are built once and moved into the queue, so
//! nothing about them changes after submission.

use serialstore_core::{Error, Key, OperationKind, Result, Value};

/// Caller-supplied callback invoked with `(value, key)` for every visited entry.
///
/// Returning an error stops the iteration.
pub type VisitFn = Box<dyn FnMut(&Value, &str) -> anyhow::Result<()> + Send>;

/// Post-processing applied to a successful raw outcome.
pub type ResultTransform = fn(Outcome) -> Result<Outcome>;

/// Raw result produced by executing one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Completed with nothing to report
    Unit,
    /// Value read for a key (`None` if absent)
    Value(Option<Value>),
    /// Entry count
    Count(u64),
    /// Presence flag
    Bool(bool),
    /// Keys in store order
    Keys(Vec<Key>),
}

impl Outcome {
    /// Short name for logs and mismatch errors.
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Unit => "unit",
            Outcome::Value(_) => "value",
            Outcome::Count(_) => "count",
            Outcome::Bool(_) => "bool",
            Outcome::Keys(_) => "keys",
        }
    }

    /// Expect [`Outcome::Unit`].
    pub fn into_unit(self) -> Result<()> {
        match self {
            Outcome::Unit => Ok(()),
            other => Err(mismatch("unit", &other)),
        }
    }

    /// Expect [`Outcome::Value`].
    pub fn into_value(self) -> Result<Option<Value>> {
        match self {
            Outcome::Value(v) => Ok(v),
            other => Err(mismatch("value", &other)),
        }
    }

    /// Expect [`Outcome::Count`].
    pub fn into_count(self) -> Result<u64> {
        match self {
            Outcome::Count(n) => Ok(n),
            other => Err(mismatch("count", &other)),
        }
    }

    /// Expect [`Outcome::Bool`].
    pub fn into_bool(self) -> Result<bool> {
        match self {
            Outcome::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }

    /// Expect [`Outcome::Keys`].
    pub fn into_keys(self) -> Result<Vec<Key>> {
        match self {
            Outcome::Keys(keys) => Ok(keys),
            other => Err(mismatch("keys", &other)),
        }
    }
}

fn mismatch(expected: &str, got: &Outcome) -> Error {
    Error::Internal(format!("expected {} outcome, got {}", expected, got.name()))
}

/// Presence test: a non-zero count means the key exists.
pub fn count_to_presence(outcome: Outcome) -> Result<Outcome> {
    match outcome {
        Outcome::Count(n) => Ok(Outcome::Bool(n > 0)),
        other => Err(mismatch("count", &other)),
    }
}

/// One pending storage operation.
pub struct QueueEntry {
    pub(crate) kind: OperationKind,
    pub(crate) key: Option<Key>,
    pub(crate) value: Option<Value>,
    pub(crate) visit: Option<VisitFn>,
    pub(crate) transform: Option<ResultTransform>,
    pub(crate) isolate_failure: bool,
}

impl QueueEntry {
    fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            key: None,
            value: None,
            visit: None,
            transform: None,
            isolate_failure: kind.isolates_failure(),
        }
    }

    fn keyed(kind: OperationKind, key: impl Into<Key>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::new(kind)
        }
    }

    /// Fetch the value at `key`.
    pub fn get(key: impl Into<Key>) -> Self {
        Self::keyed(OperationKind::Get, key)
    }

    /// Store `value` at `key`.
    pub fn set(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::keyed(OperationKind::Set, key)
        }
    }

    /// Remove `key`.
    pub fn delete(key: impl Into<Key>) -> Self {
        Self::keyed(OperationKind::Delete, key)
    }

    /// Remove every entry.
    pub fn clear() -> Self {
        Self::new(OperationKind::Clear)
    }

    /// Test whether `key` is present. Resolves to [`Outcome::Bool`].
    pub fn has(key: impl Into<Key>) -> Self {
        Self::keyed(OperationKind::Has, key).with_transform(count_to_presence)
    }

    /// Count every entry.
    pub fn count() -> Self {
        Self::new(OperationKind::Count)
    }

    /// Visit every entry in key order.
    pub fn for_each<F>(visit: F) -> Self
    where
        F: FnMut(&Value, &str) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            visit: Some(Box::new(visit)),
            ..Self::new(OperationKind::ForEach)
        }
    }

    /// List every key in order.
    pub fn keys() -> Self {
        Self::new(OperationKind::Keys)
    }

    /// Apply `transform` to the raw outcome on success.
    pub fn with_transform(mut self, transform: ResultTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Override whether a failure stays confined to this entry's result.
    pub fn isolate_failure(mut self, isolate: bool) -> Self {
        self.isolate_failure = isolate;
        self
    }

    /// Operation kind.
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Key argument, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whether a failure stays confined to this entry's result.
    pub fn is_isolated(&self) -> bool {
        self.isolate_failure
    }
}

impl std::fmt::Debug for QueueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueEntry")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("value", &self.value)
            .field("visit", &self.visit.is_some())
            .field("transform", &self.transform.is_some())
            .field("isolate_failure", &self.isolate_failure)
            .finish()
    }
}
