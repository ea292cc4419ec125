//! Operation executor
//!
//! Maps one queue entry onto engine requests within a single session:
//!
//! | Kind | Requests | Raw outcome |
//! |------|----------|-------------|
//! | get | `get(key)` | `Value` |
//! | set | `put(key, value)` | `Unit` |
//! | delete | `delete(key)` | `Unit` |
//! | clear | `clear()` | `Unit` |
//! | has | `count(key)` | `Count`, then presence transform |
//! | count | `count()` | `Count` |
//! | for_each | `open_cursor()`, `advance()` until exhausted | `Unit` |
//! | keys | `open_cursor()`, `advance()` until exhausted | `Keys` |
//!
//! Engine failures are converted with
//! [`EngineError::for_operation`](serialstore_engine::EngineError::for_operation)
//! and the entry's transform only ever sees a successful outcome.

use crate::entry::{Outcome, QueueEntry, VisitFn};
use serialstore_core::{Error, Key, OperationKind, Result, Value};
use serialstore_engine::{Cursor, EngineError, Session};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::trace;

/// Runs queue entries against a session.
#[derive(Debug, Default, Clone, Copy)]
pub struct OperationExecutor;

impl OperationExecutor {
    /// Create an executor.
    pub fn new() -> Self {
        Self
    }

    /// Execute `entry` within `session`.
    pub async fn run(&self, entry: QueueEntry, session: &dyn Session) -> Result<Outcome> {
        let QueueEntry {
            kind,
            key,
            value,
            visit,
            transform,
            ..
        } = entry;

        let raw = dispatch(kind, key, value, visit, session).await?;
        match transform {
            Some(transform) => transform(raw),
            None => Ok(raw),
        }
    }
}

async fn dispatch(
    kind: OperationKind,
    key: Option<Key>,
    value: Option<Value>,
    visit: Option<VisitFn>,
    session: &dyn Session,
) -> Result<Outcome> {
    let engine = |e: EngineError| e.for_operation(kind);

    match kind {
        OperationKind::Get => {
            let key = require(kind, key)?;
            session.get(&key).await.map(Outcome::Value).map_err(engine)
        }
        OperationKind::Set => {
            let key = require(kind, key)?;
            let value = value.ok_or_else(|| Error::Internal("set entry without a value".into()))?;
            session.put(&key, &value).await.map_err(engine)?;
            Ok(Outcome::Unit)
        }
        OperationKind::Delete => {
            let key = require(kind, key)?;
            session.delete(&key).await.map_err(engine)?;
            Ok(Outcome::Unit)
        }
        OperationKind::Clear => {
            session.clear().await.map_err(engine)?;
            Ok(Outcome::Unit)
        }
        OperationKind::Has => {
            let key = require(kind, key)?;
            session.count(Some(&key)).await.map(Outcome::Count).map_err(engine)
        }
        OperationKind::Count => session.count(None).await.map(Outcome::Count).map_err(engine),
        OperationKind::ForEach => {
            let visit =
                visit.ok_or_else(|| Error::Internal("for_each entry without a callback".into()))?;
            let visited = visit_all(session, visit).await?;
            trace!(visited, "iteration finished");
            Ok(Outcome::Unit)
        }
        OperationKind::Keys => {
            let mut keys = Vec::new();
            let mut cursor = session.open_cursor().await.map_err(engine)?;
            while let Some((key, _)) = cursor.advance().await.map_err(engine)? {
                keys.push(key);
            }
            Ok(Outcome::Keys(keys))
        }
    }
}

fn require(kind: OperationKind, key: Option<Key>) -> Result<Key> {
    key.ok_or_else(|| Error::Internal(format!("{} entry without a key", kind)))
}

/// Drive a cursor to exhaustion, handing each entry to `visit`.
///
/// The first callback error stops iteration; no further entries are read.
/// A panicking callback is reported as a callback error so the queue keeps
/// serving later entries.
async fn visit_all(session: &dyn Session, mut visit: VisitFn) -> Result<u64> {
    let kind = OperationKind::ForEach;
    let mut cursor: Box<dyn Cursor> = session
        .open_cursor()
        .await
        .map_err(|e| e.for_operation(kind))?;

    let mut visited = 0u64;
    while let Some((key, value)) = cursor.advance().await.map_err(|e| e.for_operation(kind))? {
        visited += 1;
        match catch_unwind(AssertUnwindSafe(|| visit(&value, &key))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(Error::visit(e)),
            Err(_) => {
                return Err(Error::visit(anyhow::anyhow!(
                    "visit callback panicked at key '{}'",
                    key
                )))
            }
        }
    }
    Ok(visited)
}
