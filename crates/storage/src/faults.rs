//! Request log and fault injection for the memory engine.
//!
//! Tests use the request log to check the order in which the engine saw
//! requests, and the fault plan to make a chosen request fail.

use parking_lot::Mutex;
use serialstore_core::Key;
use serialstore_engine::SessionId;
use std::collections::VecDeque;

/// Kind of request received by the memory engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Database open
    Open,
    /// Value fetch
    Get,
    /// Value store
    Put,
    /// Key removal
    Delete,
    /// Store clear
    Clear,
    /// Entry count
    Count,
    /// Cursor open
    OpenCursor,
    /// Cursor step
    Advance,
}

/// A request as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// Session that issued the request (`0` for opens)
    pub session: SessionId,
    /// Request kind
    pub kind: RequestKind,
    /// Key argument, if any
    pub key: Option<Key>,
}

/// Append-only log of requests.
#[derive(Debug, Default)]
pub(crate) struct RequestLog {
    records: Mutex<Vec<RequestRecord>>,
}

impl RequestLog {
    pub(crate) fn record(&self, session: SessionId, kind: RequestKind, key: Option<&str>) {
        self.records.lock().push(RequestRecord {
            session,
            kind,
            key: key.map(str::to_string),
        });
    }

    pub(crate) fn snapshot(&self) -> Vec<RequestRecord> {
        self.records.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.records.lock().clear();
    }
}

/// One-shot failures queued against request kinds.
#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    pending: Mutex<VecDeque<(RequestKind, String)>>,
}

impl FaultPlan {
    pub(crate) fn push(&self, kind: RequestKind, message: String) {
        self.pending.lock().push_back((kind, message));
    }

    /// Remove and return the first fault queued for `kind`.
    pub(crate) fn take(&self, kind: RequestKind) -> Option<String> {
        let mut pending = self.pending.lock();
        let idx = pending.iter().position(|(k, _)| *k == kind)?;
        pending.remove(idx).map(|(_, message)| message)
    }
}
