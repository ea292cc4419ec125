//! Queue counters
//!
//! Counters are plain atomics bumped by the submitting side and the worker.
//! [`QueueMetrics::snapshot`] reads them individually, so a snapshot taken
//! while entries are in flight is not a consistent cut.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one operation queue.
#[derive(Debug, Default)]
pub struct QueueMetrics {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    sessions_opened: AtomicU64,
    sessions_reused: AtomicU64,
    sessions_ended: AtomicU64,
    stale_sessions: AtomicU64,
}

/// Point-in-time copy of [`QueueMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueMetricsSnapshot {
    /// Entries accepted by `submit`
    pub submitted: u64,
    /// Entries that resolved successfully
    pub completed: u64,
    /// Entries that resolved with an error
    pub failed: u64,
    /// Sessions begun by the session manager
    pub sessions_opened: u64,
    /// Cached sessions reused after a successful probe
    pub sessions_reused: u64,
    /// End notifications received from the engine
    pub sessions_ended: u64,
    /// Cached sessions discarded because their probe failed
    pub stale_sessions: u64,
}

impl QueueMetricsSnapshot {
    /// Entries submitted but not yet resolved.
    pub fn pending(&self) -> u64 {
        self.submitted.saturating_sub(self.completed + self.failed)
    }
}

impl QueueMetrics {
    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_result(&self, ok: bool) {
        let counter = if ok { &self.completed } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_session_opened(&self) {
        self.sessions_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_session_reused(&self) {
        self.sessions_reused.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_session_ended(&self) {
        self.sessions_ended.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_session(&self) {
        self.stale_sessions.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            sessions_opened: self.sessions_opened.load(Ordering::Relaxed),
            sessions_reused: self.sessions_reused.load(Ordering::Relaxed),
            sessions_ended: self.sessions_ended.load(Ordering::Relaxed),
            stale_sessions: self.stale_sessions.load(Ordering::Relaxed),
        }
    }
}
