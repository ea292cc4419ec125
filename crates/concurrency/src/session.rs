//! Session manager
//!
//! Keeps at most one engine session alive for reuse across queued
//! operations. A cached session is dropped when the engine reports it
//! ended, and (when probing is on) when a cheap probe request fails before
//! reuse. Engines are allowed to end sessions on their own schedule, so a
//! cached handle is never trusted blindly.
//!
//! Only the queue worker touches the manager, so it needs no locking of
//! its own. The end flag is shared with the engine's end listener.

use crate::metrics::QueueMetrics;
use serialstore_core::{OperationKind, Result};
use serialstore_engine::{Connection, Session, SessionMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

struct SessionHandle {
    session: Arc<dyn Session>,
    ended: Arc<AtomicBool>,
}

impl SessionHandle {
    fn is_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}

/// Caches and hands out engine sessions.
pub struct SessionManager {
    store: String,
    probe_before_reuse: bool,
    current: Option<SessionHandle>,
    metrics: Arc<QueueMetrics>,
}

impl SessionManager {
    /// Create a manager that binds sessions to `store`.
    pub fn new(
        store: impl Into<String>,
        probe_before_reuse: bool,
        metrics: Arc<QueueMetrics>,
    ) -> Self {
        Self {
            store: store.into(),
            probe_before_reuse,
            current: None,
            metrics,
        }
    }

    /// Return a usable read-write session, reusing the cached one when it
    /// is still alive.
    pub async fn acquire(
        &mut self,
        conn: &dyn Connection,
        kind: OperationKind,
    ) -> Result<Arc<dyn Session>> {
        if let Some(handle) = self.current.take() {
            if handle.is_ended() {
                trace!(session = handle.session.id(), "cached session already ended");
            } else if !self.probe_before_reuse {
                let session = Arc::clone(&handle.session);
                self.current = Some(handle);
                self.metrics.record_session_reused();
                return Ok(session);
            } else {
                match handle.session.probe().await {
                    Ok(()) => {
                        let session = Arc::clone(&handle.session);
                        trace!(session = session.id(), %kind, "reusing session");
                        self.current = Some(handle);
                        self.metrics.record_session_reused();
                        return Ok(session);
                    }
                    Err(e) => {
                        warn!(
                            session = handle.session.id(),
                            error = %e,
                            "discarding stale session"
                        );
                        self.metrics.record_stale_session();
                    }
                }
            }
        }

        self.begin(conn, kind)
    }

    fn begin(&mut self, conn: &dyn Connection, kind: OperationKind) -> Result<Arc<dyn Session>> {
        let session = conn
            .begin(&self.store, SessionMode::ReadWrite)
            .map_err(|e| e.for_operation(kind))?;

        let ended = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ended);
        let metrics = Arc::clone(&self.metrics);
        let id = session.id();
        session.on_end(Box::new(move |end| {
            flag.store(true, Ordering::Release);
            metrics.record_session_ended();
            trace!(session = id, ?end, "session ended");
        }));

        self.metrics.record_session_opened();
        debug!(session = id, store = %self.store, %kind, "began read-write session");

        self.current = Some(SessionHandle {
            session: Arc::clone(&session),
            ended,
        });
        Ok(session)
    }

    /// Forget the cached session.
    pub fn invalidate(&mut self) {
        if let Some(handle) = self.current.take() {
            debug!(session = handle.session.id(), "session invalidated");
        }
    }
}
