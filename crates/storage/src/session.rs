//! Memory engine sessions and cursors
//!
//! A session stays live until it is completed (after the configured number
//! of requests), aborted, or failed by an injected fault. Ending a session
//! fires its end listeners exactly once. Sessions can also be expired
//! silently, which makes them reject requests without telling anyone; this
//! mirrors engines that hand back handles to sessions that already closed.

use crate::engine::{DatabaseState, EngineShared};
use crate::faults::RequestKind;
use crate::object_store::ObjectStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use serialstore_core::{Key, Value};
use serialstore_engine::{
    Cursor, EndListener, EngineError, EngineResult, Session, SessionEnd, SessionId, SessionMode,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

#[derive(Default)]
struct SessionStatus {
    ended: Option<SessionEnd>,
    silently_ended: bool,
    listeners: Vec<EndListener>,
}

/// State shared by a session handle and its cursors.
pub(crate) struct SessionState {
    id: SessionId,
    mode: SessionMode,
    store: String,
    db: Arc<DatabaseState>,
    shared: Arc<EngineShared>,
    status: Mutex<SessionStatus>,
    requests: AtomicUsize,
}

impl SessionState {
    pub(crate) fn new(
        id: SessionId,
        mode: SessionMode,
        store: &str,
        db: Arc<DatabaseState>,
        shared: Arc<EngineShared>,
    ) -> Self {
        Self {
            id,
            mode,
            store: store.to_string(),
            db,
            shared,
            status: Mutex::new(SessionStatus::default()),
            requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        let status = self.status.lock();
        status.ended.is_none() && !status.silently_ended
    }

    /// End the session and notify listeners. No-op if already ended.
    pub(crate) fn finish(&self, end: SessionEnd) {
        let listeners = {
            let mut status = self.status.lock();
            if status.ended.is_some() {
                return;
            }
            status.ended = Some(end.clone());
            std::mem::take(&mut status.listeners)
        };
        trace!(session = self.id, ?end, "memory session ended");
        for listener in listeners {
            listener(end.clone());
        }
    }

    /// Make the session unusable without notifying listeners.
    pub(crate) fn expire_silently(&self) {
        self.status.lock().silently_ended = true;
    }

    fn ensure_active(&self) -> EngineResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(EngineError::SessionInactive(self.id))
        }
    }

    async fn request<T, F>(
        &self,
        kind: RequestKind,
        key: Option<&str>,
        write: bool,
        op: F,
    ) -> EngineResult<T>
    where
        T: Send,
        F: FnOnce(&mut ObjectStore) -> EngineResult<T> + Send,
    {
        // Requests always complete asynchronously
        tokio::task::yield_now().await;

        self.ensure_active()?;
        if write && self.mode == SessionMode::ReadOnly {
            return Err(EngineError::ReadOnly(self.id));
        }

        self.shared.log.record(self.id, kind, key);

        if let Some(message) = self.shared.faults.take(kind) {
            self.finish(SessionEnd::Error(message.clone()));
            return Err(EngineError::Request(message));
        }

        let result = {
            let mut stores = self.db.stores.write();
            let store = stores
                .get_mut(&self.store)
                .ok_or_else(|| EngineError::StoreNotFound(self.store.clone()))?;
            op(store)
        };

        if kind != RequestKind::Advance {
            let served = self.requests.fetch_add(1, Ordering::AcqRel) + 1;
            if let Some(limit) = self.shared.config.auto_complete_after {
                if served >= limit {
                    self.finish(SessionEnd::Complete);
                }
            }
        }

        result
    }
}

/// Session handle returned by [`MemoryConnection::begin`](crate::MemoryConnection).
pub struct MemorySession(pub(crate) Arc<SessionState>);

#[async_trait]
impl Session for MemorySession {
    fn id(&self) -> SessionId {
        self.0.id
    }

    fn mode(&self) -> SessionMode {
        self.0.mode
    }

    fn store(&self) -> &str {
        &self.0.store
    }

    fn on_end(&self, listener: EndListener) {
        let fired = {
            let mut status = self.0.status.lock();
            match &status.ended {
                Some(end) => Some((end.clone(), listener)),
                None => {
                    status.listeners.push(listener);
                    None
                }
            }
        };
        if let Some((end, listener)) = fired {
            listener(end);
        }
    }

    async fn get(&self, key: &str) -> EngineResult<Option<Value>> {
        self.0
            .request(RequestKind::Get, Some(key), false, |store| store.get(key))
            .await
    }

    async fn put(&self, key: &str, value: &Value) -> EngineResult<()> {
        self.0
            .request(RequestKind::Put, Some(key), true, |store| store.put(key, value))
            .await
    }

    async fn delete(&self, key: &str) -> EngineResult<()> {
        self.0
            .request(RequestKind::Delete, Some(key), true, |store| {
                store.delete(key);
                Ok(())
            })
            .await
    }

    async fn clear(&self) -> EngineResult<()> {
        self.0
            .request(RequestKind::Clear, None, true, |store| {
                store.clear();
                Ok(())
            })
            .await
    }

    async fn count(&self, key: Option<&str>) -> EngineResult<u64> {
        self.0
            .request(RequestKind::Count, key, false, |store| {
                Ok(match key {
                    Some(k) => u64::from(store.contains(k)),
                    None => store.len() as u64,
                })
            })
            .await
    }

    async fn open_cursor(&self) -> EngineResult<Box<dyn Cursor>> {
        self.0
            .request(RequestKind::OpenCursor, None, false, |_| Ok(()))
            .await?;
        Ok(Box::new(MemoryCursor {
            session: Arc::clone(&self.0),
            last: None,
            exhausted: false,
        }))
    }

    async fn probe(&self) -> EngineResult<()> {
        tokio::task::yield_now().await;
        self.0.ensure_active()
    }
}

/// Cursor over a memory store, resuming after the last key it returned.
pub struct MemoryCursor {
    session: Arc<SessionState>,
    last: Option<Key>,
    exhausted: bool,
}

#[async_trait]
impl Cursor for MemoryCursor {
    async fn advance(&mut self) -> EngineResult<Option<(Key, Value)>> {
        if self.exhausted {
            return Ok(None);
        }
        let after = self.last.clone();
        let next = self
            .session
            .request(RequestKind::Advance, None, false, move |store| {
                store.next_after(after.as_deref())
            })
            .await?;
        match &next {
            Some((key, _)) => self.last = Some(key.clone()),
            None => self.exhausted = true,
        }
        Ok(next)
    }
}
