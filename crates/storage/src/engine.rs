//! In-memory transactional engine
//!
//! [`MemoryEngine`] implements the engine boundary with ordered in-memory
//! object stores. Handles are cheap to clone and share state, so a test can
//! keep one handle for inspection and fault injection while the store owns
//! another.
//!
//! # Example
//!
//! ```ignore
//! use serialstore_storage::{MemoryEngine, RequestKind};
//!
//! let engine = MemoryEngine::new();
//! engine.fail_next(RequestKind::Get, "disk on fire");
//! ```

use crate::faults::{FaultPlan, RequestKind, RequestLog, RequestRecord};
use crate::object_store::ObjectStore;
use crate::session::{MemorySession, SessionState};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serialstore_engine::{
    Connection, Engine, EngineError, EngineResult, Schema, Session, SessionEnd, SessionMode,
    UpgradeHook,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Memory engine settings.
#[derive(Debug, Clone)]
pub struct MemoryEngineConfig {
    /// Report the engine as available to the host.
    pub available: bool,

    /// Complete each session after it has served this many requests.
    ///
    /// `None` keeps sessions open until aborted or failed. Cursor steps do
    /// not count; opening the cursor does.
    pub auto_complete_after: Option<usize>,
}

impl Default for MemoryEngineConfig {
    fn default() -> Self {
        Self {
            available: true,
            auto_complete_after: None,
        }
    }
}

/// Engine-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    /// Open requests received
    pub opens: u64,
    /// Sessions begun across all databases
    pub sessions_begun: u64,
}

pub(crate) struct EngineShared {
    pub(crate) config: MemoryEngineConfig,
    pub(crate) log: RequestLog,
    pub(crate) faults: FaultPlan,
    databases: Mutex<HashMap<String, Arc<DatabaseState>>>,
    opens: AtomicU64,
    sessions_begun: AtomicU64,
}

/// One named database and its object stores.
pub(crate) struct DatabaseState {
    name: String,
    version: AtomicU32,
    pub(crate) stores: RwLock<HashMap<String, ObjectStore>>,
    sessions: Mutex<Vec<Weak<SessionState>>>,
    next_session_id: AtomicU64,
}

impl DatabaseState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: AtomicU32::new(0),
            stores: RwLock::new(HashMap::new()),
            sessions: Mutex::new(Vec::new()),
            next_session_id: AtomicU64::new(0),
        }
    }

    fn live_sessions(&self) -> Vec<Arc<SessionState>> {
        let mut sessions = self.sessions.lock();
        sessions.retain(|weak| weak.strong_count() > 0);
        sessions
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|s| s.is_active())
            .collect()
    }
}

struct MemorySchema<'a> {
    stores: &'a mut HashMap<String, ObjectStore>,
}

impl Schema for MemorySchema<'_> {
    fn has_store(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    fn create_store(&mut self, name: &str) -> EngineResult<()> {
        if self.stores.contains_key(name) {
            return Err(EngineError::Upgrade(format!("store '{}' already exists", name)));
        }
        self.stores.insert(name.to_string(), ObjectStore::new());
        Ok(())
    }
}

/// In-memory engine handle.
#[derive(Clone)]
pub struct MemoryEngine {
    shared: Arc<EngineShared>,
}

impl MemoryEngine {
    /// Create an engine with default settings.
    pub fn new() -> Self {
        Self::with_config(MemoryEngineConfig::default())
    }

    /// Create an engine with explicit settings.
    pub fn with_config(config: MemoryEngineConfig) -> Self {
        Self {
            shared: Arc::new(EngineShared {
                config,
                log: RequestLog::default(),
                faults: FaultPlan::default(),
                databases: Mutex::new(HashMap::new()),
                opens: AtomicU64::new(0),
                sessions_begun: AtomicU64::new(0),
            }),
        }
    }

    /// Create an engine that reports itself unavailable.
    pub fn unavailable() -> Self {
        Self::with_config(MemoryEngineConfig {
            available: false,
            ..MemoryEngineConfig::default()
        })
    }

    /// Make the next request of `kind` fail with `message`.
    ///
    /// A failed session request also ends that session with
    /// [`SessionEnd::Error`].
    pub fn fail_next(&self, kind: RequestKind, message: impl Into<String>) {
        self.shared.faults.push(kind, message.into());
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.shared.log.snapshot()
    }

    /// Forget the request log.
    pub fn clear_requests(&self) {
        self.shared.log.clear();
    }

    /// Engine-wide counters.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            opens: self.shared.opens.load(Ordering::Acquire),
            sessions_begun: self.shared.sessions_begun.load(Ordering::Acquire),
        }
    }

    /// Version on record for database `name`.
    pub fn database_version(&self, name: &str) -> Option<u32> {
        self.shared
            .databases
            .lock()
            .get(name)
            .map(|db| db.version.load(Ordering::Acquire))
    }

    /// Number of sessions that are still live across all databases.
    pub fn live_sessions(&self) -> usize {
        self.all_databases()
            .iter()
            .map(|db| db.live_sessions().len())
            .sum()
    }

    /// Abort every live session, notifying listeners.
    pub fn abort_sessions(&self) {
        for db in self.all_databases() {
            for session in db.live_sessions() {
                session.finish(SessionEnd::Abort);
            }
        }
    }

    /// Make every live session unusable without notifying listeners.
    pub fn expire_sessions_silently(&self) {
        for db in self.all_databases() {
            for session in db.live_sessions() {
                session.expire_silently();
            }
        }
    }

    /// Store raw bytes under `key`, bypassing value encoding.
    ///
    /// Used to plant entries that fail to decode.
    pub fn write_raw(
        &self,
        database: &str,
        store: &str,
        key: &str,
        bytes: Vec<u8>,
    ) -> EngineResult<()> {
        let db = self
            .shared
            .databases
            .lock()
            .get(database)
            .cloned()
            .ok_or_else(|| EngineError::Request(format!("database '{}' not found", database)))?;
        let mut stores = db.stores.write();
        let target = stores
            .get_mut(store)
            .ok_or_else(|| EngineError::StoreNotFound(store.to_string()))?;
        target.put_raw(key, bytes);
        Ok(())
    }

    fn all_databases(&self) -> Vec<Arc<DatabaseState>> {
        self.shared.databases.lock().values().cloned().collect()
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("config", &self.shared.config)
            .field("stats", &self.stats())
            .finish()
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    fn is_available(&self) -> bool {
        self.shared.config.available
    }

    async fn open(
        &self,
        name: &str,
        version: u32,
        upgrade: UpgradeHook<'_>,
    ) -> EngineResult<Arc<dyn Connection>> {
        tokio::task::yield_now().await;

        self.shared.log.record(0, RequestKind::Open, Some(name));
        self.shared.opens.fetch_add(1, Ordering::AcqRel);

        if !self.shared.config.available {
            return Err(EngineError::Unavailable("memory engine is disabled".into()));
        }
        if let Some(message) = self.shared.faults.take(RequestKind::Open) {
            return Err(EngineError::Request(message));
        }
        if version == 0 {
            return Err(EngineError::Request("version must be a positive integer".into()));
        }

        let db = Arc::clone(
            self.shared
                .databases
                .lock()
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(DatabaseState::new(name))),
        );

        let existing = db.version.load(Ordering::Acquire);
        if version < existing {
            return Err(EngineError::VersionDowngrade {
                requested: version,
                existing,
            });
        }

        if version > existing {
            let mut stores = db.stores.write();
            let backup = stores.clone();
            let mut schema = MemorySchema {
                stores: &mut stores,
            };
            if let Err(e) = upgrade(&mut schema, existing) {
                *stores = backup;
                return Err(match e {
                    EngineError::Upgrade(_) => e,
                    other => EngineError::Upgrade(other.to_string()),
                });
            }
            db.version.store(version, Ordering::Release);
            debug!(database = %db.name, from = existing, to = version, "memory database upgraded");
        }

        Ok(Arc::new(MemoryConnection {
            db,
            shared: Arc::clone(&self.shared),
        }))
    }
}

/// Open memory database.
pub struct MemoryConnection {
    db: Arc<DatabaseState>,
    shared: Arc<EngineShared>,
}

impl Connection for MemoryConnection {
    fn name(&self) -> &str {
        &self.db.name
    }

    fn version(&self) -> u32 {
        self.db.version.load(Ordering::Acquire)
    }

    fn store_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.db.stores.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn begin(&self, store: &str, mode: SessionMode) -> EngineResult<Arc<dyn Session>> {
        if !self.db.stores.read().contains_key(store) {
            return Err(EngineError::StoreNotFound(store.to_string()));
        }

        let id = self.db.next_session_id.fetch_add(1, Ordering::AcqRel) + 1;
        let state = Arc::new(SessionState::new(
            id,
            mode,
            store,
            Arc::clone(&self.db),
            Arc::clone(&self.shared),
        ));

        {
            let mut sessions = self.db.sessions.lock();
            sessions.retain(|weak| weak.strong_count() > 0);
            sessions.push(Arc::downgrade(&state));
        }
        self.shared.sessions_begun.fetch_add(1, Ordering::AcqRel);
        trace!(database = %self.db.name, store, session = id, ?mode, "memory session begun");

        Ok(Arc::new(MemorySession(state)))
    }
}
