//! Connection gate
//!
//! The gate owns the single open of the engine. The first caller of
//! [`ConnectionGate::ensure_open`] drives the open; every concurrent and
//! later caller waits on the same cell and receives the same result.
//!
//! The result is memoized whether it succeeded or not. A failed open is
//! terminal: there is no retry, and every later operation on the store
//! fails with the same [`Error::OpenFailure`](serialstore_core::Error::OpenFailure).
//!
//! ## States
//!
//! ```text
//! Unopened ──> Opening ──> Ready
//!                    └───> Failed
//! ```

use parking_lot::Mutex;
use serialstore_core::Result;
use serialstore_engine::{Connection, Engine, EngineError, EngineResult, Schema};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Lifecycle of the gate's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No open attempted yet
    Unopened,
    /// Open in flight
    Opening,
    /// Connection available
    Ready,
    /// Open failed; terminal
    Failed,
}

impl ConnectionState {
    fn can_transition_to(self, next: ConnectionState) -> bool {
        matches!(
            (self, next),
            (ConnectionState::Unopened, ConnectionState::Opening)
                | (ConnectionState::Opening, ConnectionState::Ready)
                | (ConnectionState::Opening, ConnectionState::Failed)
        )
    }
}

/// Lazily opens the engine exactly once and hands out the connection.
pub struct ConnectionGate {
    engine: Arc<dyn Engine>,
    name: String,
    version: u32,
    store: String,
    cell: OnceCell<Result<Arc<dyn Connection>>>,
    state: Mutex<ConnectionState>,
}

impl ConnectionGate {
    /// Create a gate for database `name` at `version`, provisioning `store`.
    pub fn new(
        engine: Arc<dyn Engine>,
        name: impl Into<String>,
        version: u32,
        store: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            name: name.into(),
            version,
            store: store.into(),
            cell: OnceCell::new(),
            state: Mutex::new(ConnectionState::Unopened),
        }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Object store every session binds to.
    pub fn store_name(&self) -> &str {
        &self.store
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Open the engine on first use; afterwards return the memoized result.
    pub async fn ensure_open(&self) -> Result<Arc<dyn Connection>> {
        self.cell.get_or_init(|| self.open()).await.clone()
    }

    async fn open(&self) -> Result<Arc<dyn Connection>> {
        self.transition(ConnectionState::Opening);
        debug!(
            database = %self.name,
            version = self.version,
            store = %self.store,
            "opening engine"
        );

        match self.open_provisioned().await {
            Ok(conn) => {
                info!(
                    database = %self.name,
                    version = conn.version(),
                    store = %self.store,
                    "connection ready"
                );
                self.transition(ConnectionState::Ready);
                Ok(conn)
            }
            Err(e) => {
                error!(database = %self.name, error = %e, "engine open failed");
                self.transition(ConnectionState::Failed);
                Err(e.for_open(&self.name))
            }
        }
    }

    /// Open at the configured version, or at the database's own version when
    /// another store already moved it past ours. If the opened database
    /// lacks our store, reopen one version higher so the upgrade hook runs
    /// and creates it.
    async fn open_provisioned(&self) -> EngineResult<Arc<dyn Connection>> {
        let store = self.store.clone();
        let provision = move |schema: &mut dyn Schema, existing: u32| -> EngineResult<()> {
            if !schema.has_store(&store) {
                debug!(store = %store, from = existing, "creating object store");
                schema.create_store(&store)?;
            }
            Ok(())
        };

        if !self.engine.is_available() {
            return Err(EngineError::Unavailable(
                "engine reports itself unavailable".into(),
            ));
        }

        let conn = match self.engine.open(&self.name, self.version, &provision).await {
            Err(EngineError::VersionDowngrade { existing, .. }) => {
                debug!(
                    database = %self.name,
                    configured = self.version,
                    existing,
                    "database is newer than configured, opening at its version"
                );
                self.engine.open(&self.name, existing, &provision).await?
            }
            opened => opened?,
        };
        if conn.store_names().iter().any(|s| s == &self.store) {
            return Ok(conn);
        }

        let bumped = conn.version().checked_add(1).ok_or_else(|| {
            EngineError::Upgrade(format!("cannot add store '{}': version exhausted", self.store))
        })?;
        info!(
            database = %self.name,
            version = bumped,
            store = %self.store,
            "store missing, reopening to provision it"
        );
        self.engine.open(&self.name, bumped, &provision).await
    }

    fn transition(&self, next: ConnectionState) {
        let mut state = self.state.lock();
        debug_assert!(
            state.can_transition_to(next),
            "illegal connection transition {:?} -> {:?}",
            *state,
            next
        );
        *state = next;
    }
}

impl std::fmt::Debug for ConnectionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGate")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("store", &self.store)
            .field("state", &self.state())
            .finish()
    }
}
