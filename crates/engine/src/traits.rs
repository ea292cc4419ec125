//! Engine boundary traits.
//!
//! The store drives any engine that provides:
//! - a versioned open with an upgrade hook ([`Engine`], [`Schema`])
//! - sessions bound to one object store ([`Connection`], [`Session`])
//! - an ordered cursor advancing one record per step ([`Cursor`])
//!
//! Every request is asynchronous: the caller suspends until the engine
//! reports success or failure for that request.

use crate::error::EngineResult;
use async_trait::async_trait;
use serialstore_core::{Key, Value};
use std::sync::Arc;

/// Identifier of an engine session, unique per connection.
pub type SessionId = u64;

/// Access mode requested when a session begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Reads only
    ReadOnly,
    /// Reads and writes
    ReadWrite,
}

/// Why a session stopped being usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// All requests finished and the session committed
    Complete,
    /// The session was rolled back
    Abort,
    /// The session failed
    Error(String),
}

/// Callback fired once when a session ends.
pub type EndListener = Box<dyn FnOnce(SessionEnd) + Send>;

/// Store layout manipulation, available only inside an upgrade.
pub trait Schema {
    /// Check whether an object store exists.
    fn has_store(&self, name: &str) -> bool;

    /// Create an empty object store. Creating an existing store is an error.
    fn create_store(&mut self, name: &str) -> EngineResult<()>;
}

/// Upgrade hook passed to [`Engine::open`].
///
/// Called with the schema and the version found on record (`0` for a new
/// database) whenever the requested version is newer.
pub type UpgradeHook<'a> = &'a (dyn Fn(&mut dyn Schema, u32) -> EngineResult<()> + Send + Sync);

/// A transactional engine.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Whether the engine can run in the current environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Open database `name` at `version`, running `upgrade` first if the
    /// database is new or older than `version`.
    async fn open(
        &self,
        name: &str,
        version: u32,
        upgrade: UpgradeHook<'_>,
    ) -> EngineResult<Arc<dyn Connection>>;
}

/// An open database.
pub trait Connection: Send + Sync {
    /// Database name.
    fn name(&self) -> &str;

    /// Version the database was opened at.
    fn version(&self) -> u32;

    /// Names of every object store.
    fn store_names(&self) -> Vec<String>;

    /// Begin a session over one object store.
    fn begin(&self, store: &str, mode: SessionMode) -> EngineResult<Arc<dyn Session>>;
}

/// A bounded-lifetime transactional session over one object store.
///
/// Once a session ends it rejects further requests with
/// [`EngineError::SessionInactive`](crate::EngineError::SessionInactive).
/// Some engines hand out handles to sessions that ended without reporting
/// it; [`Session::probe`] exists to catch those before reuse.
#[async_trait]
pub trait Session: Send + Sync {
    /// Session identifier.
    fn id(&self) -> SessionId;

    /// Mode the session was begun with.
    fn mode(&self) -> SessionMode;

    /// Object store the session is bound to.
    fn store(&self) -> &str;

    /// Register a listener fired once when the session ends.
    ///
    /// Registering on an already-ended session fires the listener immediately.
    fn on_end(&self, listener: EndListener);

    /// Fetch the value at `key`.
    async fn get(&self, key: &str) -> EngineResult<Option<Value>>;

    /// Store `value` at `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &Value) -> EngineResult<()>;

    /// Remove `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> EngineResult<()>;

    /// Remove every entry.
    async fn clear(&self) -> EngineResult<()>;

    /// Count entries, either all of them or those matching `key`.
    async fn count(&self, key: Option<&str>) -> EngineResult<u64>;

    /// Open a cursor over every entry in key order.
    async fn open_cursor(&self) -> EngineResult<Box<dyn Cursor>>;

    /// Cheap health check run before a cached session is reused.
    async fn probe(&self) -> EngineResult<()> {
        self.count(None).await.map(|_| ())
    }
}

/// Ordered cursor over an object store.
#[async_trait]
pub trait Cursor: Send {
    /// Advance to the next entry; `None` once exhausted.
    async fn advance(&mut self) -> EngineResult<Option<(Key, Value)>>;
}
