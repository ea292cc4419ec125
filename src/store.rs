//! Store entry point.
//!
//! A [`Store`] owns one operation queue, one connection gate and one session
//! manager. Every operation is appended to the queue and returns a
//! [`ResultHandle`] that can be awaited independently of every other call.
//! Operations execute strictly in the order they were called, whichever
//! handle is awaited first.

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use serialstore_concurrency::{
    ConnectionGate, ConnectionState, OperationQueue, Outcome, QueueEntry, QueueMetricsSnapshot,
    QueueSettings, ResultHandle,
};
use serialstore_core::{Key, Value};
use serialstore_engine::Engine;
use serialstore_storage::MemoryEngine;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// An always-asynchronous key/value store.
///
/// # Example
///
/// ```ignore
/// use serialstore::prelude::*;
///
/// let store = Store::memory()?;
///
/// // Handles can be dropped; the operation still runs in order
/// store.set("name", "Ada");
/// let name = store.get("name").await?;
///
/// store.for_each(|value, key| {
///     println!("{key} = {value}");
///     Ok(())
/// }).await?;
/// ```
pub struct Store {
    queue: OperationQueue,
    config: StoreConfig,
}

impl Store {
    /// Create a builder for store configuration.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Open a store over a fresh in-memory engine with default settings.
    ///
    /// Must be called inside a tokio runtime.
    pub fn memory() -> Result<Self> {
        Self::builder().open()
    }

    /// Open a store over `engine` with `config`.
    pub fn with_config(engine: Arc<dyn Engine>, config: StoreConfig) -> Result<Self> {
        Self::builder().shared_engine(engine).config(config).open()
    }

    /// Resolve to `true` if `key` is present.
    pub fn has(&self, key: impl Into<Key>) -> ResultHandle<bool> {
        self.queue.submit_as(QueueEntry::has(key), Outcome::into_bool)
    }

    /// Resolve to the value at `key`, or `None` if absent.
    pub fn get(&self, key: impl Into<Key>) -> ResultHandle<Option<Value>> {
        self.queue.submit_as(QueueEntry::get(key), Outcome::into_value)
    }

    /// Store `value` at `key`.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> ResultHandle<()> {
        self.queue.submit_as(QueueEntry::set(key, value), Outcome::into_unit)
    }

    /// Remove `key`. Removing a missing key succeeds.
    pub fn delete(&self, key: impl Into<Key>) -> ResultHandle<()> {
        self.queue.submit_as(QueueEntry::delete(key), Outcome::into_unit)
    }

    /// Remove every entry.
    pub fn clear(&self) -> ResultHandle<()> {
        self.queue.submit_as(QueueEntry::clear(), Outcome::into_unit)
    }

    /// Resolve to the number of entries.
    pub fn count(&self) -> ResultHandle<u64> {
        self.queue.submit_as(QueueEntry::count(), Outcome::into_count)
    }

    /// Call `visit(value, key)` for every entry in key order.
    ///
    /// If `visit` returns an error, iteration stops there and the handle
    /// resolves to [`Error::Visit`]. The failure is also left on the chain
    /// and reported by the next [`Store::tail`]. Any state the callback needs
    /// is captured by the closure.
    pub fn for_each<F>(&self, visit: F) -> ResultHandle<()>
    where
        F: FnMut(&Value, &str) -> anyhow::Result<()> + Send + 'static,
    {
        self.queue.submit_as(QueueEntry::for_each(visit), Outcome::into_unit)
    }

    /// Resolve to every key in order.
    pub fn keys(&self) -> ResultHandle<Vec<Key>> {
        self.queue.submit_as(QueueEntry::keys(), Outcome::into_keys)
    }

    /// Append a prebuilt entry and resolve to its raw outcome.
    pub fn submit(&self, entry: QueueEntry) -> ResultHandle<Outcome> {
        self.queue.submit(entry)
    }

    /// Wait for the engine to open.
    ///
    /// Triggers the open if no operation has yet. A failed open is reported
    /// here and by every operation, now and later.
    pub async fn ready(&self) -> Result<()> {
        self.queue.gate().ensure_open().await.map(|_| ())
    }

    /// Resolve once every operation called so far has finished.
    ///
    /// Fails only if the last of them was a failed [`Store::for_each`].
    pub fn tail(&self) -> ResultHandle<()> {
        self.queue.tail()
    }

    /// Current state of the engine connection.
    pub fn connection_state(&self) -> ConnectionState {
        self.queue.gate().state()
    }

    /// Queue and session counters.
    pub fn metrics(&self) -> QueueMetricsSnapshot {
        self.queue.metrics()
    }

    /// Settings this store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("queue", &self.queue)
            .finish()
    }
}

/// Builder for store configuration.
///
/// # Example
///
/// ```ignore
/// let engine = MemoryEngine::new();
/// let store = Store::builder()
///     .engine(engine.clone())
///     .name("app")
///     .version(2)
///     .settle_delay(Duration::from_millis(1))
///     .open()?;
/// ```
pub struct StoreBuilder {
    engine: Option<Arc<dyn Engine>>,
    config: StoreConfig,
}

impl StoreBuilder {
    /// Create a builder with default settings and no engine.
    ///
    /// Without an engine, [`StoreBuilder::open`] uses a fresh [`MemoryEngine`].
    pub fn new() -> Self {
        Self {
            engine: None,
            config: StoreConfig::default(),
        }
    }

    /// Use `engine`.
    pub fn engine<E: Engine + 'static>(self, engine: E) -> Self {
        self.shared_engine(Arc::new(engine))
    }

    /// Use an engine that is already shared.
    pub fn shared_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Replace every setting with `config`.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the database name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the schema version.
    pub fn version(mut self, version: u32) -> Self {
        self.config.version = version;
        self
    }

    /// Set the object store name.
    pub fn store_name(mut self, store_name: impl Into<String>) -> Self {
        self.config.store_name = store_name.into();
        self
    }

    /// Set the pause inserted after each operation.
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.config.settle_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable or disable the probe run before a cached session is reused.
    pub fn probe_before_reuse(mut self, probe: bool) -> Self {
        self.config.probe_before_reuse = probe;
        self
    }

    /// Create the store.
    ///
    /// Nothing is opened yet; the engine opens on the first operation or
    /// [`Store::ready`]. Fails with [`Error::Unavailable`] when the engine
    /// cannot run here or there is no tokio runtime.
    pub fn open(self) -> Result<Store> {
        let config = self.config;
        config.validate().map_err(|e| Error::OpenFailure {
            name: config.name.clone(),
            reason: e.to_string(),
        })?;

        let engine = self.engine.unwrap_or_else(|| Arc::new(MemoryEngine::new()));
        if !engine.is_available() {
            warn!(store = %config.name, "engine unavailable; store not created");
            return Err(Error::Unavailable(format!(
                "engine for '{}' is not available",
                config.name
            )));
        }

        let gate = Arc::new(ConnectionGate::new(
            engine,
            config.name.clone(),
            config.version,
            config.store_name.clone(),
        ));
        let queue = OperationQueue::spawn(
            gate,
            QueueSettings {
                settle_delay: config.settle_delay(),
                probe_before_reuse: config.probe_before_reuse,
            },
        )?;

        info!(
            store = %config.name,
            version = config.version,
            object_store = %config.store_name,
            queue = %queue.id(),
            "store created"
        );
        Ok(Store { queue, config })
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
