//! CLI session state: the runtime and the store it drives.

use std::sync::Arc;

use parking_lot::Mutex;
use serialstore::{
    ConnectionState, Key, QueueMetricsSnapshot, Result, Store, StoreConfig, Value,
};
use tokio::runtime::Runtime;

use crate::parse::StoreCommand;

/// Output of one executed command.
#[derive(Debug)]
pub enum CommandOutput {
    Ok,
    Value(Option<Value>),
    Bool(bool),
    Count(u64),
    Keys(Vec<Key>),
    Entries(Vec<(Key, Value)>),
    Info(StoreInfo),
}

/// Snapshot printed by `info`.
#[derive(Debug)]
pub struct StoreInfo {
    pub config: StoreConfig,
    pub connection: ConnectionState,
    pub metrics: QueueMetricsSnapshot,
    /// Failure left on the chain by the last processed entry
    pub chain_failure: Option<String>,
}

/// Owns the runtime and the store for the lifetime of the process.
pub struct SessionState {
    store: Store,
    runtime: Runtime,
}

impl SessionState {
    /// Build a runtime and open a store with `config` on it.
    pub fn open(config: StoreConfig) -> std::result::Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to start runtime: {}", e))?;

        let store = {
            let _guard = runtime.enter();
            Store::builder()
                .config(config)
                .open()
                .map_err(|e| format!("Failed to open store: {}", e))?
        };
        Ok(Self { store, runtime })
    }

    /// Run one command to completion.
    pub fn execute(&self, command: StoreCommand) -> Result<CommandOutput> {
        let store = &self.store;
        self.runtime.block_on(async move {
            match command {
                StoreCommand::Get { key } => store.get(key).await.map(CommandOutput::Value),
                StoreCommand::Set { key, value } => {
                    store.set(key, value).await.map(|_| CommandOutput::Ok)
                }
                StoreCommand::Has { key } => store.has(key).await.map(CommandOutput::Bool),
                StoreCommand::Del { key } => store.delete(key).await.map(|_| CommandOutput::Ok),
                StoreCommand::Clear => store.clear().await.map(|_| CommandOutput::Ok),
                StoreCommand::Count => store.count().await.map(CommandOutput::Count),
                StoreCommand::Keys => store.keys().await.map(CommandOutput::Keys),
                StoreCommand::Each => {
                    let entries = Arc::new(Mutex::new(Vec::new()));
                    let sink = Arc::clone(&entries);
                    store
                        .for_each(move |value, key| {
                            sink.lock().push((key.to_string(), value.clone()));
                            Ok(())
                        })
                        .await?;
                    let collected = std::mem::take(&mut *entries.lock());
                    Ok(CommandOutput::Entries(collected))
                }
                StoreCommand::Info => {
                    // Settles anything still queued so the counters are current
                    let chain_failure = store.tail().await.err().map(|e| e.to_string());
                    Ok(CommandOutput::Info(StoreInfo {
                        config: store.config().clone(),
                        connection: store.connection_state(),
                        metrics: store.metrics(),
                        chain_failure,
                    }))
                }
            }
        })
    }
}
