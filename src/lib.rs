//! # serialstore
//!
//! Always-asynchronous key/value storage over a transactional engine.
//!
//! Every call on a [`Store`] is queued and executed in call order by a
//! single consumer task. Consecutive operations share one engine session
//! while it stays alive. Each call returns its own [`ResultHandle`], so one
//! caller's failure never leaks into another caller's result.
//!
//! ## Quick Start
//!
//! ```ignore
//! use serialstore::prelude::*;
//!
//! let store = Store::memory()?;
//!
//! store.clear();
//! store.set("x", "1");
//! assert!(store.has("x").await?);
//! assert_eq!(store.count().await?, 1);
//! ```
//!
//! ## Layers
//!
//! - `serialstore-core`: [`Value`], [`Error`], keys and operation kinds
//! - `serialstore-engine`: the engine boundary traits
//! - `serialstore-storage`: [`MemoryEngine`], the in-memory reference engine
//! - `serialstore-concurrency`: connection gate, session manager, executor, queue

#![warn(missing_docs)]

mod config;
mod error;
mod store;
mod types;

pub mod prelude;

// Re-export main entry points
pub use config::{StoreConfig, DEFAULT_NAME, DEFAULT_STORE_NAME};
pub use error::{ConfigError, Error, Result};
pub use store::{Store, StoreBuilder};

// Re-export types
pub use types::*;
