//! Convenient imports for serialstore.
//!
//! ```ignore
//! use serialstore::prelude::*;
//!
//! let store = Store::memory()?;
//! store.set("key", "value").await?;
//! ```

// Main entry point
pub use crate::store::{Store, StoreBuilder};

// Configuration
pub use crate::config::StoreConfig;

// Error handling
pub use crate::error::{Error, Result};

// Core types
pub use crate::types::{ConnectionState, Key, MemoryEngine, ResultHandle, Value};
