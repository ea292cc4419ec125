//! In-memory reference engine for serialstore
//!
//! This crate implements the engine boundary with:
//! - MemoryEngine: named, versioned databases with upgrade provisioning
//! - Ordered object stores (BTreeMap, MessagePack-encoded values)
//! - Sessions with completion/abort/error notification
//! - A request log and one-shot fault injection for tests

#![warn(missing_docs)]
#![warn(clippy::all)]

mod engine;
mod faults;
mod object_store;
mod session;

pub use engine::{EngineStats, MemoryConnection, MemoryEngine, MemoryEngineConfig};
pub use faults::{RequestKind, RequestRecord};
pub use session::{MemoryCursor, MemorySession};
