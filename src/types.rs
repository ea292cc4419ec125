//! Public types for the serialstore API.
//!
//! This module re-exports types from the internal crates with a single
//! public surface.

// Values and keys
pub use serialstore_core::{Key, OperationKind, Value};

// Queue types
pub use serialstore_concurrency::{
    ConnectionState, Outcome, QueueEntry, QueueMetricsSnapshot, ResultHandle,
};

// Engine boundary, for plugging in another engine
pub use serialstore_engine::{
    Connection, Cursor, EndListener, Engine, EngineError, EngineResult, Schema, Session,
    SessionEnd, SessionId, SessionMode,
};

// Reference engine
pub use serialstore_storage::{
    EngineStats, MemoryEngine, MemoryEngineConfig, RequestKind, RequestRecord,
};
