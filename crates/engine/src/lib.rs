//! Transactional engine boundary for serialstore
//!
//! This crate specifies what the store needs from a storage backend and
//! nothing more. Implementations live elsewhere; `serialstore-storage`
//! provides the in-memory reference engine.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;

pub use error::{EngineError, EngineResult};
pub use traits::{
    Connection, Cursor, EndListener, Engine, Schema, Session, SessionEnd, SessionId, SessionMode,
    UpgradeHook,
};
