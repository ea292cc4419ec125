//! Engine error types.

use serialstore_core::{Error, OperationKind};
use thiserror::Error;

/// Errors reported by a transactional engine.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine cannot run in this environment.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The database exists at a newer version than requested.
    #[error("requested version {requested} is older than existing version {existing}")]
    VersionDowngrade {
        /// Version passed to `open`
        requested: u32,
        /// Version already on record
        existing: u32,
    },

    /// The upgrade hook failed while provisioning stores.
    #[error("upgrade failed: {0}")]
    Upgrade(String),

    /// A session was requested on a store that does not exist.
    #[error("store not found: {0}")]
    StoreNotFound(String),

    /// The session already completed, aborted, or errored.
    #[error("session {0} is not active")]
    SessionInactive(u64),

    /// A write was issued on a read-only session.
    #[error("session {0} is read-only")]
    ReadOnly(u64),

    /// A value could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A request failed for an engine-specific reason.
    #[error("request failed: {0}")]
    Request(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Convert into the store error for a request made on behalf of `kind`.
    pub fn for_operation(self, kind: OperationKind) -> Error {
        match self {
            EngineError::SessionInactive(id) => {
                Error::SessionInactive(format!("session {} ended before {}", id, kind))
            }
            EngineError::Encoding(msg) => Error::Serialization(msg),
            EngineError::Unavailable(msg) => Error::Unavailable(msg),
            other => Error::Primitive {
                kind,
                reason: other.to_string(),
            },
        }
    }

    /// Convert into the store error for a failed open of `name`.
    pub fn for_open(self, name: &str) -> Error {
        Error::OpenFailure {
            name: name.to_string(),
            reason: self.to_string(),
        }
    }
}
