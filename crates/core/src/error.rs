//! Error types for serialstore
//!
//! One error type travels through the whole stack, from the engine boundary
//! up to each caller's result handle. It is `Clone` because a single failure
//! can be observed by many callers: a failed open is handed to every queued
//! operation, and a failed bulk visit is delivered both to its caller and to
//! the chain's tail.
//!
//! | Variant | Origin | Recovery |
//! |---------|--------|----------|
//! | `OpenFailure` | connection gate | none, terminal for the store |
//! | `Unavailable` | host/engine availability check | none |
//! | `Primitive` | single engine request | surfaced to the caller only |
//! | `SessionInactive` | engine reports a closed session | next acquire reopens |
//! | `Visit` | caller's iteration callback | surfaced, also recorded on the chain |

use crate::types::OperationKind;
use std::sync::Arc;
use thiserror::Error;

/// All serialstore errors.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The engine could not be opened or provisioned
    #[error("failed to open '{name}': {reason}")]
    OpenFailure {
        /// Database name passed to the engine
        name: String,
        /// Engine-reported cause
        reason: String,
    },

    /// The host lacks what the store needs
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A single engine request failed
    #[error("{kind} failed: {reason}")]
    Primitive {
        /// Operation whose primitive failed
        kind: OperationKind,
        /// Engine-reported cause
        reason: String,
    },

    /// The engine refused a request because the session already ended
    #[error("session is no longer active: {0}")]
    SessionInactive(String),

    /// The caller-supplied visit callback failed during iteration
    #[error("visit callback failed: {0}")]
    Visit(Arc<anyhow::Error>),

    /// A stored value could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The queue's consumer task is gone
    #[error("operation queue is closed")]
    QueueClosed,

    /// Bug or invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for serialstore operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a visit callback failure.
    pub fn visit(err: anyhow::Error) -> Self {
        Error::Visit(Arc::new(err))
    }

    /// Check if this is a terminal open failure.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, Error::OpenFailure { .. })
    }

    /// Check if this came from an engine primitive.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Error::Primitive { .. } | Error::Serialization(_))
    }

    /// Check if the engine reported the session as ended.
    pub fn is_session_inactive(&self) -> bool {
        matches!(self, Error::SessionInactive(_))
    }

    /// Check if this came from a visit callback.
    pub fn is_visit(&self) -> bool {
        matches!(self, Error::Visit(_))
    }

    /// The visit callback's own error, if this is a visit failure.
    pub fn visit_error(&self) -> Option<&anyhow::Error> {
        match self {
            Error::Visit(e) => Some(e),
            _ => None,
        }
    }
}
