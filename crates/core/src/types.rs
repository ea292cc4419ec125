//! Core types shared by every layer
//!
//! - [`Key`]: store keys (UTF-8 strings, ordered lexicographically)
//! - [`OperationKind`]: the storage operations a caller can queue

use serde::{Deserialize, Serialize};

/// A store key.
///
/// Keys are ordered by byte-wise string comparison; cursors visit entries
/// in that order.
pub type Key = String;

/// The kind of storage operation carried by a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Fetch a value by key
    Get,
    /// Store a value at a key
    Set,
    /// Remove a key
    Delete,
    /// Remove every entry
    Clear,
    /// Test whether a key is present
    Has,
    /// Count every entry
    Count,
    /// Visit every entry in key order
    ForEach,
    /// List every key in order
    Keys,
}

impl OperationKind {
    /// Lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Get => "get",
            OperationKind::Set => "set",
            OperationKind::Delete => "delete",
            OperationKind::Clear => "clear",
            OperationKind::Has => "has",
            OperationKind::Count => "count",
            OperationKind::ForEach => "for_each",
            OperationKind::Keys => "keys",
        }
    }

    /// Whether a failure of this operation is confined to its own result.
    ///
    /// Bulk visits are the only operations whose failure is also recorded
    /// on the chain.
    pub fn isolates_failure(&self) -> bool {
        !matches!(self, OperationKind::ForEach)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
