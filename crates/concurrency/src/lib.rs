//! Operation serialization for serialstore
//!
//! This crate turns an engine with short-lived sessions into an ordered,
//! always-asynchronous operation stream:
//! - ConnectionGate: one memoized open per store
//! - SessionManager: session reuse with staleness probing
//! - OperationExecutor: entry-to-request mapping and cursor iteration
//! - OperationQueue: FIFO submission with a single consumer task

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod executor;
pub mod gate;
pub mod metrics;
pub mod queue;
pub mod session;

pub use entry::{count_to_presence, Outcome, QueueEntry, ResultTransform, VisitFn};
pub use executor::OperationExecutor;
pub use gate::{ConnectionGate, ConnectionState};
pub use metrics::{QueueMetrics, QueueMetricsSnapshot};
pub use queue::{OperationQueue, QueueSettings, ResultHandle};
pub use session::SessionManager;
