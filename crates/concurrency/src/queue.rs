//! Operation queue
//!
//! Every storage operation is submitted as a [`QueueEntry`] and executed by
//! a single consumer task in submission order. At most one entry is in
//! flight at a time, so entries never interleave their engine requests.
//!
//! ## Worker loop
//!
//! ```text
//! recv entry
//!   -> gate.ensure_open()          (memoized; first entry pays for the open)
//!   -> sessions.acquire()          (reuse, probe, or begin)
//!   -> executor.run()
//!   -> reply to the entry's handle
//!   -> settle delay
//! ```
//!
//! ## Chain state
//!
//! Each processed entry replaces the chain state with its own result. A
//! failed entry marked non-isolated leaves the chain failed until the next
//! entry runs; isolated failures leave it healthy. [`OperationQueue::tail`]
//! observes the state after every previously submitted entry has finished.
//! A failure never stops later entries from executing.

use crate::entry::{Outcome, QueueEntry};
use crate::executor::OperationExecutor;
use crate::gate::ConnectionGate;
use crate::metrics::{QueueMetrics, QueueMetricsSnapshot};
use crate::session::SessionManager;
use serialstore_core::{Error, OperationKind, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};
use uuid::Uuid;

type Reply = oneshot::Sender<Result<Outcome>>;

enum Message {
    Run { entry: QueueEntry, reply: Reply },
    Tail { reply: Reply },
}

impl Message {
    fn reject(self, err: Error) {
        match self {
            Message::Run { reply, .. } | Message::Tail { reply } => {
                let _ = reply.send(Err(err));
            }
        }
    }
}

/// Worker settings.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Pause after each entry before the next one starts.
    ///
    /// Zero yields to the runtime once instead of sleeping.
    pub settle_delay: Duration,
    /// Probe a cached session before reusing it.
    pub probe_before_reuse: bool,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            probe_before_reuse: true,
        }
    }
}

/// Future resolving to the result of one submitted entry.
///
/// Dropping the handle does not cancel the entry; it still executes in
/// order and its result is discarded.
pub struct ResultHandle<T> {
    rx: oneshot::Receiver<Result<Outcome>>,
    extract: fn(Outcome) -> Result<T>,
}

impl<T> ResultHandle<T> {
    fn new(rx: oneshot::Receiver<Result<Outcome>>, extract: fn(Outcome) -> Result<T>) -> Self {
        Self { rx, extract }
    }
}

impl<T> Future for ResultHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let extract = self.extract;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result.and_then(extract)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::QueueClosed)),
        }
    }
}

impl<T> std::fmt::Debug for ResultHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultHandle").finish_non_exhaustive()
    }
}

/// FIFO queue feeding a single consumer task.
pub struct OperationQueue {
    id: Uuid,
    tx: mpsc::UnboundedSender<Message>,
    gate: Arc<ConnectionGate>,
    metrics: Arc<QueueMetrics>,
}

impl OperationQueue {
    /// Start a queue on the current tokio runtime.
    ///
    /// Fails with [`Error::Unavailable`] outside a runtime.
    pub fn spawn(gate: Arc<ConnectionGate>, settings: QueueSettings) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Unavailable(format!("no async runtime: {}", e)))?;

        let id = Uuid::new_v4();
        let metrics = Arc::new(QueueMetrics::default());
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = QueueWorker {
            id,
            gate: Arc::clone(&gate),
            sessions: SessionManager::new(
                gate.store_name(),
                settings.probe_before_reuse,
                Arc::clone(&metrics),
            ),
            executor: OperationExecutor::new(),
            settle_delay: settings.settle_delay,
            chain_failure: None,
            metrics: Arc::clone(&metrics),
        };
        runtime.spawn(worker.run(rx));
        debug!(queue = %id, database = %gate.name(), "operation queue started");

        Ok(Self {
            id,
            tx,
            gate,
            metrics,
        })
    }

    /// Queue identifier, used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The gate this queue opens through.
    pub fn gate(&self) -> &ConnectionGate {
        &self.gate
    }

    /// Append `entry` and return a handle to its raw outcome.
    ///
    /// Never blocks and never fails synchronously; a closed queue resolves
    /// the handle to [`Error::QueueClosed`].
    pub fn submit(&self, entry: QueueEntry) -> ResultHandle<Outcome> {
        self.submit_as(entry, Ok)
    }

    /// Append `entry` and return a handle that converts its outcome with
    /// `extract`.
    pub fn submit_as<T>(
        &self,
        entry: QueueEntry,
        extract: fn(Outcome) -> Result<T>,
    ) -> ResultHandle<T> {
        let (reply, rx) = oneshot::channel();
        self.metrics.record_submitted();
        trace!(queue = %self.id, kind = %entry.kind(), key = ?entry.key(), "entry submitted");
        self.send(Message::Run { entry, reply });
        ResultHandle::new(rx, extract)
    }

    /// Resolve once every previously submitted entry has finished, with the
    /// chain state left by the last of them.
    pub fn tail(&self) -> ResultHandle<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::Tail { reply });
        ResultHandle::new(rx, Outcome::into_unit)
    }

    /// Current counters.
    pub fn metrics(&self) -> QueueMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn send(&self, message: Message) {
        if let Err(mpsc::error::SendError(message)) = self.tx.send(message) {
            message.reject(Error::QueueClosed);
        }
    }
}

impl std::fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationQueue")
            .field("id", &self.id)
            .field("gate", &self.gate)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}

struct QueueWorker {
    id: Uuid,
    gate: Arc<ConnectionGate>,
    sessions: SessionManager,
    executor: OperationExecutor,
    settle_delay: Duration,
    chain_failure: Option<Error>,
    metrics: Arc<QueueMetrics>,
}

impl QueueWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>) {
        let mut seq = 0u64;
        while let Some(message) = rx.recv().await {
            match message {
                Message::Run { entry, reply } => {
                    seq += 1;
                    self.process(seq, entry, reply).await;
                }
                Message::Tail { reply } => {
                    let state = match &self.chain_failure {
                        Some(err) => Err(err.clone()),
                        None => Ok(Outcome::Unit),
                    };
                    let _ = reply.send(state);
                }
            }
        }
        self.sessions.invalidate();
        debug!(queue = %self.id, processed = seq, "operation queue stopped");
    }

    async fn process(&mut self, seq: u64, entry: QueueEntry, reply: Reply) {
        let kind = entry.kind();
        let isolated = entry.is_isolated();
        trace!(queue = %self.id, seq, %kind, "entry started");

        let result = self.execute(kind, entry).await;
        self.metrics.record_result(result.is_ok());

        self.chain_failure = match &result {
            Ok(_) => None,
            Err(err) => {
                debug!(queue = %self.id, seq, %kind, isolated, error = %err, "entry failed");
                if isolated {
                    None
                } else {
                    Some(err.clone())
                }
            }
        };

        if reply.send(result).is_err() {
            trace!(queue = %self.id, seq, "result handle dropped before completion");
        }

        self.settle().await;
    }

    async fn execute(&mut self, kind: OperationKind, entry: QueueEntry) -> Result<Outcome> {
        let conn = self.gate.ensure_open().await?;
        let session = self.sessions.acquire(conn.as_ref(), kind).await?;
        let result = self.executor.run(entry, session.as_ref()).await;
        if matches!(&result, Err(err) if err.is_session_inactive()) {
            self.sessions.invalidate();
        }
        result
    }

    async fn settle(&self) {
        if self.settle_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}
