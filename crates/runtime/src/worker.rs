//! Async front end for the orchestrator.
//!
//! [`SyncWorker`] owns the scene store and the refresh sink. Host events arrive
//! over an mpsc channel; everything already queued when the worker wakes up
//! forms one batch. After flushing, the worker yields once and flushes again
//! so tokens created in the batch are reconciled on the next tick.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use vision_core::TokenStore;

use crate::error::{Result, RuntimeError};
use crate::events::SyncEvent;
use crate::orchestrator::{BatchReport, Orchestrator};
use crate::sink::PerceptionSink;

/// Commands accepted by the sync worker.
pub enum Command {
    Event(SyncEvent),
    /// Replies once everything sent before it has been processed.
    Sync { reply: oneshot::Sender<BatchReport> },
}

/// Sending side of a running [`SyncWorker`]. Dropping every handle stops it.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::Sender<Command>,
}

impl SyncHandle {
    pub async fn send(&self, event: SyncEvent) -> Result<()> {
        self.tx
            .send(Command::Event(event))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Waits until every earlier event has been processed, including the
    /// deferred flush, and returns the combined report of all batches since
    /// the previous `sync`.
    pub async fn sync(&self) -> Result<BatchReport> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Sync { reply })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}

pub struct SyncWorker<S, K> {
    orchestrator: Orchestrator,
    store: S,
    sink: K,
    command_rx: mpsc::Receiver<Command>,
    /// Batches processed since the last `Sync` reply.
    unreported: BatchReport,
}

impl<S, K> SyncWorker<S, K>
where
    S: TokenStore + Send + 'static,
    K: PerceptionSink + Send + 'static,
{
    pub fn new(
        orchestrator: Orchestrator,
        store: S,
        sink: K,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            sink,
            command_rx,
            unreported: BatchReport::default(),
        }
    }

    /// Spawns a worker on the current tokio runtime.
    ///
    /// The join handle yields the store and sink back once every handle is dropped.
    pub fn spawn(
        orchestrator: Orchestrator,
        store: S,
        sink: K,
        buffer: usize,
    ) -> (SyncHandle, JoinHandle<(S, K)>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let worker = Self::new(orchestrator, store, sink, rx);
        (SyncHandle { tx }, tokio::spawn(worker.run()))
    }

    /// Main worker loop. Returns the store and sink when the channel closes.
    pub async fn run(mut self) -> (S, K) {
        while let Some(first) = self.command_rx.recv().await {
            let mut replies = Vec::new();
            self.dispatch(first, &mut replies);
            while let Ok(command) = self.command_rx.try_recv() {
                self.dispatch(command, &mut replies);
            }

            let report = self.flush();
            self.unreported.merge(report);
            tokio::task::yield_now().await;
            if self.orchestrator.has_pending() {
                let deferred = self.flush();
                self.unreported.merge(deferred);
            }

            if replies.is_empty() {
                continue;
            }
            let report = std::mem::take(&mut self.unreported);
            for reply in replies {
                if reply.send(report.clone()).is_err() {
                    debug!(target: "runtime::worker", "sync reply channel closed (caller dropped)");
                }
            }
        }

        info!(target: "runtime::worker", "sync worker stopped");
        (self.store, self.sink)
    }

    fn dispatch(&mut self, command: Command, replies: &mut Vec<oneshot::Sender<BatchReport>>) {
        match command {
            Command::Event(event) => {
                self.orchestrator.handle(event);
            }
            Command::Sync { reply } => replies.push(reply),
        }
    }

    fn flush(&mut self) -> BatchReport {
        self.orchestrator.flush(&mut self.store, &mut self.sink)
    }
}
