//! Progress observation decoupled from the upload critical path.

use porter_core::UploadPhase;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Caller-supplied observer for phase transitions and part completions.
///
/// Invoked from a dedicated dispatch task, never from a transfer worker, so
/// a slow observer cannot stall the upload. Default methods ignore events.
pub trait UploadObserver: Send + Sync {
    /// Called after every phase transition.
    fn on_phase(&self, phase: UploadPhase) {
        let _ = phase;
    }

    /// Called after every individual part completion, and once with
    /// `(0, total)` right after session creation.
    fn on_part_progress(&self, done: u32, total: u32) {
        let _ = (done, total);
    }
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl UploadObserver for NoopObserver {}

#[derive(Debug)]
enum Event {
    Phase(UploadPhase),
    PartProgress { done: u32, total: u32 },
}

/// Cloneable sending half of the progress pipeline. Sends never block.
#[derive(Clone)]
pub(crate) struct ProgressNotifier {
    tx: mpsc::UnboundedSender<Event>,
}

/// Owning handle for the dispatch task; awaited once all notifiers drop.
pub(crate) struct ProgressDispatch {
    forwarder: JoinHandle<()>,
}

impl ProgressNotifier {
    /// Spawn the dispatch task for an observer and return the pipeline ends.
    pub fn channel(observer: Arc<dyn UploadObserver>) -> (ProgressNotifier, ProgressDispatch) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    Event::Phase(phase) => observer.on_phase(phase),
                    Event::PartProgress { done, total } => observer.on_part_progress(done, total),
                }
            }
        });
        (ProgressNotifier { tx }, ProgressDispatch { forwarder })
    }

    pub fn phase(&self, phase: UploadPhase) {
        let _ = self.tx.send(Event::Phase(phase));
    }

    pub fn part_progress(&self, done: u32, total: u32) {
        let _ = self.tx.send(Event::PartProgress { done, total });
    }
}

impl ProgressDispatch {
    /// Wait for queued events to drain. All `ProgressNotifier` clones must
    /// be dropped first or this never returns.
    pub async fn close(self) {
        let _ = self.forwarder.await;
    }
}
