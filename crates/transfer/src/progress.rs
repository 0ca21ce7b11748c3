//! Progress-event delivery.
//!
//! The engine pushes events into a bounded queue owned by at most one
//! observer. Emission never blocks the transfer loop: with no observer
//! attached, or with a full queue, the event is dropped. There is no
//! buffering or replay — an observer attached after an event has fired
//! misses it permanently.

use tokio::sync::mpsc;

use udrop_protocol::ProgressEvent;

/// Default depth of the observer queue.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Hands transfer-engine events to the registered observer, if any.
#[derive(Debug, Default)]
pub struct ProgressEmitter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an observer, replacing any previous one.
    ///
    /// The previous observer's queue is closed; its receiver drains what it
    /// already holds and then sees the end of the stream.
    pub fn subscribe(&mut self) -> mpsc::Receiver<ProgressEvent> {
        self.subscribe_with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// [`subscribe`](Self::subscribe) with an explicit queue depth.
    pub fn subscribe_with_capacity(&mut self, capacity: usize) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(capacity);
        self.tx = Some(tx);
        rx
    }

    /// Detaches the current observer.
    pub fn unsubscribe(&mut self) {
        self.tx = None;
    }

    /// Pushes one event; never blocks, never fails.
    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(event);
        }
    }
}
