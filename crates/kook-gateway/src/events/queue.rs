//! Dispatch queue
//!
//! Hands released events from the socket loop to a per-account worker task,
//! which runs them through the dispatcher one at a time in release order. The
//! socket loop never waits on the reply router, so heartbeats and
//! cancellation stay responsive while a reply is in flight.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::dispatcher::EventDispatcher;

/// One released event and the bot identity at release time
#[derive(Debug)]
struct QueuedEvent {
    payload: Value,
    self_user_id: String,
}

type Worker = (EventDispatcher, mpsc::UnboundedReceiver<QueuedEvent>);

/// Ordered hand-off between the socket loop and the dispatch worker
pub struct DispatchQueue {
    tx: mpsc::UnboundedSender<QueuedEvent>,
    worker: Option<Worker>,
}

impl DispatchQueue {
    pub fn new(dispatcher: EventDispatcher) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            worker: Some((dispatcher, rx)),
        }
    }

    /// Spawn the worker in the current span
    ///
    /// Returns `None` if the worker was already started. The worker stops when
    /// `cancel` fires, abandoning the event in flight and any still queued.
    pub fn start(&mut self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let (dispatcher, rx) = self.worker.take()?;
        Some(tokio::spawn(drain(dispatcher, rx, cancel).in_current_span()))
    }

    /// Queue one event; events queued before `start` wait for the worker
    pub fn push(&self, payload: Value, self_user_id: &str) {
        let event = QueuedEvent {
            payload,
            self_user_id: self_user_id.to_string(),
        };
        if self.tx.send(event).is_err() {
            tracing::debug!("Dispatch worker gone, event discarded");
        }
    }
}

async fn drain(
    dispatcher: EventDispatcher,
    mut rx: mpsc::UnboundedReceiver<QueuedEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!(queued = rx.len(), "Dispatch abandoned on shutdown");
                break;
            }
            _ = dispatcher.dispatch(event.payload, &event.self_user_id) => {}
        }
    }
}
