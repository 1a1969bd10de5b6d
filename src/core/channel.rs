//! Bounded multi-producer, single-consumer queue for [`ChatEvent`]s.
//!
//! Producers await when the queue is full, so a stalled consumer applies
//! backpressure instead of dropping events. Order is preserved per producer;
//! events from different producers are ordered by arrival.

use std::fmt;

use tokio::sync::mpsc;

use crate::core::event::ChatEvent;

pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Returned when pushing into a channel whose consumer has shut down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelClosed(pub ChatEvent);

impl fmt::Display for ChannelClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event channel closed; dropped {} event", self.0.kind())
    }
}

impl std::error::Error for ChannelClosed {}

/// Producer half. Cheap to clone; hand one to each event source.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ChatEvent>,
}

impl EventSender {
    /// Enqueue an event, waiting for capacity if the queue is full.
    pub async fn push(&self, event: ChatEvent) -> Result<(), ChannelClosed> {
        self.tx
            .send(event)
            .await
            .map_err(|mpsc::error::SendError(event)| ChannelClosed(event))
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the dispatcher.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<ChatEvent>,
}

impl EventReceiver {
    /// Wait for the next event. `None` once every sender is gone and the
    /// queue is empty.
    pub async fn recv(&mut self) -> Option<ChatEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ChatEvent> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting pushes. Events already queued remain readable.
    pub fn close(&mut self) {
        self.rx.close();
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a channel holding at most `capacity` pending events.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, EventReceiver { rx })
}
