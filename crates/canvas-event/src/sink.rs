//! Event sinks.

use std::collections::VecDeque;

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;

use crate::CanvasEvent;

/// Receiver of store notifications.
///
/// `emit` is called while the store still holds its write guard, so
/// implementations must not call back into the store.
pub trait EventSink: Send + Sync + 'static {
    /// Deliver one event. Delivery is fire-and-forget.
    fn emit(&self, event: CanvasEvent);
}

// Implement EventSink for closures
impl<F> EventSink for F
where
    F: Fn(&CanvasEvent) + Send + Sync + 'static,
{
    fn emit(&self, event: CanvasEvent) {
        self(&event);
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CanvasEvent) {}
}

/// In-memory FIFO buffer of emitted events.
#[derive(Default)]
pub struct EventQueue {
    events: Mutex<VecDeque<CanvasEvent>>,
}

impl EventQueue {
    /// Create a new empty event queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest event.
    pub fn pop(&self) -> Option<CanvasEvent> {
        self.events.lock().pop_front()
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&self) -> Vec<CanvasEvent> {
        self.events.lock().drain(..).collect()
    }

    /// Copy of the buffered events without consuming them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CanvasEvent> {
        self.events.lock().iter().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for EventQueue {
    fn emit(&self, event: CanvasEvent) {
        self.events.lock().push_back(event);
    }
}

impl core::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .finish()
    }
}

/// Forwards events to a channel consumer (indexer, UI bridge).
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<CanvasEvent>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel.
    ///
    /// Emission never blocks: the store is holding its write guard while it
    /// emits, so waiting on a full bounded channel would stall every other
    /// caller. Events that do not fit are dropped with a warning; use an
    /// unbounded channel if the consumer must see every event.
    #[must_use]
    pub const fn new(tx: Sender<CanvasEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: CanvasEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!("Dropped {} for {}: channel full", event.name(), event.key());
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::debug!("Dropped {} for {}: receiver gone", event.name(), event.key());
            }
        }
    }
}
