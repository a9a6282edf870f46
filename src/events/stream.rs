//! Broadcast stream for application events.
//!
//! [`EventStream`] is a thin wrapper around [`tokio::sync::broadcast`] that
//! lets producers and dispatch loops exchange events.
//!
//! - [`EventStream::publish`] sends an event to all subscribers (non-blocking).
//! - [`EventStream::subscribe`] creates a new receiver for consuming events.
//!
//! Each receiver observes matching events in publication order. A receiver
//! that lags behind more than the stream capacity skips the oldest events;
//! dispatch loops log this and continue.

use tokio::sync::broadcast;

use crate::events::Event;

/// Broadcast channel for application events.
///
/// Wrapper over [`tokio::sync::broadcast`] that provides `publish`/`subscribe`
/// methods for working with any [`Event`] type.
pub struct EventStream<E: Event> {
    tx: broadcast::Sender<E>,
}

impl<E: Event> Clone for EventStream<E> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<E: Event> EventStream<E> {
    /// Creates a new stream with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Errors are ignored if there are no active subscribers.
    pub fn publish(&self, ev: E) {
        let _ = self.tx.send(ev);
    }

    /// Subscribes to the stream and returns a new receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
