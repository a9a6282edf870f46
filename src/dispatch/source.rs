//! # Event sources for dispatch loops.
//!
//! An [`EventSource`] is where a policy loop reads from: either a
//! subscription on the broadcast stream, or an explicit queue handle (for
//! [`Pattern::Queue`] bindings, whose producer already pre-filtered the
//! items). Queue sources additionally watch the stream so conflict
//! predicates still see later events.
//!
//! `next()` yields every observed event in arrival order, classified as
//! [`Observed::Trigger`] (matches the binding's pattern, a worker instance
//! is due) or [`Observed::Other`] (visible for conflict evaluation only),
//! and returns `None` once the source ends (stream closed, or queue closed
//! and drained). A lagging stream subscription skips the oldest events with
//! a warning and keeps going; dropping events for a slow loop is preferable
//! to stalling the publisher.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;

use crate::dispatch::Pattern;
use crate::events::{Event, EventStream};
use crate::queue::ChanQueue;

/// One event observed by a dispatch loop.
#[derive(Debug)]
pub(crate) enum Observed<E> {
    /// Matches the binding's pattern; a worker instance is due.
    Trigger(E),
    /// Any other event, delivered so conflict predicates see it in order.
    Other(E),
}

impl<E> Observed<E> {
    pub(crate) fn event(&self) -> &E {
        match self {
            Observed::Trigger(e) | Observed::Other(e) => e,
        }
    }
}

/// Where a dispatch loop takes its events from.
pub(crate) enum EventSource<E: Event> {
    Stream {
        rx: broadcast::Receiver<E>,
        pattern: Pattern<E>,
    },
    Queue {
        queue: Arc<ChanQueue<E>>,
        // Stream watch for conflict evaluation; None once the stream closes.
        rx: Option<broadcast::Receiver<E>>,
    },
}

impl<E: Event> EventSource<E> {
    /// Builds a source for the given pattern. Subscribes to the stream
    /// either as the trigger feed or, for queue patterns, as the side watch.
    pub(crate) fn from_pattern(pattern: Pattern<E>, stream: &EventStream<E>) -> Self {
        match pattern {
            Pattern::Queue(queue) => EventSource::Queue {
                queue,
                rx: Some(stream.subscribe()),
            },
            other => EventSource::Stream {
                rx: stream.subscribe(),
                pattern: other,
            },
        }
    }

    /// Waits for the next observed event; `None` when the source ends.
    pub(crate) async fn next(&mut self) -> Option<Observed<E>> {
        match self {
            EventSource::Stream { rx, pattern } => loop {
                match rx.recv().await {
                    Ok(ev) if pattern.matches(&ev) => return Some(Observed::Trigger(ev)),
                    Ok(ev) => return Some(Observed::Other(ev)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "dispatch source lagged; skipping oldest events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            },
            EventSource::Queue { queue, rx } => loop {
                let Some(watch) = rx.as_mut() else {
                    return queue.take().await.ok().map(Observed::Trigger);
                };
                let mut watch_closed = false;
                tokio::select! {
                    item = queue.take() => return item.ok().map(Observed::Trigger),
                    observed = watch.recv() => match observed {
                        Ok(ev) => return Some(Observed::Other(ev)),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "dispatch source lagged; skipping oldest events");
                        }
                        Err(broadcast::error::RecvError::Closed) => watch_closed = true,
                    },
                }
                if watch_closed {
                    *rx = None;
                }
            },
        }
    }
}
