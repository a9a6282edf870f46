//! # Global error sink.
//!
//! Every caught worker failure is normalized into a
//! [`Fault`](crate::error::Fault) and handed to an [`ErrorSink`]. The sink is
//! injected into the dispatch layer at construction time and lives as long as
//! the subsystem, so there is no implicit global state.
//!
//! [`StreamSink`] is the standard implementation: it converts each fault into
//! the application's well-known global-error event and publishes it back into
//! the [`EventStream`], where a system-wide handler (external to this crate)
//! can react. [`NullSink`] discards faults and exists for tests.

use std::sync::Arc;

use crate::error::Fault;
use crate::events::{Event, EventStream};

/// Destination for normalized worker failures.
///
/// `report` must not block: it is called from inside dispatch loops that must
/// keep draining their sources.
pub trait ErrorSink: Send + Sync + 'static {
    /// Delivers one normalized fault. Called exactly once per caught failure.
    fn report(&self, fault: Fault);
}

/// Sink that converts faults into global-error events on an [`EventStream`].
///
/// The constructor closure maps a [`Fault`] to the application's error event
/// kind, so the crate never needs to know how user events are shaped.
///
/// ## Example
/// ```rust
/// use evroute::{ErrorSink, Event, EventStream, Fault, StreamSink};
///
/// #[derive(Clone, Debug)]
/// enum Msg { GlobalError { message: String } }
///
/// impl Event for Msg {
///     fn tag(&self) -> &str { "global_error" }
/// }
///
/// let stream = EventStream::new(16);
/// let sink = StreamSink::new(stream.clone(), |fault: Fault| Msg::GlobalError {
///     message: fault.message,
/// });
/// sink.report(Fault { label: "worker_failed", message: "boom".into() });
/// ```
pub struct StreamSink<E: Event, F> {
    stream: EventStream<E>,
    make_event: F,
}

impl<E: Event, F> StreamSink<E, F>
where
    F: Fn(Fault) -> E + Send + Sync + 'static,
{
    /// Creates a sink publishing into `stream` via the given event constructor.
    pub fn new(stream: EventStream<E>, make_event: F) -> Arc<Self> {
        Arc::new(Self { stream, make_event })
    }
}

impl<E: Event, F> ErrorSink for StreamSink<E, F>
where
    F: Fn(Fault) -> E + Send + Sync + 'static,
{
    fn report(&self, fault: Fault) {
        self.stream.publish((self.make_event)(fault));
    }
}

/// Sink that discards every fault. Useful in tests and demos.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ErrorSink for NullSink {
    fn report(&self, _fault: Fault) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum Msg {
        GlobalError { message: String },
    }

    impl Event for Msg {
        fn tag(&self) -> &str {
            "global_error"
        }
    }

    #[tokio::test]
    async fn test_stream_sink_publishes_global_error() {
        let stream = EventStream::new(4);
        let mut rx = stream.subscribe();
        let sink = StreamSink::new(stream.clone(), |fault: Fault| Msg::GlobalError {
            message: fault.message,
        });

        sink.report(Fault {
            label: "worker_failed",
            message: "boom".into(),
        });

        let Msg::GlobalError { message } = rx.recv().await.unwrap();
        assert_eq!(message, "boom");
    }
}
