//! # Pure-function worker (`EmitFn`)
//!
//! Some reactions to an event are plain synchronous computations whose only
//! effect is emitting further events. [`EmitFn`] adapts such a function
//! `Fn(&E) -> Vec<E>` into a [`Worker`]: every returned event is published
//! back into the [`EventStream`], and the function body never needs to know
//! about the async substrate.
//!
//! Panics inside the function are contained by the dispatch policy like any
//! other worker failure.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::events::{Event, EventStream};
use crate::workers::Worker;

/// Worker backed by a synchronous function returning events to publish.
///
/// ## Example
/// ```rust
/// use evroute::{EmitFn, Event, EventStream, Worker, WorkerRef};
///
/// #[derive(Clone, Debug)]
/// enum Msg { Ping, Pong }
/// impl Event for Msg {
///     fn tag(&self) -> &str {
///         match self { Msg::Ping => "ping", Msg::Pong => "pong" }
///     }
/// }
///
/// let stream = EventStream::new(16);
/// let w: WorkerRef<Msg> = EmitFn::arc("ponger", stream.clone(), |_ev: &Msg| vec![Msg::Pong]);
/// assert_eq!(w.name(), "ponger");
/// ```
pub struct EmitFn<E: Event, F> {
    name: Cow<'static, str>,
    stream: EventStream<E>,
    f: F,
}

impl<E, F> EmitFn<E, F>
where
    E: Event,
    F: Fn(&E) -> Vec<E> + Send + Sync + 'static,
{
    /// Creates a new pure-function worker publishing into `stream`.
    pub fn new(name: impl Into<Cow<'static, str>>, stream: EventStream<E>, f: F) -> Self {
        Self {
            name: name.into(),
            stream,
            f,
        }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, stream: EventStream<E>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, stream, f))
    }
}

#[async_trait]
impl<E, F> Worker<E> for EmitFn<E, F>
where
    E: Event,
    F: Fn(&E) -> Vec<E> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, event: E, _ctx: CancellationToken) -> Result<(), WorkerError> {
        for out in (self.f)(&event) {
            self.stream.publish(out);
        }
        Ok(())
    }
}
