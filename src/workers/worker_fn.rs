//! # Function-backed worker (`WorkerFn`)
//!
//! [`WorkerFn`] wraps a closure `F: Fn(E, CancellationToken) -> Fut`,
//! producing a fresh future per dispatched event. Each invocation owns its
//! own state; if shared state is needed, capture an `Arc<...>` explicitly
//! inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use evroute::{Event, Worker, WorkerError, WorkerFn, WorkerRef};
//!
//! #[derive(Clone, Debug)]
//! struct Note(String);
//! impl Event for Note {
//!     fn tag(&self) -> &str { "note" }
//! }
//!
//! let w: WorkerRef<Note> = WorkerFn::arc("echo", |ev: Note, _ctx: CancellationToken| async move {
//!     let _ = ev;
//!     Ok::<_, WorkerError>(())
//! });
//!
//! assert_eq!(w.name(), "echo");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::events::Event;
use crate::workers::Worker;

/// Closure-backed worker implementation.
///
/// Wraps a closure that *creates* a new future per dispatched event.
pub struct WorkerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkerFn<F> {
    /// Creates a new function-backed worker.
    ///
    /// Prefer [`WorkerFn::arc`] when you immediately need a [`WorkerRef`](crate::workers::WorkerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the worker and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<E, F, Fut> Worker<E> for WorkerFn<F>
where
    E: Event,
    F: Fn(E, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), WorkerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, event: E, ctx: CancellationToken) -> Result<(), WorkerError> {
        (self.f)(event, ctx).await
    }
}
