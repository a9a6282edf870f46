//! # Worker abstraction.
//!
//! A [`Worker`] is the unit a dispatch policy runs per triggering event. It
//! receives the event and a [`CancellationToken`] and should check the token
//! at its suspension points, releasing owned resources before returning.
//! The common handle type is [`WorkerRef`], an `Arc<dyn Worker>` suitable
//! for sharing across dispatch loops.
//!
//! Workers return nothing observable on success beyond whatever events they
//! publish themselves; failures are contained by the policy that spawned
//! them and never propagate past it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::WorkerError;
use crate::events::Event;

/// Predicate linking a triggering event to a later conflicting one.
pub type ConflictFn<E> = Arc<dyn Fn(&E, &E) -> bool + Send + Sync>;

/// # Asynchronous, cancelable unit of reaction to one event.
///
/// Implementors should regularly check `ctx.is_cancelled()` (or select on
/// `ctx.cancelled()`) and exit promptly when superseded or during shutdown.
/// Returning [`WorkerError::Canceled`] marks a graceful early exit; any
/// other error is normalized and reported by the containment wrapper.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use tokio_util::sync::CancellationToken;
/// use evroute::{Event, Worker, WorkerError};
///
/// #[derive(Clone, Debug)]
/// struct Note(String);
/// impl Event for Note {
///     fn tag(&self) -> &str { "note" }
/// }
///
/// struct Printer;
///
/// #[async_trait]
/// impl Worker<Note> for Printer {
///     fn name(&self) -> &str { "printer" }
///
///     async fn run(&self, ev: Note, ctx: CancellationToken) -> Result<(), WorkerError> {
///         if ctx.is_cancelled() {
///             return Err(WorkerError::Canceled);
///         }
///         println!("{}", ev.0);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Worker<E: Event>: Send + Sync + 'static {
    /// Returns a stable, human-readable worker name (for logs).
    fn name(&self) -> &str;

    /// Handles one triggering event until completion or cancellation.
    async fn run(&self, event: E, ctx: CancellationToken) -> Result<(), WorkerError>;

    /// Conflict predicate for conditional early cancellation.
    ///
    /// Dispatch loops call this once per binding. When `Some`, every event
    /// the loop observes after an instance's trigger is tested with
    /// `predicate(&trigger, &later)` in publication order, and the instance
    /// token is cancelled on the first match. Plain workers keep the
    /// default `None`; wrappers built by
    /// [`Dispatcher::cancel_when`](crate::Dispatcher::cancel_when) supply
    /// theirs.
    fn conflict_predicate(&self) -> Option<ConflictFn<E>> {
        None
    }
}

/// Shared handle to a worker.
pub type WorkerRef<E> = Arc<dyn Worker<E>>;
