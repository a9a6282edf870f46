//! # Dispatch policies: supervised scheduling of workers over event sources.
//!
//! The [`Dispatcher`] owns the pieces every policy loop needs — the event
//! stream handle, the injected [`ErrorSink`], a runtime
//! [`CancellationToken`], and the [`RouterConfig`] — and builds one
//! [`DispatchUnit`] per binding. A unit is a long-lived loop the caller
//! hands to the scheduling substrate ([`DispatchUnit::spawn`]).
//!
//! ## Policies
//! ```text
//! take_every             every matching event → new contained instance
//!                        (unbounded concurrency, no cross-instance order)
//!
//! take_latest            new matching event → cancel previous instance,
//! take_latest_with_catch spawn replacement (at most one alive per binding)
//!
//! take_serially          matching events → expanding absorber queue →
//!                        one-at-a-time contained execution, arrival order
//!
//! cancel_when            worker wrapper: every event the loop observes
//!                        after an instance's trigger is tested against a
//!                        conflict predicate; the first match cancels the
//!                        instance token
//! ```
//!
//! ## Rules
//! - Every worker instance runs under [`run_contained`]: a failure is
//!   reported through the sink and the loop keeps going.
//! - Every loop exits when the dispatcher's runtime token cancels or its
//!   source ends; nothing else terminates it.
//! - Instance tokens are children of the runtime token, so shutdown
//!   propagates to in-flight workers.
//! - Conflict predicates are evaluated by the loop itself, on the same
//!   receiver that delivers triggers, so a conflict published right after
//!   its trigger is seen even before the instance's first poll.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::config::RouterConfig;
use crate::dispatch::contain::{run_contained, CatchFn};
use crate::dispatch::source::{EventSource, Observed};
use crate::dispatch::Pattern;
use crate::error::WorkerError;
use crate::events::{ErrorSink, Event, EventStream};
use crate::queue::ChanQueue;
use crate::workers::{ConflictFn, Worker, WorkerRef};

use async_trait::async_trait;

/// One scheduled dispatch loop, ready to be handed to the substrate.
pub struct DispatchUnit {
    name: Arc<str>,
    fut: BoxFuture<'static, ()>,
}

impl DispatchUnit {
    fn new(name: &str, fut: BoxFuture<'static, ()>) -> Self {
        Self {
            name: Arc::from(name),
            fut,
        }
    }

    /// Name of the binding this unit serves (for logs).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawns the loop onto the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.fut)
    }

    /// Drives the loop on the current task (tests, custom substrates).
    pub async fn run(self) {
        self.fut.await;
    }
}

impl std::fmt::Debug for DispatchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchUnit").field("name", &self.name).finish()
    }
}

/// One spawned instance tracked for conflict evaluation.
struct LiveInstance<E> {
    trigger: E,
    token: CancellationToken,
    done: CancellationToken,
}

/// Builds supervised dispatch loops bound to one event stream and one sink.
pub struct Dispatcher<E: Event> {
    cfg: RouterConfig,
    stream: EventStream<E>,
    sink: Arc<dyn ErrorSink>,
    runtime_token: CancellationToken,
}

impl<E: Event> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            cfg: self.cfg,
            stream: self.stream.clone(),
            sink: Arc::clone(&self.sink),
            runtime_token: self.runtime_token.clone(),
        }
    }
}

impl<E: Event> Dispatcher<E> {
    /// Creates a dispatcher over the given stream and error sink.
    pub fn new(cfg: RouterConfig, stream: EventStream<E>, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            cfg,
            stream,
            sink,
            runtime_token: CancellationToken::new(),
        }
    }

    /// Token cancelling every loop and in-flight instance built here.
    pub fn runtime_token(&self) -> &CancellationToken {
        &self.runtime_token
    }

    /// Requests shutdown of all loops built by this dispatcher.
    pub fn shutdown(&self) {
        self.runtime_token.cancel();
    }

    /// Handle to the stream this dispatcher reads from.
    pub fn stream(&self) -> &EventStream<E> {
        &self.stream
    }

    /// Fan-out-per-event: a new contained instance per matching event.
    ///
    /// N matching events produce N concurrently running instances with no
    /// ordering guarantee between them.
    pub fn take_every(&self, pattern: Pattern<E>, worker: WorkerRef<E>) -> DispatchUnit {
        let mut source = EventSource::from_pattern(pattern, &self.stream);
        let conflict = worker.conflict_predicate();
        let sink = Arc::clone(&self.sink);
        let rt = self.runtime_token.clone();
        let name = worker.name().to_string();

        DispatchUnit::new(
            &name,
            Box::pin(async move {
                let mut live: Vec<LiveInstance<E>> = Vec::new();
                loop {
                    let observed = tokio::select! {
                        _ = rt.cancelled() => break,
                        ob = source.next() => match ob {
                            Some(ob) => ob,
                            None => break,
                        },
                    };
                    if let Some(pred) = &conflict {
                        live.retain(|li| !li.done.is_cancelled());
                        for li in &live {
                            if pred(&li.trigger, observed.event()) {
                                trace!("conflicting event preempts live instance");
                                li.token.cancel();
                            }
                        }
                    }
                    let Observed::Trigger(event) = observed else { continue };
                    let token = rt.child_token();
                    let done = CancellationToken::new();
                    if conflict.is_some() {
                        live.push(LiveInstance {
                            trigger: event.clone(),
                            token: token.clone(),
                            done: done.clone(),
                        });
                    }
                    let worker = Arc::clone(&worker);
                    let sink = Arc::clone(&sink);
                    tokio::spawn(async move {
                        run_contained(&worker, event, token, &sink, None).await;
                        done.cancel();
                    });
                }
            }),
        )
    }

    /// Latest-only: at most one live instance; stale instances cancelled.
    pub fn take_latest(&self, pattern: Pattern<E>, worker: WorkerRef<E>) -> DispatchUnit {
        self.latest_inner(pattern, worker, None)
    }

    /// Latest-only with a per-binding recovery callback.
    ///
    /// The callback runs once per **caught failure**, after the fault has
    /// been reported, with the same fault value. Plain cancellation does not
    /// trigger it.
    pub fn take_latest_with_catch(
        &self,
        pattern: Pattern<E>,
        catch: CatchFn,
        worker: WorkerRef<E>,
    ) -> DispatchUnit {
        self.latest_inner(pattern, worker, Some(catch))
    }

    fn latest_inner(
        &self,
        pattern: Pattern<E>,
        worker: WorkerRef<E>,
        catch: Option<CatchFn>,
    ) -> DispatchUnit {
        let mut source = EventSource::from_pattern(pattern, &self.stream);
        let conflict = worker.conflict_predicate();
        let sink = Arc::clone(&self.sink);
        let rt = self.runtime_token.clone();
        let name = worker.name().to_string();

        DispatchUnit::new(
            &name,
            Box::pin(async move {
                let mut live: Option<(E, CancellationToken)> = None;
                loop {
                    let observed = tokio::select! {
                        _ = rt.cancelled() => break,
                        ob = source.next() => match ob {
                            Some(ob) => ob,
                            None => break,
                        },
                    };
                    if let (Some(pred), Some((trigger, token))) = (&conflict, &live) {
                        if pred(trigger, observed.event()) {
                            trace!("conflicting event preempts live instance");
                            token.cancel();
                        }
                    }
                    let Observed::Trigger(event) = observed else { continue };

                    // Supersede the previous instance before starting the next.
                    if let Some((_, stale)) = live.take() {
                        stale.cancel();
                    }
                    let token = rt.child_token();
                    live = Some((event.clone(), token.clone()));

                    let worker = Arc::clone(&worker);
                    let sink = Arc::clone(&sink);
                    let catch = catch.clone();
                    tokio::spawn(async move {
                        run_contained(&worker, event, token, &sink, catch.as_ref()).await;
                    });
                }
            }),
        )
    }

    /// Strictly-serial: one-at-a-time, in-order execution per binding.
    ///
    /// Matching events are absorbed into a dedicated expanding queue
    /// (initial size [`RouterConfig::serial_buffer`]) so a slow worker
    /// delays subsequent events but never drops them. The consumer awaits
    /// full contained completion before taking the next item. A conflict
    /// predicate cancels pending items too: their workers have not
    /// completed, so a conflicting event preempts them before they start.
    pub fn take_serially(&self, pattern: Pattern<E>, worker: WorkerRef<E>) -> DispatchUnit {
        let mut source = EventSource::from_pattern(pattern, &self.stream);
        let conflict = worker.conflict_predicate();
        let sink = Arc::clone(&self.sink);
        let rt = self.runtime_token.clone();
        let absorber: Arc<ChanQueue<(E, CancellationToken, CancellationToken)>> =
            ChanQueue::new(self.cfg.serial_policy());
        let name = worker.name().to_string();

        DispatchUnit::new(
            &name,
            Box::pin(async move {
                let feed_queue = Arc::clone(&absorber);
                let feed_rt = rt.clone();
                let feeder = async move {
                    let mut live: Vec<LiveInstance<E>> = Vec::new();
                    loop {
                        let observed = tokio::select! {
                            _ = feed_rt.cancelled() => break,
                            ob = source.next() => match ob {
                                Some(ob) => ob,
                                None => break,
                            },
                        };
                        if let Some(pred) = &conflict {
                            live.retain(|li| !li.done.is_cancelled());
                            for li in &live {
                                if pred(&li.trigger, observed.event()) {
                                    trace!("conflicting event preempts queued instance");
                                    li.token.cancel();
                                }
                            }
                        }
                        let Observed::Trigger(event) = observed else { continue };
                        let token = feed_rt.child_token();
                        let done = CancellationToken::new();
                        if conflict.is_some() {
                            live.push(LiveInstance {
                                trigger: event.clone(),
                                token: token.clone(),
                                done: done.clone(),
                            });
                        }
                        if feed_queue.put((event, token, done)).await.is_err() {
                            break;
                        }
                    }
                    feed_queue.close().await;
                };

                let consumer = async move {
                    loop {
                        let (event, token, done) = tokio::select! {
                            _ = rt.cancelled() => break,
                            item = absorber.take() => match item {
                                Ok(item) => item,
                                Err(_) => break,
                            },
                        };
                        run_contained(&worker, event, token, &sink, None).await;
                        done.cancel();
                    }
                };

                tokio::join!(feeder, consumer);
            }),
        )
    }

    /// Conditional-early-cancel worker wrapper.
    ///
    /// Wraps `worker` so each invocation is preempted by the first event
    /// `later` with `predicate(&triggering, &later)` observed after the
    /// trigger. The owning dispatch loop evaluates the predicate on its own
    /// event feed, so a conflict published in the same breath as the
    /// trigger still cancels the instance; preemption is a graceful
    /// (non-failure) exit.
    pub fn cancel_when(
        &self,
        predicate: impl Fn(&E, &E) -> bool + Send + Sync + 'static,
        worker: WorkerRef<E>,
    ) -> WorkerRef<E> {
        Arc::new(CancelWhen {
            name: worker.name().to_string(),
            predicate: Arc::new(predicate),
            inner: worker,
        })
    }
}

/// Worker wrapper exposing a conflict predicate for early cancellation.
///
/// Execution is delegated to the inner worker; the dispatch loop that owns
/// the binding cancels the instance token on the first conflicting event.
struct CancelWhen<E: Event> {
    name: String,
    predicate: ConflictFn<E>,
    inner: WorkerRef<E>,
}

#[async_trait]
impl<E: Event> Worker<E> for CancelWhen<E> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, event: E, ctx: CancellationToken) -> Result<(), WorkerError> {
        self.inner.run(event, ctx).await
    }

    fn conflict_predicate(&self) -> Option<ConflictFn<E>> {
        Some(Arc::clone(&self.predicate))
    }
}
