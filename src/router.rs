//! # Router: binds named workers to registry queues under dispatch policies.
//!
//! [`Router::wire`] takes a mapping of worker-name → [`Binding`] and a
//! [`QueueRegistry`] built from the identical key set, validates that the
//! two name sets match exactly, and produces one [`DispatchUnit`] per name
//! present in both — each reading from its dedicated queue via
//! [`Pattern::Queue`].
//!
//! ## Degraded operation on mismatch
//! A key-set mismatch is a configuration defect, not a fatal error:
//! - the full mismatch list is returned by [`validate_names`] and logged as
//!   a single warning;
//! - a name with a queue but no worker leaves its queue unread — events put
//!   for it are silently dropped at the point of dispatch;
//! - a name with a worker but no queue gets no loop — there is nowhere its
//!   events could have been enqueued.
//!
//! ## Example
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use evroute::{
//!     Binding, Dispatcher, Event, EventStream, NullSink, QueueRegistry, Router,
//!     RouterConfig, WorkerError, WorkerFn, single_slot_config,
//! };
//!
//! #[derive(Clone, Debug)]
//! struct Note(String);
//! impl Event for Note {
//!     fn tag(&self) -> &str { "note" }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stream = EventStream::new(64);
//! let dispatcher = Dispatcher::new(RouterConfig::default(), stream, Arc::new(NullSink));
//! let registry: QueueRegistry<Note> = QueueRegistry::from_config(single_slot_config(["log"]));
//!
//! let mut bindings = HashMap::new();
//! bindings.insert(
//!     "log".to_string(),
//!     Binding::every(WorkerFn::arc("log", |_ev: Note, _ctx: CancellationToken| async {
//!         Ok::<_, WorkerError>(())
//!     })),
//! );
//!
//! let units = Router::wire(&dispatcher, bindings, &registry);
//! assert_eq!(units.len(), 1);
//! for unit in units {
//!     unit.spawn();
//! }
//! # }
//! ```

use std::collections::HashMap;

use tracing::warn;

use crate::dispatch::{CatchFn, DispatchUnit, Dispatcher, Pattern};
use crate::events::Event;
use crate::registry::QueueRegistry;
use crate::workers::WorkerRef;

/// Scheduling policy applied to one binding.
pub enum PolicyKind {
    /// Fan-out-per-event: a new instance per matching event.
    Every,
    /// Latest-only: stale instances cancelled, at most one alive.
    Latest,
    /// Latest-only plus a recovery callback invoked per caught failure.
    LatestWithCatch(CatchFn),
    /// Strictly-serial: one-at-a-time, arrival order.
    Serial,
}

impl std::fmt::Debug for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PolicyKind::Every => "Every",
            PolicyKind::Latest => "Latest",
            PolicyKind::LatestWithCatch(_) => "LatestWithCatch(..)",
            PolicyKind::Serial => "Serial",
        };
        f.write_str(s)
    }
}

/// Immutable association of a dispatch policy with a worker.
///
/// One binding per worker-name; created at wiring time.
pub struct Binding<E: Event> {
    /// Policy governing instance scheduling for this binding.
    pub policy: PolicyKind,
    /// The worker run per matching event.
    pub worker: WorkerRef<E>,
}

impl<E: Event> Binding<E> {
    /// Fan-out-per-event binding.
    pub fn every(worker: WorkerRef<E>) -> Self {
        Self { policy: PolicyKind::Every, worker }
    }

    /// Latest-only binding.
    pub fn latest(worker: WorkerRef<E>) -> Self {
        Self { policy: PolicyKind::Latest, worker }
    }

    /// Latest-only binding with a per-failure recovery callback.
    pub fn latest_with_catch(catch: CatchFn, worker: WorkerRef<E>) -> Self {
        Self {
            policy: PolicyKind::LatestWithCatch(catch),
            worker,
        }
    }

    /// Strictly-serial binding.
    pub fn serial(worker: WorkerRef<E>) -> Self {
        Self { policy: PolicyKind::Serial, worker }
    }
}

/// Returns the sorted symmetric difference of the two name sets.
///
/// Empty means the binding keys and queue names are set-equal. Returned as
/// a value (rather than only logged) so callers and tests can assert on the
/// mismatch directly.
pub fn validate_names(binding_names: &[String], queue_names: &[String]) -> Vec<String> {
    let mut mismatched: Vec<String> = binding_names
        .iter()
        .filter(|n| !queue_names.contains(n))
        .chain(queue_names.iter().filter(|n| !binding_names.contains(n)))
        .cloned()
        .collect();
    mismatched.sort_unstable();
    mismatched.dedup();
    mismatched
}

/// Wires worker bindings to registry queues.
pub struct Router;

impl Router {
    /// Produces one dispatch unit per name present in both the binding map
    /// and the registry, logging a warning if the key sets differ.
    ///
    /// The returned units are not yet running; hand each to the substrate
    /// via [`DispatchUnit::spawn`] at subsystem startup.
    pub fn wire<E: Event>(
        dispatcher: &Dispatcher<E>,
        bindings: HashMap<String, Binding<E>>,
        registry: &QueueRegistry<E>,
    ) -> Vec<DispatchUnit> {
        let binding_names: Vec<String> = {
            let mut names: Vec<String> = bindings.keys().cloned().collect();
            names.sort_unstable();
            names
        };
        let mismatched = validate_names(&binding_names, &registry.names());
        if !mismatched.is_empty() {
            warn!(?mismatched, "missing or extraneous worker bindings");
        }

        let mut units = Vec::with_capacity(bindings.len());
        for (name, binding) in bindings {
            let Ok(queue) = registry.handle(&name) else {
                // No queue for this worker: nothing could ever be dispatched
                // to it, already covered by the mismatch warning.
                continue;
            };
            let pattern = Pattern::Queue(queue);
            let unit = match binding.policy {
                PolicyKind::Every => dispatcher.take_every(pattern, binding.worker),
                PolicyKind::Latest => dispatcher.take_latest(pattern, binding.worker),
                PolicyKind::LatestWithCatch(catch) => {
                    dispatcher.take_latest_with_catch(pattern, catch, binding.worker)
                }
                PolicyKind::Serial => dispatcher.take_serially(pattern, binding.worker),
            };
            units.push(unit);
        }
        units
    }
}
