//! # evroute
//!
//! **evroute** is a coordination layer between an event stream and the
//! worker tasks that react to it. It routes events to long-lived or
//! per-event workers under a chosen concurrency discipline, and guarantees
//! that an unhandled failure in one worker never terminates the dispatch
//! loop that keeps the system alive.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  producers ──► EventStream (broadcast) ─────────────────────────┐
//!       │                                                         │
//!       │ put(name, event)                                        │ subscribe
//!       ▼                                                         ▼
//!  ┌──────────────────────────────┐                 ┌──────────────────────────┐
//!  │ QueueRegistry                │                 │ Dispatcher               │
//!  │   name → ChanQueue (policy   │                 │   take_every             │
//!  │   fixed at creation)         │                 │   take_latest(_with_catch)│
//!  └──────────────┬───────────────┘                 │   take_serially          │
//!                 │ handle(name)                    │   cancel_when            │
//!                 ▼                                 └────────────┬─────────────┘
//!  ┌──────────────────────────────┐                              │
//!  │ Router::wire                 │   Pattern::Queue(handle)     │
//!  │   validates key sets,        ├──────────────────────────────┤
//!  │   one DispatchUnit / binding │                              │
//!  └──────────────────────────────┘                              ▼
//!                                              ┌───────────────────────────────┐
//!                                              │ run_contained (per instance)  │
//!                                              │   worker failure → Fault      │
//!                                              │   → ErrorSink → EventStream   │
//!                                              │   cancellation → trace only   │
//!                                              └───────────────────────────────┘
//! ```
//!
//! ### Dispatch policies
//! | Policy | Guarantee |
//! |--------|-----------|
//! | [`Dispatcher::take_every`] | one concurrent instance per matching event |
//! | [`Dispatcher::take_latest`] | at most one live instance; stale ones cancelled |
//! | [`Dispatcher::take_serially`] | arrival order, one-at-a-time, no loss |
//! | [`Dispatcher::cancel_when`] | worker raced against a conflicting later event |
//!
//! All four contain worker failures: the failure is normalized into a
//! [`Fault`], reported once through the injected [`ErrorSink`], and the
//! owning loop keeps processing subsequent events.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use evroute::{
//!     Dispatcher, ErrorSink, Event, EventStream, Fault, Pattern, RouterConfig,
//!     StreamSink, WorkerError, WorkerFn,
//! };
//!
//! #[derive(Clone, Debug)]
//! enum Msg {
//!     Greet { name: String },
//!     GlobalError { message: String },
//! }
//!
//! impl Event for Msg {
//!     fn tag(&self) -> &str {
//!         match self {
//!             Msg::Greet { .. } => "greet",
//!             Msg::GlobalError { .. } => "global_error",
//!         }
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let stream = EventStream::new(64);
//!     let sink = StreamSink::new(stream.clone(), |fault: Fault| Msg::GlobalError {
//!         message: fault.message,
//!     });
//!     let dispatcher = Dispatcher::new(RouterConfig::default(), stream.clone(), sink);
//!
//!     let greeter = WorkerFn::arc("greeter", |ev: Msg, _ctx: CancellationToken| async move {
//!         if let Msg::Greet { name } = ev {
//!             println!("hello, {name}");
//!         }
//!         Ok::<_, WorkerError>(())
//!     });
//!
//!     let unit = dispatcher.take_every(Pattern::tag("greet"), greeter);
//!     let loop_handle = unit.spawn();
//!
//!     stream.publish(Msg::Greet { name: "world".into() });
//!     tokio::task::yield_now().await;
//!
//!     dispatcher.shutdown();
//!     let _ = loop_handle.await;
//! }
//! ```

mod config;
mod dispatch;
mod error;
mod events;
mod queue;
mod registry;
mod router;
mod workers;

// ---- Public re-exports ----

pub use config::RouterConfig;
pub use dispatch::{run_contained, CatchFn, DispatchUnit, Dispatcher, Pattern};
pub use error::{Fault, QueueError, RegistryError, WorkerError};
pub use events::{ErrorSink, Event, EventStream, NullSink, StreamSink};
pub use queue::{BufferPolicy, ChanQueue};
pub use registry::{single_slot_config, PolicyFactory, QueueConfig, QueueRegistry};
pub use router::{validate_names, Binding, PolicyKind, Router};
pub use workers::{ConflictFn, EmitFn, Worker, WorkerFn, WorkerRef};
