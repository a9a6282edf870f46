//! Error types used by the dispatch runtime, queues, and workers.
//!
//! This module defines three error enums and one payload struct:
//!
//! - [`QueueError`] — conditions raised by a single [`ChanQueue`](crate::queue::ChanQueue).
//! - [`RegistryError`] — conditions raised by name-addressed registry operations.
//! - [`WorkerError`] — errors raised by individual worker executions.
//! - [`Fault`] — the normalized payload reported for every caught worker failure.
//!
//! All enums provide `as_label()` helpers for logging/metrics.
//!
//! ## Propagation policy
//! Nothing in this module is fatal to the hosting process:
//! - queue/registry conditions are recovered locally with a diagnostic log;
//! - worker failures are normalized into a [`Fault`] and surfaced through the
//!   [`ErrorSink`](crate::events::ErrorSink) so a higher-level handler can react.

use thiserror::Error;

/// # Conditions raised by a single queue.
///
/// Both variants are recoverable. `Closed` usually indicates a
/// shutdown-ordering bug in the caller and should be surfaced, not swallowed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Operation against a closed queue (use-after-close).
    #[error("queue is closed")]
    Closed,

    /// Fixed-capacity queue is full; the item was rejected.
    ///
    /// Producers are never blocked, so a full fixed buffer rejects instead
    /// of applying backpressure.
    #[error("queue is full (fixed capacity {capacity})")]
    Overflow {
        /// The fixed capacity that was exceeded.
        capacity: usize,
    },
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::Closed => "queue_closed",
            QueueError::Overflow { .. } => "queue_overflow",
        }
    }
}

/// # Conditions raised by name-addressed registry operations.
///
/// Absence of a name is never fatal: it degrades to a logged no-op, since
/// configuration mismatches must not crash a long-lived process.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No queue is registered under the given name; the item was dropped.
    #[error("no registered queue for '{name}'")]
    NoSuchQueue {
        /// The name that failed to resolve.
        name: String,
    },

    /// The named queue exists but has been closed (use-after-close).
    #[error("queue '{name}' is closed")]
    Closed {
        /// The name of the closed queue.
        name: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::NoSuchQueue { .. } => "registry_no_such_queue",
            RegistryError::Closed { .. } => "registry_queue_closed",
        }
    }

    /// Returns a human-readable message with details about the condition.
    pub fn as_message(&self) -> String {
        match self {
            RegistryError::NoSuchQueue { name } => format!("no registered queue for '{name}'"),
            RegistryError::Closed { name } => format!("queue '{name}' already closed"),
        }
    }
}

/// # Errors produced by worker execution.
///
/// A worker either fails (reported) or observes cancellation and exits
/// cooperatively (traced, never reported).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker execution failed; normalized and reported exactly once.
    #[error("worker failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Worker observed its cancellation token and exited early.
    ///
    /// Treated as a graceful exit by the containment wrapper.
    #[error("worker cancelled")]
    Canceled,
}

impl WorkerError {
    /// Convenience constructor for [`WorkerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        WorkerError::Fail { error: error.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::Fail { .. } => "worker_failed",
            WorkerError::Canceled => "worker_canceled",
        }
    }

    /// True if the containment wrapper should report this error as a [`Fault`].
    ///
    /// Cancellation is a graceful exit, not a failure.
    pub fn is_reportable(&self) -> bool {
        matches!(self, WorkerError::Fail { .. })
    }
}

/// Normalized payload carried by every reported worker failure.
///
/// Built from a [`WorkerError`] or from a caught panic, and delivered to the
/// [`ErrorSink`](crate::events::ErrorSink) exactly once per caught failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Short stable label (snake_case) identifying the failure class.
    pub label: &'static str,
    /// Human-readable message describing the failure.
    pub message: String,
}

impl Fault {
    /// Normalizes a caught panic payload into a fault.
    ///
    /// Extracts the panic message when it is a `&str` or `String`; any other
    /// payload is rendered as an opaque marker.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self {
            label: "worker_panicked",
            message,
        }
    }
}

impl From<&WorkerError> for Fault {
    fn from(err: &WorkerError) -> Self {
        Self {
            label: err.as_label(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}
