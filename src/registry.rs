//! # Queue registry: named queues created in bulk from configuration.
//!
//! A [`QueueRegistry`] multiplexes a mapping of worker-name → dedicated
//! [`ChanQueue`]. Queues are created **eagerly** from a [`QueueConfig`]
//! (name → capacity-policy factory) and addressed by name afterwards:
//!
//! - [`QueueRegistry::put`] enqueues an item for a named worker;
//! - [`QueueRegistry::handle`] returns the take-side of a named queue;
//! - [`QueueRegistry::close_all`] closes every queue at teardown.
//!
//! ## Rules
//! - Absence of a name is never fatal: the operation degrades to a logged
//!   no-op and the item (if any) is dropped.
//! - Capacity policies are fixed at creation and never change.
//! - The registry owner (normally the [`Router`](crate::router::Router)'s
//!   caller) holds it for the subsystem's lifetime; `close_all` is the
//!   explicit teardown step and is idempotent.
//!
//! ## Example
//! ```rust
//! use evroute::{BufferPolicy, QueueConfig, QueueRegistry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut config = QueueConfig::new();
//! config.insert("login".into(), Box::new(|| BufferPolicy::Expanding(1)));
//! config.insert("sync".into(), Box::new(|| BufferPolicy::Expanding(10)));
//!
//! let registry: QueueRegistry<String> = QueueRegistry::from_config(config);
//! assert_eq!(registry.names(), vec!["login".to_string(), "sync".to_string()]);
//!
//! registry.put("login", "hello".into()).await.unwrap();
//! let q = registry.handle("login").unwrap();
//! assert_eq!(q.take().await.unwrap(), "hello");
//! registry.close_all().await;
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::{QueueError, RegistryError};
use crate::queue::{BufferPolicy, ChanQueue};

/// Zero-argument factory producing the capacity policy for one queue.
pub type PolicyFactory = Box<dyn Fn() -> BufferPolicy + Send + Sync>;

/// Declarative queue configuration: worker-name → capacity-policy factory.
///
/// The key set must match the worker mapping handed to the router; mismatch
/// is a reportable configuration defect, not a fatal error.
pub type QueueConfig = HashMap<String, PolicyFactory>;

/// Builds a config mapping every name to a single-slot coalescing queue.
///
/// `Expanding(1)` queues absorb bursts while hinting that consumers read
/// them as "the latest value"; this is the default shape for notification
/// channels.
pub fn single_slot_config<I, S>(names: I) -> QueueConfig
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|name| {
            let factory: PolicyFactory = Box::new(|| BufferPolicy::Expanding(1));
            (name.into(), factory)
        })
        .collect()
}

/// Named registry of independent queues.
pub struct QueueRegistry<T> {
    queues: HashMap<String, Arc<ChanQueue<T>>>,
}

impl<T: Send> QueueRegistry<T> {
    /// Creates one queue per config entry, eagerly, at call time.
    pub fn from_config(config: QueueConfig) -> Self {
        let queues = config
            .into_iter()
            .map(|(name, factory)| (name, ChanQueue::new(factory())))
            .collect();
        Self { queues }
    }

    /// Enqueues an item for the named worker.
    ///
    /// A missing name or a closed queue is logged and returned as an error;
    /// the item is dropped either way and the caller may ignore the result.
    pub async fn put(&self, name: &str, item: T) -> Result<(), RegistryError> {
        let Some(queue) = self.queues.get(name) else {
            let err = RegistryError::NoSuchQueue { name: name.to_string() };
            warn!(name, "put dropped: {}", err.as_message());
            return Err(err);
        };
        match queue.put(item).await {
            Ok(()) => Ok(()),
            Err(QueueError::Closed) => {
                let err = RegistryError::Closed { name: name.to_string() };
                warn!(name, "put dropped: {}", err.as_message());
                Err(err)
            }
            Err(QueueError::Overflow { capacity }) => {
                warn!(name, capacity, "put dropped: queue full");
                Ok(())
            }
        }
    }

    /// Returns the take-handle of the named queue.
    ///
    /// Awaiting [`ChanQueue::take`] on the returned handle is the composable
    /// "wait for the next item addressed to this name" operation.
    pub fn handle(&self, name: &str) -> Result<Arc<ChanQueue<T>>, RegistryError> {
        match self.queues.get(name) {
            Some(queue) => Ok(Arc::clone(queue)),
            None => {
                let err = RegistryError::NoSuchQueue { name: name.to_string() };
                warn!(name, "{}", err.as_message());
                Err(err)
            }
        }
    }

    /// Closes every queue. Idempotent; used at subsystem teardown.
    pub async fn close_all(&self) {
        for queue in self.queues.values() {
            queue.close().await;
        }
    }

    /// Sorted list of registered names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// True if a queue is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.queues.contains_key(name)
    }

    /// Number of registered queues.
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    /// True if the registry has no queues.
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
