//! # Close-aware async queue.
//!
//! [`ChanQueue`] is an ordered queue of typed messages shared between
//! producer tasks and consumer tasks:
//!
//! - [`ChanQueue::put`] appends an item according to the queue's
//!   [`BufferPolicy`] and never suspends;
//! - [`ChanQueue::take`] suspends the calling task until an item is
//!   available or the queue is closed;
//! - [`ChanQueue::close`] is idempotent; after close, buffered items are
//!   still drained, then pending and future takes fail with
//!   [`QueueError::Closed`] instead of suspending forever.
//!
//! ## Rules
//! - All mutation is serialized internally; no external lock is exposed.
//! - Safe under concurrent puts and takes from multiple tasks.
//! - `put` after close is a use-after-close condition: reported to the
//!   caller as `Err(Closed)`, never a panic.
//!
//! ## Example
//! ```rust
//! use evroute::{BufferPolicy, ChanQueue};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let q = ChanQueue::new(BufferPolicy::Expanding(1));
//! q.put(7u32).await.unwrap();
//! assert_eq!(q.take().await.unwrap(), 7);
//! q.close().await;
//! assert!(q.put(8).await.is_err());
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::error::QueueError;
use crate::queue::BufferPolicy;

struct State<T> {
    buf: VecDeque<T>,
    closed: bool,
}

/// Ordered async queue with a fixed-at-creation capacity policy.
pub struct ChanQueue<T> {
    policy: BufferPolicy,
    state: Mutex<State<T>>,
    notify: Notify,
}

impl<T: Send> ChanQueue<T> {
    /// Creates a new queue with the given capacity policy.
    pub fn new(policy: BufferPolicy) -> Arc<Self> {
        Arc::new(Self {
            policy,
            state: Mutex::new(State {
                buf: VecDeque::with_capacity(policy.initial_capacity()),
                closed: false,
            }),
            notify: Notify::new(),
        })
    }

    /// Appends an item, resolving overflow per the queue's policy.
    ///
    /// Never suspends waiting for space. Returns:
    /// - `Err(QueueError::Closed)` if the queue was closed (the item is dropped);
    /// - `Err(QueueError::Overflow)` for a full [`BufferPolicy::Fixed`] queue.
    pub async fn put(&self, item: T) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(QueueError::Closed);
            }
            match self.policy {
                BufferPolicy::Expanding(_) => state.buf.push_back(item),
                BufferPolicy::Sliding(n) => {
                    if state.buf.len() >= n.max(1) {
                        state.buf.pop_front();
                    }
                    state.buf.push_back(item);
                }
                BufferPolicy::Fixed(n) => {
                    if state.buf.len() >= n.max(1) {
                        return Err(QueueError::Overflow { capacity: n.max(1) });
                    }
                    state.buf.push_back(item);
                }
            }
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Takes the next item, suspending until one is available.
    ///
    /// Buffered items are drained even after close; once the buffer is empty
    /// on a closed queue, returns `Err(QueueError::Closed)`.
    pub async fn take(&self) -> Result<T, QueueError> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking state so a concurrent put cannot slip
            // between the empty check and the await.
            notified.as_mut().enable();
            {
                let mut state = self.state.lock().await;
                if let Some(item) = state.buf.pop_front() {
                    return Ok(item);
                }
                if state.closed {
                    return Err(QueueError::Closed);
                }
            }
            notified.await;
        }
    }

    /// Closes the queue, waking every pending taker. Idempotent.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            state.closed = true;
        }
        self.notify.notify_waiters();
    }

    /// True once [`ChanQueue::close`] has been called.
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Number of currently buffered items.
    pub async fn len(&self) -> usize {
        self.state.lock().await.buf.len()
    }

    /// True if no items are buffered.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_take_preserves_order() {
        let q = ChanQueue::new(BufferPolicy::Expanding(1));
        q.put(1).await.unwrap();
        q.put(2).await.unwrap();
        q.put(3).await.unwrap();
        assert_eq!(q.take().await.unwrap(), 1);
        assert_eq!(q.take().await.unwrap(), 2);
        assert_eq!(q.take().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_take_suspends_until_put() {
        let q = ChanQueue::new(BufferPolicy::Expanding(1));
        let q2 = Arc::clone(&q);
        let taker = tokio::spawn(async move { q2.take().await });
        tokio::task::yield_now().await;
        q.put(42).await.unwrap();
        assert_eq!(taker.await.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_expanding_absorbs_bursts() {
        let q = ChanQueue::new(BufferPolicy::Expanding(1));
        for i in 0..100 {
            q.put(i).await.unwrap();
        }
        assert_eq!(q.len().await, 100);
    }

    #[tokio::test]
    async fn test_sliding_drops_oldest() {
        let q = ChanQueue::new(BufferPolicy::Sliding(2));
        q.put(1).await.unwrap();
        q.put(2).await.unwrap();
        q.put(3).await.unwrap();
        assert_eq!(q.take().await.unwrap(), 2);
        assert_eq!(q.take().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_fixed_rejects_overflow() {
        let q = ChanQueue::new(BufferPolicy::Fixed(1));
        q.put(1).await.unwrap();
        assert_eq!(
            q.put(2).await.unwrap_err(),
            QueueError::Overflow { capacity: 1 }
        );
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_drains() {
        let q = ChanQueue::new(BufferPolicy::Expanding(1));
        q.put(9).await.unwrap();
        q.close().await;
        q.close().await;
        assert_eq!(q.take().await.unwrap(), 9);
        assert_eq!(q.take().await.unwrap_err(), QueueError::Closed);
    }

    #[tokio::test]
    async fn test_put_after_close_reports_closed() {
        let q = ChanQueue::new(BufferPolicy::Expanding(1));
        q.close().await;
        assert_eq!(q.put(1).await.unwrap_err(), QueueError::Closed);
    }

    #[tokio::test]
    async fn test_close_wakes_pending_taker() {
        let q: Arc<ChanQueue<u32>> = ChanQueue::new(BufferPolicy::Expanding(1));
        let q2 = Arc::clone(&q);
        let taker = tokio::spawn(async move { q2.take().await });
        tokio::task::yield_now().await;
        q.close().await;
        assert_eq!(taker.await.unwrap().unwrap_err(), QueueError::Closed);
    }

    #[tokio::test]
    async fn test_concurrent_producers_lose_nothing() {
        let q = ChanQueue::new(BufferPolicy::Expanding(10));
        let mut handles = Vec::new();
        for p in 0..4 {
            let q = Arc::clone(&q);
            handles.push(tokio::spawn(async move {
                for i in 0..25 {
                    q.put(p * 100 + i).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(q.len().await, 100);
    }
}
