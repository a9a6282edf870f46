//! # Capacity policies for [`ChanQueue`](crate::queue::ChanQueue).
//!
//! A policy decides what happens when a producer puts into a queue that is
//! at its configured size. Producers are event handlers and must never
//! block, so every policy resolves overflow immediately:
//!
//! - [`BufferPolicy::Expanding`] grows without bound (never drops);
//! - [`BufferPolicy::Sliding`] drops the **oldest** buffered item;
//! - [`BufferPolicy::Fixed`] rejects the **new** item with an overflow error.
//!
//! The dispatch layer itself only ever uses `Expanding`: single-slot
//! coalescing queues (`Expanding(1)`) and serial absorbers (`Expanding(10)`).
//! `Sliding` and `Fixed` are part of the queue contract for direct users.

/// Capacity policy for a queue, fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferPolicy {
    /// Starts with the given capacity hint and grows without bound.
    ///
    /// Never blocks a producer, never drops an item.
    Expanding(usize),

    /// Keeps at most the given number of items, discarding the oldest on
    /// overflow. Consumers reading such a queue see a sliding window of the
    /// most recent values.
    Sliding(usize),

    /// Holds at most the given number of items; puts past that are rejected
    /// with [`QueueError::Overflow`](crate::error::QueueError::Overflow).
    Fixed(usize),
}

impl BufferPolicy {
    /// Initial allocation hint for the backing buffer.
    #[inline]
    pub(crate) fn initial_capacity(&self) -> usize {
        match *self {
            BufferPolicy::Expanding(n) | BufferPolicy::Sliding(n) | BufferPolicy::Fixed(n) => {
                n.max(1)
            }
        }
    }
}

impl Default for BufferPolicy {
    /// Single-slot expanding buffer, the default for coalescing queues.
    fn default() -> Self {
        BufferPolicy::Expanding(1)
    }
}
