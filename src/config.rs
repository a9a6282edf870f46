//! # Global dispatch configuration.
//!
//! Provides [`RouterConfig`], centralized settings for the dispatch layer.
//!
//! The config is used in two places:
//! 1. **Stream creation**: `EventStream::new(cfg.stream_capacity)`
//! 2. **Dispatcher creation**: `Dispatcher::new(cfg, stream, sink)`

use crate::queue::BufferPolicy;

/// Configuration for the event stream and dispatch policies.
///
/// ## Field semantics
/// - `stream_capacity`: broadcast ring buffer size (min 1; clamped by the stream)
/// - `serial_buffer`: initial size of the absorbing queue behind each
///   strictly-serial binding; the queue expands past this without loss
///
/// ## Notes
/// All fields are public for flexibility; defaults match the shapes the
/// original wiring used everywhere.
#[derive(Clone, Copy, Debug)]
pub struct RouterConfig {
    /// Capacity of the broadcast ring buffer backing the event stream.
    ///
    /// Dispatch loops that lag behind more than this many events skip the
    /// oldest ones and log a warning.
    pub stream_capacity: usize,

    /// Initial allocation of each strictly-serial absorbing queue.
    ///
    /// The queue is expanding: bursts beyond this size are absorbed without
    /// loss and without blocking producers.
    pub serial_buffer: usize,
}

impl RouterConfig {
    /// Buffer policy for a strictly-serial absorbing queue.
    #[inline]
    pub fn serial_policy(&self) -> BufferPolicy {
        BufferPolicy::Expanding(self.serial_buffer.max(1))
    }
}

impl Default for RouterConfig {
    /// Default configuration:
    ///
    /// - `stream_capacity = 1024` (good baseline for bursty streams)
    /// - `serial_buffer = 10` (absorbs arrival bursts behind a slow worker)
    fn default() -> Self {
        Self {
            stream_capacity: 1024,
            serial_buffer: 10,
        }
    }
}
