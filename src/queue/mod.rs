//! Ordered, close-aware message queues with configurable capacity policies.

mod buffer;
mod chan;

pub use buffer::BufferPolicy;
pub use chan::ChanQueue;
