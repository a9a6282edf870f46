//! Event abstraction, broadcast stream, and the global error sink.

mod event;
mod sink;
mod stream;

pub use event::Event;
pub use sink::{ErrorSink, NullSink, StreamSink};
pub use stream::EventStream;
