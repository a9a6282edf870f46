//! Worker abstraction and ready-made worker implementations.

mod emit_fn;
mod worker;
mod worker_fn;

pub use emit_fn::EmitFn;
pub use worker::{ConflictFn, Worker, WorkerRef};
pub use worker_fn::WorkerFn;
