//! Dispatch policies, pattern matching, and the failure containment wrapper.

mod contain;
mod pattern;
mod policy;
mod source;

pub use contain::{run_contained, CatchFn};
pub use pattern::Pattern;
pub use policy::{DispatchUnit, Dispatcher};
