//! # Event contract.
//!
//! The dispatch layer is generic over the application's event type. An event
//! is an immutable typed message with a **tag** (its discriminant) and an
//! arbitrary payload; the crate only ever inspects the tag and clones the
//! whole value, never mutates it.
//!
//! ## Example
//! ```rust
//! use evroute::Event;
//!
//! #[derive(Clone, Debug)]
//! enum Msg {
//!     Ping { target: String },
//!     Pong,
//! }
//!
//! impl Event for Msg {
//!     fn tag(&self) -> &str {
//!         match self {
//!             Msg::Ping { .. } => "ping",
//!             Msg::Pong => "pong",
//!         }
//!     }
//! }
//!
//! assert_eq!(Msg::Pong.tag(), "pong");
//! ```

/// Contract for typed messages flowing through the dispatch layer.
///
/// Implementations should be cheap to clone: events fan out to every
/// subscriber of the stream, and each matching binding receives its own
/// clone. Wrap large payloads in `Arc`.
pub trait Event: Clone + Send + Sync + 'static {
    /// Returns the discriminant (kind) of this event.
    ///
    /// The tag must be stable for a given variant: pattern matching over
    /// tags is how bindings select the events they react to.
    fn tag(&self) -> &str;
}
