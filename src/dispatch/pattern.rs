//! # Event patterns.
//!
//! A [`Pattern`] selects which events a dispatch policy reacts to. It is a
//! tagged variant rather than anything reflective: matching is a single
//! [`Pattern::matches`] call over the event's tag or the whole event.
//!
//! - [`Pattern::Tag`]: exact discriminant;
//! - [`Pattern::OneOf`]: membership in a discriminant set;
//! - [`Pattern::Where`]: arbitrary predicate over the event;
//! - [`Pattern::Queue`]: read from an explicit queue instead of the stream —
//!   every item taken matches, since the producer pre-filtered it.

use std::borrow::Cow;
use std::sync::Arc;

use crate::events::Event;
use crate::queue::ChanQueue;

/// Selector deciding which events a binding observes.
pub enum Pattern<E: Event> {
    /// Matches events whose tag equals the given discriminant.
    Tag(Cow<'static, str>),
    /// Matches events whose tag is a member of the given set.
    OneOf(Vec<Cow<'static, str>>),
    /// Matches events for which the predicate returns true.
    Where(Arc<dyn Fn(&E) -> bool + Send + Sync>),
    /// Consumes items from an explicit queue; every item matches.
    Queue(Arc<ChanQueue<E>>),
}

impl<E: Event> Pattern<E> {
    /// Exact-tag pattern.
    pub fn tag(tag: impl Into<Cow<'static, str>>) -> Self {
        Pattern::Tag(tag.into())
    }

    /// Tag-set pattern.
    pub fn one_of<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Pattern::OneOf(tags.into_iter().map(Into::into).collect())
    }

    /// Predicate pattern.
    pub fn matching(pred: impl Fn(&E) -> bool + Send + Sync + 'static) -> Self {
        Pattern::Where(Arc::new(pred))
    }

    /// True if the event matches this pattern.
    ///
    /// Queue patterns match every item: the producer already filtered what
    /// it put on the queue.
    pub fn matches(&self, event: &E) -> bool {
        match self {
            Pattern::Tag(tag) => event.tag() == tag.as_ref(),
            Pattern::OneOf(tags) => tags.iter().any(|t| event.tag() == t.as_ref()),
            Pattern::Where(pred) => pred(event),
            Pattern::Queue(_) => true,
        }
    }
}

impl<E: Event> Clone for Pattern<E> {
    fn clone(&self) -> Self {
        match self {
            Pattern::Tag(t) => Pattern::Tag(t.clone()),
            Pattern::OneOf(ts) => Pattern::OneOf(ts.clone()),
            Pattern::Where(p) => Pattern::Where(Arc::clone(p)),
            Pattern::Queue(q) => Pattern::Queue(Arc::clone(q)),
        }
    }
}

impl<E: Event> std::fmt::Debug for Pattern<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Tag(t) => f.debug_tuple("Tag").field(t).finish(),
            Pattern::OneOf(ts) => f.debug_tuple("OneOf").field(ts).finish(),
            Pattern::Where(_) => f.write_str("Where(..)"),
            Pattern::Queue(_) => f.write_str("Queue(..)"),
        }
    }
}
