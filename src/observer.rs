//! Observer trait and implementations
//!
//! An observer is the consuming end of a stream. Everything arrives through
//! [`Observer::on`]; `on_next`, `on_error` and `on_completed` are shorthands
//! that wrap the value in an [`Event`].

mod any_observer;
mod observer_base;

pub use any_observer::AnyObserver;
pub use observer_base::{AnonymousObserver, ObserverBase};

use crate::event::Event;

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: the consumer of events in reactive programming.
///
/// Observers take `&self` so one observer can be shared between the
/// producer that feeds it and the disposable that cancels it, across
/// threads.
pub trait Observer<Item, Err>: Send + Sync {
  /// Delivers one event.
  fn on(&self, event: Event<Item, Err>);

  #[inline]
  fn on_next(&self, value: Item) { self.on(Event::Next(value)) }

  #[inline]
  fn on_error(&self, err: Err) { self.on(Event::Error(err)) }

  #[inline]
  fn on_completed(&self) { self.on(Event::Completed) }
}

impl<Item, Err, O: ?Sized + Observer<Item, Err>> Observer<Item, Err> for std::sync::Arc<O> {
  #[inline]
  fn on(&self, event: Event<Item, Err>) { (**self).on(event) }
}

impl<Item, Err, O: ?Sized + Observer<Item, Err>> Observer<Item, Err> for Box<O> {
  #[inline]
  fn on(&self, event: Event<Item, Err>) { (**self).on(event) }
}
