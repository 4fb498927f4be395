//! The unit of delivery between an observable and its observers.
//!
//! A well formed stream of events follows the grammar
//! `Next* (Error | Completed)?`: any number of values, optionally closed by
//! exactly one terminal event, never followed by anything else.

/// One notification of a reactive stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<Item, Err> {
  /// A value produced by the sequence.
  Next(Item),
  /// The sequence terminated with a failure.
  Error(Err),
  /// The sequence terminated successfully.
  Completed,
}

impl<Item, Err> Event<Item, Err> {
  /// Is `Completed` or `Error` event.
  #[inline]
  pub fn is_stop_event(&self) -> bool { !matches!(self, Event::Next(_)) }

  #[inline]
  pub fn is_completed(&self) -> bool { matches!(self, Event::Completed) }

  /// The carried value if this is a `Next` event.
  #[inline]
  pub fn element(&self) -> Option<&Item> {
    match self {
      Event::Next(value) => Some(value),
      _ => None,
    }
  }

  /// The carried error if this is an `Error` event.
  #[inline]
  pub fn error(&self) -> Option<&Err> {
    match self {
      Event::Error(err) => Some(err),
      _ => None,
    }
  }

  /// Consumes the event and returns the value of a `Next` event.
  #[inline]
  pub fn into_element(self) -> Option<Item> {
    match self {
      Event::Next(value) => Some(value),
      _ => None,
    }
  }

  /// Transforms the value of a `Next` event, terminal events pass through.
  pub fn map<U>(self, f: impl FnOnce(Item) -> U) -> Event<U, Err> {
    match self {
      Event::Next(value) => Event::Next(f(value)),
      Event::Error(err) => Event::Error(err),
      Event::Completed => Event::Completed,
    }
  }

  /// Transforms the error of an `Error` event.
  pub fn map_err<E>(self, f: impl FnOnce(Err) -> E) -> Event<Item, E> {
    match self {
      Event::Next(value) => Event::Next(value),
      Event::Error(err) => Event::Error(f(err)),
      Event::Completed => Event::Completed,
    }
  }
}
