use std::sync::Arc;

use super::Observer;
use crate::event::Event;

type EventHandler<Item, Err> = Arc<dyn Fn(Event<Item, Err>) + Send + Sync>;

/// Type-erased observer.
///
/// Cheap to clone: every clone forwards to the same handler. This is the
/// observer type [`Observable::subscribe`](crate::observable::Observable)
/// accepts and the element type of a subject's observer registry.
pub struct AnyObserver<Item, Err> {
  handler: EventHandler<Item, Err>,
}

impl<Item, Err> AnyObserver<Item, Err> {
  /// Wraps an event handler.
  pub fn from_fn(handler: impl Fn(Event<Item, Err>) + Send + Sync + 'static) -> Self {
    Self { handler: Arc::new(handler) }
  }
}

impl<Item: 'static, Err: 'static> AnyObserver<Item, Err> {
  /// Erases the type of an existing observer.
  pub fn new(observer: impl Observer<Item, Err> + 'static) -> Self {
    Self::from_fn(move |event| observer.on(event))
  }

  /// An observer that feeds `f(value)` into `self` for every value.
  pub fn map_observer<Source>(
    &self, f: impl Fn(Source) -> Item + Send + Sync + 'static,
  ) -> AnyObserver<Source, Err>
  where
    Source: 'static,
  {
    let inner = self.clone();
    AnyObserver::from_fn(move |event: Event<Source, Err>| inner.on(event.map(&f)))
  }
}

impl<Item, Err> Clone for AnyObserver<Item, Err> {
  fn clone(&self) -> Self { Self { handler: self.handler.clone() } }
}

impl<Item, Err> Observer<Item, Err> for AnyObserver<Item, Err> {
  #[inline]
  fn on(&self, event: Event<Item, Err>) { (self.handler)(event) }
}
