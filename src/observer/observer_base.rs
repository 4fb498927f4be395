use super::Observer;
use crate::{event::Event, util::AtomicInt};

/// Observer that enforces the `Next* (Error | Completed)?` grammar.
///
/// Values are forwarded while the observer is running. The first terminal
/// event flips the stopped flag and is forwarded; everything after it, a
/// second terminal event included, is dropped. The flag flip is a single
/// atomic transition, so two terminal events racing on different threads
/// deliver exactly one.
pub struct ObserverBase<F> {
  handler: F,
  is_stopped: AtomicInt,
}

/// An [`ObserverBase`] around a boxed event handler.
pub type AnonymousObserver<Item, Err> = ObserverBase<Box<dyn Fn(Event<Item, Err>) + Send + Sync>>;

impl<F> ObserverBase<F> {
  pub fn new(handler: F) -> Self { Self { handler, is_stopped: AtomicInt::new(0) } }

  /// Whether a terminal event has passed through.
  #[inline]
  pub fn is_stopped(&self) -> bool { self.is_stopped.is_flag_set(1) }
}

impl<Item, Err> AnonymousObserver<Item, Err> {
  pub fn boxed(handler: impl Fn(Event<Item, Err>) + Send + Sync + 'static) -> Self {
    let handler: Box<dyn Fn(Event<Item, Err>) + Send + Sync> = Box::new(handler);
    ObserverBase::new(handler)
  }
}

impl<Item, Err, F> Observer<Item, Err> for ObserverBase<F>
where
  F: Fn(Event<Item, Err>) + Send + Sync,
{
  fn on(&self, event: Event<Item, Err>) {
    match event {
      Event::Next(_) => {
        if !self.is_stopped() {
          (self.handler)(event);
        }
      }
      Event::Error(_) | Event::Completed => {
        if self.is_stopped.fetch_or(1) == 0 {
          (self.handler)(event);
        }
      }
    }
  }
}
