use std::{marker::PhantomData, sync::Arc};

use super::{Observable, Producer, Sink, SinkDisposer};
use crate::{disposable::BoxedDisposable, observer::AnyObserver};

/// Creates an observable that will on subscription defer to another observable
/// that is supplied by a factory which will be run once at each subscription.
///
/// ```rust
/// use std::sync::{
///   atomic::{AtomicUsize, Ordering},
///   Arc,
/// };
///
/// use rxcore::prelude::*;
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let c = calls.clone();
/// let source = deferred(move || {
///   c.fetch_add(1, Ordering::SeqCst);
///   just::<_, ()>("Hello!")
/// });
/// assert_eq!(calls.load(Ordering::SeqCst), 0);
/// source.subscribe_next(|v| assert_eq!(v, "Hello!"));
/// source.subscribe_next(|v| assert_eq!(v, "Hello!"));
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// ```
pub fn deferred<F, O, Item, Err>(factory: F) -> Deferred<F, Item, Err>
where
  F: Fn() -> O + Send + Sync + 'static,
  O: Observable<Item, Err>,
{
  Deferred { factory: Arc::new(factory), _marker: PhantomData }
}

pub struct Deferred<F, Item, Err> {
  factory: Arc<F>,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F, Item, Err> Clone for Deferred<F, Item, Err> {
  fn clone(&self) -> Self { Self { factory: self.factory.clone(), _marker: PhantomData } }
}

impl<F, O, Item, Err> Producer<Item, Err> for Deferred<F, Item, Err>
where
  F: Fn() -> O + Send + Sync + 'static,
  O: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn run(
    &self, observer: AnyObserver<Item, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable) {
    let sink = Arc::new(Sink::new(observer, cancel));
    let source = (self.factory)();
    let subscription = source.subscribe(sink.forwarder());
    (Box::new(sink), subscription)
  }
}

impl<F, O, Item, Err> Observable<Item, Err> for Deferred<F, Item, Err>
where
  F: Fn() -> O + Send + Sync + 'static,
  O: Observable<Item, Err>,
  Item: 'static,
  Err: 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    self.subscribe_producer(observer)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use parking_lot::Mutex;

  use super::*;
  use crate::{
    event::Event,
    observable::{of, throw, ObservableExt},
  };

  #[test]
  fn factory_runs_per_subscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let source = deferred(move || {
      let n = c.fetch_add(1, Ordering::SeqCst) as i32;
      of::<_, ()>(vec![n, n + 10])
    });

    let log = Arc::new(Mutex::new(vec![]));
    for _ in 0..2 {
      let l = log.clone();
      source.subscribe_next(move |v| l.lock().push(v));
    }
    assert_eq!(*log.lock(), vec![0, 10, 1, 11]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn forwards_errors() {
    let source = deferred(|| throw::<i32, _>("nope"));
    let log = Arc::new(Mutex::new(vec![]));
    let l = log.clone();
    source.subscribe_event(move |e| l.lock().push(e));
    assert_eq!(*log.lock(), vec![Event::Error("nope")]);
  }
}
