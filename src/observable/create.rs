use std::{marker::PhantomData, sync::Arc};

use super::{Observable, Producer, Sink, SinkDisposer};
use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observer::{AnyObserver, Observer},
  util::AtomicInt,
};

/// Creates an observable from a subscribe function.
///
/// `subscribe` runs once per subscription. It receives an observer to emit
/// into and returns the disposable that tears its work down. Events after
/// the first terminal event are dropped, and a terminal event disposes the
/// subscription.
///
/// # Examples
/// ```
/// use rxcore::prelude::*;
///
/// let source = create(|observer: AnyObserver<i32, ()>| {
///   observer.on_next(1);
///   observer.on_next(2);
///   observer.on_completed();
///   observer.on_next(3);
///   Box::new(Disposables::create())
/// });
/// source.subscribe_next(|v| assert!(v < 3));
/// ```
pub fn create<Item, Err, F>(subscribe: F) -> Create<F, Item, Err>
where
  F: Fn(AnyObserver<Item, Err>) -> BoxedDisposable + Send + Sync + 'static,
{
  Create { subscribe: Arc::new(subscribe), _marker: PhantomData }
}

/// Observable created from a function.
///
/// This struct is created by [`create`].
pub struct Create<F, Item, Err> {
  subscribe: Arc<F>,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Self { subscribe: self.subscribe.clone(), _marker: PhantomData } }
}

impl<F, Item, Err> Producer<Item, Err> for Create<F, Item, Err>
where
  F: Fn(AnyObserver<Item, Err>) -> BoxedDisposable + Send + Sync + 'static,
  Item: 'static,
  Err: 'static,
{
  fn run(
    &self, observer: AnyObserver<Item, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable) {
    let sink =
      Arc::new(CreateSink { sink: Sink::new(observer, cancel), is_stopped: AtomicInt::new(0) });
    let emitter = sink.clone();
    let subscription = (self.subscribe)(AnyObserver::from_fn(move |event| emitter.on(event)));
    (Box::new(sink), subscription)
  }
}

impl<F, Item, Err> Observable<Item, Err> for Create<F, Item, Err>
where
  F: Fn(AnyObserver<Item, Err>) -> BoxedDisposable + Send + Sync + 'static,
  Item: 'static,
  Err: 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    self.subscribe_producer(observer)
  }
}

struct CreateSink<Item, Err> {
  sink: Sink<Item, Err>,
  is_stopped: AtomicInt,
}

impl<Item, Err> CreateSink<Item, Err> {
  fn on(&self, event: Event<Item, Err>) {
    match event {
      Event::Next(_) => {
        if !self.is_stopped.is_flag_set(1) {
          self.sink.forward_on(event);
        }
      }
      Event::Error(_) | Event::Completed => {
        if self.is_stopped.fetch_or(1) == 0 {
          self.sink.forward_on(event);
          self.sink.dispose();
        }
      }
    }
  }
}

impl<Item, Err> Disposable for CreateSink<Item, Err> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}
