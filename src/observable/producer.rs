use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observer::{AnyObserver, Observer},
  scheduler::{CurrentThreadScheduler, ImmediateSchedulerType},
  util::AtomicInt,
};

/// An observable whose subscription builds a sink.
///
/// `run` wires `observer` into a fresh sink and starts the work. It returns
/// the sink and the subscription to the upstream work; both are handed to
/// `cancel`, which disposes them together.
///
/// Subscribing goes through [`Producer::subscribe_producer`], which makes
/// sure the outermost subscription on a thread runs on the
/// [`CurrentThreadScheduler`] trampoline. Work scheduled by a producer while
/// it is being wired up therefore runs only after `run` returned.
pub trait Producer<Item, Err>: Clone + Send + Sync + 'static {
  fn run(
    &self, observer: AnyObserver<Item, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable);

  fn subscribe_producer(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable
  where
    Item: 'static,
    Err: 'static,
  {
    if !CurrentThreadScheduler::is_schedule_required() {
      return run_producer(self, observer);
    }
    let producer = self.clone();
    CurrentThreadScheduler.schedule(observer, move |observer| run_producer(&producer, observer))
  }
}

fn run_producer<Item, Err, P: Producer<Item, Err>>(
  producer: &P, observer: AnyObserver<Item, Err>,
) -> BoxedDisposable {
  let disposer = Arc::new(SinkDisposer::new());
  let (sink, subscription) = producer.run(observer, disposer.clone());
  disposer.set_sink_and_subscription(sink, subscription);
  Box::new(disposer)
}

const DISPOSED: i32 = 1;
const SINK_AND_SUBSCRIPTION_SET: i32 = 2;

/// Disposes a producer's sink and upstream subscription together.
///
/// If disposal wins the race against `set_sink_and_subscription`, the pair
/// is disposed as soon as it is assigned.
pub struct SinkDisposer {
  state: AtomicInt,
  sink: Mutex<Option<BoxedDisposable>>,
  subscription: Mutex<Option<BoxedDisposable>>,
}

impl SinkDisposer {
  fn new() -> Self {
    Self { state: AtomicInt::new(0), sink: Mutex::new(None), subscription: Mutex::new(None) }
  }

  fn set_sink_and_subscription(&self, sink: BoxedDisposable, subscription: BoxedDisposable) {
    *self.sink.lock() = Some(sink);
    *self.subscription.lock() = Some(subscription);

    let previous = self.state.fetch_or(SINK_AND_SUBSCRIPTION_SET);
    assert!(previous & SINK_AND_SUBSCRIPTION_SET == 0, "sink and subscription already set");

    if previous & DISPOSED != 0 {
      self.dispose_pair();
    }
  }

  fn dispose_pair(&self) {
    let sink = self.sink.lock().take();
    let subscription = self.subscription.lock().take();
    if let Some(sink) = sink {
      sink.dispose();
    }
    if let Some(subscription) = subscription {
      subscription.dispose();
    }
  }
}

impl Disposable for SinkDisposer {
  fn dispose(&self) {
    let previous = self.state.fetch_or(DISPOSED);
    if previous & DISPOSED != 0 {
      return;
    }
    if previous & SINK_AND_SUBSCRIPTION_SET != 0 {
      self.dispose_pair();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.state.is_flag_set(DISPOSED) }
}

/// Downstream end of a producer.
///
/// Forwards events until disposed. Disposing it disposes the whole
/// subscription through the shared [`SinkDisposer`].
pub struct Sink<Item, Err> {
  observer: AnyObserver<Item, Err>,
  cancel: Arc<SinkDisposer>,
  disposed: AtomicInt,
}

impl<Item, Err> Sink<Item, Err> {
  pub fn new(observer: AnyObserver<Item, Err>, cancel: Arc<SinkDisposer>) -> Self {
    Self { observer, cancel, disposed: AtomicInt::new(0) }
  }

  /// Delivers `event` downstream unless the sink was disposed.
  pub fn forward_on(&self, event: Event<Item, Err>) {
    if !self.is_disposed() {
      self.observer.on(event);
    }
  }
}

impl<Item: 'static, Err: 'static> Sink<Item, Err> {
  /// An observer that forwards into this sink and disposes it after a
  /// terminal event.
  pub fn forwarder(self: &Arc<Self>) -> AnyObserver<Item, Err> {
    let sink = self.clone();
    AnyObserver::from_fn(move |event: Event<Item, Err>| {
      let stop = event.is_stop_event();
      sink.forward_on(event);
      if stop {
        sink.dispose();
      }
    })
  }
}

impl<Item, Err> Disposable for Sink<Item, Err> {
  fn dispose(&self) {
    self.disposed.fetch_or(1);
    self.cancel.dispose();
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.is_flag_set(1) }
}
