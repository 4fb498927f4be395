//! Scripted hot and cold sources driven by a [`TestScheduler`].

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{test_scheduler::Recorded, SchedulerType, TestScheduler};
use crate::{
  disposable::{BoxedDisposable, Disposables, NopDisposable},
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer},
  util::Bag,
};

/// Virtual times at which an observer subscribed and unsubscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestSubscription {
  pub subscribe: Duration,
  pub unsubscribe: Option<Duration>,
}

impl TestSubscription {
  pub fn new(subscribe: Duration, unsubscribe: Duration) -> Self {
    Self { subscribe, unsubscribe: Some(unsubscribe) }
  }

  /// A subscription that was never disposed.
  pub fn open(subscribe: Duration) -> Self { Self { subscribe, unsubscribe: None } }
}

#[derive(Default)]
struct SubscriptionLog(Mutex<Vec<TestSubscription>>);

impl SubscriptionLog {
  fn opened(&self, at: Duration) -> usize {
    let mut log = self.0.lock();
    log.push(TestSubscription::open(at));
    log.len() - 1
  }

  fn closed(&self, index: usize, at: Duration) {
    if let Some(entry) = self.0.lock().get_mut(index) {
      entry.unsubscribe = Some(at);
    }
  }

  fn snapshot(&self) -> Vec<TestSubscription> { self.0.lock().clone() }
}

/// Emits its messages at their absolute virtual times, to whoever is
/// subscribed at that moment.
pub struct HotObservable<Item, Err> {
  inner: Arc<HotInner<Item, Err>>,
}

struct HotInner<Item, Err> {
  scheduler: TestScheduler,
  observers: Mutex<Bag<AnyObserver<Item, Err>>>,
  subscriptions: SubscriptionLog,
}

impl<Item, Err> Clone for HotObservable<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> HotObservable<Item, Err> {
  pub fn subscriptions(&self) -> Vec<TestSubscription> { self.inner.subscriptions.snapshot() }
}

impl<Item, Err> Observable<Item, Err> for HotObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    let key = self.inner.observers.lock().insert(observer);
    let index = self.inner.subscriptions.opened(self.inner.scheduler.clock());
    let inner = self.inner.clone();
    Box::new(Disposables::create_with(move || {
      let removed = inner.observers.lock().remove(key);
      drop(removed);
      inner.subscriptions.closed(index, inner.scheduler.clock());
    }))
  }
}

/// Replays its messages for each subscriber, with times taken relative to
/// the moment of subscription.
pub struct ColdObservable<Item, Err> {
  scheduler: TestScheduler,
  messages: Arc<Vec<Recorded<Event<Item, Err>>>>,
  subscriptions: Arc<SubscriptionLog>,
}

impl<Item, Err> Clone for ColdObservable<Item, Err> {
  fn clone(&self) -> Self {
    Self {
      scheduler: self.scheduler.clone(),
      messages: self.messages.clone(),
      subscriptions: self.subscriptions.clone(),
    }
  }
}

impl<Item, Err> ColdObservable<Item, Err> {
  pub fn subscriptions(&self) -> Vec<TestSubscription> { self.subscriptions.snapshot() }
}

impl<Item, Err> Observable<Item, Err> for ColdObservable<Item, Err>
where
  Item: Clone + Send + Sync + 'static,
  Err: Clone + Send + Sync + 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    let index = self.subscriptions.opened(self.scheduler.clock());
    let scheduled = self
      .messages
      .iter()
      .map(|recorded| {
        let state = (observer.clone(), recorded.value.clone());
        self.scheduler.schedule_relative(state, recorded.time, |(observer, event)| {
          observer.on(event);
          Box::new(NopDisposable) as BoxedDisposable
        })
      })
      .collect::<Vec<_>>();
    let (scheduler, subscriptions) = (self.scheduler.clone(), self.subscriptions.clone());
    Box::new(Disposables::create_binary(
      Disposables::create_with(move || subscriptions.closed(index, scheduler.clock())),
      Disposables::create_composite(scheduled),
    ))
  }
}

impl TestScheduler {
  /// A hot source that emits `messages` at their absolute times, whether or
  /// not anyone is subscribed.
  pub fn create_hot_observable<Item, Err>(
    &self, messages: Vec<Recorded<Event<Item, Err>>>,
  ) -> HotObservable<Item, Err>
  where
    Item: Clone + Send + 'static,
    Err: Clone + Send + 'static,
  {
    let inner = Arc::new(HotInner {
      scheduler: self.clone(),
      observers: Mutex::new(Bag::default()),
      subscriptions: SubscriptionLog::default(),
    });
    for recorded in messages {
      let state = (inner.clone(), recorded.value);
      self.schedule_at(state, recorded.time, |(inner, event)| {
        let observers = inner.observers.lock().snapshot();
        for observer in observers {
          observer.on(event.clone());
        }
        Box::new(NopDisposable)
      });
    }
    HotObservable { inner }
  }

  /// A cold source that replays `messages` for every subscriber, each time
  /// relative to that subscription.
  pub fn create_cold_observable<Item, Err>(
    &self, messages: Vec<Recorded<Event<Item, Err>>>,
  ) -> ColdObservable<Item, Err> {
    ColdObservable {
      scheduler: self.clone(),
      messages: Arc::new(messages),
      subscriptions: Arc::new(SubscriptionLog::default()),
    }
  }
}
