use std::sync::Arc;

use parking_lot::Mutex;

use super::{broadcast, SubjectState};
use crate::{
  disposable::{
    BoxedDisposable, Disposable, NopDisposable, SubscriptionDisposable, SynchronizedUnsubscribe,
  },
  error::RxError,
  event::Event,
  observable::Observable,
  observer::{AnyObserver, Observer},
  util::{sync_tracker::SynchronizationTracker, BagKey},
};

const OBJECT: &str = "PublishSubject";

/// A subject that broadcasts events to the observers currently subscribed.
///
/// Nothing is replayed except the terminal event: an observer subscribing
/// after completion or error receives just that event.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use parking_lot::Mutex;
/// use rxcore::prelude::*;
///
/// let subject = PublishSubject::<i32, RxError>::new();
/// let seen = Arc::new(Mutex::new(vec![]));
/// let s = seen.clone();
///
/// subject.on_next(1);
/// let _d = subject.subscribe_next(move |v| s.lock().push(v));
/// subject.on_next(2);
/// subject.on_completed();
/// subject.on_next(3);
/// assert_eq!(*seen.lock(), vec![2]);
/// ```
pub struct PublishSubject<Item, Err> {
  core: Arc<PublishCore<Item, Err>>,
}

struct PublishCore<Item, Err> {
  state: Mutex<SubjectState<Item, Err>>,
  tracker: SynchronizationTracker,
}

impl<Item, Err> Clone for PublishSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> Default for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  fn default() -> Self { Self::new() }
}

impl<Item, Err> PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  pub fn new() -> Self {
    Self {
      core: Arc::new(PublishCore {
        state: Mutex::new(SubjectState::default()),
        tracker: SynchronizationTracker::default(),
      }),
    }
  }

  /// Number of observers currently registered.
  pub fn observer_count(&self) -> usize { self.core.state.lock().observers.len() }

  pub fn has_observers(&self) -> bool { self.observer_count() > 0 }

  /// Feeds `event` into the subject.
  ///
  /// Fails only when the subject has been disposed. Events after a terminal
  /// event are accepted and dropped.
  pub fn try_on(&self, event: Event<Item, Err>) -> Result<(), RxError> {
    let _guard = self.core.tracker.register(OBJECT);
    let observers = self.core.state.lock().synchronized_on(OBJECT, &event)?;
    broadcast(observers, event);
    Ok(())
  }
}

impl<Item, Err> Observer<Item, Err> for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  fn on(&self, event: Event<Item, Err>) {
    if let Err(err) = self.try_on(event) {
      let label = err.as_label();
      tracing::warn!(error = %err, label, "event sent to a disposed subject was dropped");
    }
  }
}

impl<Item, Err> Observable<Item, Err> for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    let mut state = self.core.state.lock();
    let late = state.event_for_late_observer(OBJECT);
    if let Some(event) = late {
      drop(state);
      observer.on(event);
      return Box::new(NopDisposable);
    }
    let key = state.observers.insert(observer);
    Box::new(SubscriptionDisposable::new(Arc::downgrade(&self.core), key))
  }
}

impl<Item: Send, Err: Send> SynchronizedUnsubscribe for PublishCore<Item, Err> {
  type DisposeKey = BagKey;

  fn synchronized_unsubscribe(&self, key: BagKey) {
    let removed = self.state.lock().observers.remove(key);
    drop(removed);
  }
}

impl<Item, Err> Disposable for PublishSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  fn dispose(&self) {
    let released = self.core.state.lock().synchronized_dispose();
    tracing::debug!(observers = released.0.len(), "publish subject disposed");
    drop(released);
  }

  fn is_disposed(&self) -> bool { self.core.state.lock().is_disposed }
}
