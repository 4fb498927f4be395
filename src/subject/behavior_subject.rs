use std::{cell::RefCell, sync::Arc};

use parking_lot::ReentrantMutex;

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

const OBJECT: &str = "BehaviorSubject";

/// A subject that remembers the latest value and replays it to every new
/// subscriber before any further event.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use parking_lot::Mutex;
/// use rxcore::prelude::*;
///
/// let subject = BehaviorSubject::<_, RxError>::new(0);
/// subject.on_next(1);
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let s = seen.clone();
/// let _d = subject.subscribe_next(move |v| s.lock().push(v));
/// subject.on_next(2);
///
/// assert_eq!(*seen.lock(), vec![1, 2]);
/// assert_eq!(subject.value(), Ok(2));
/// ```
pub struct BehaviorSubject<Item, Err> {
  core: Arc<BehaviorCore<Item, Err>>,
}

struct BehaviorState<Item, Err> {
  subject: SubjectState<Item, Err>,
  value: Item,
}

// The lock is re-entrant so the initial delivery, which runs under it, may
// feed the subject again from the same thread.
struct BehaviorCore<Item, Err> {
  state: ReentrantMutex<RefCell<BehaviorState<Item, Err>>>,
  tracker: SynchronizationTracker,
}

impl<Item, Err> Clone for BehaviorSubject<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item, Err> BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  pub fn new(value: Item) -> Self {
    let state = BehaviorState { subject: SubjectState::default(), value };
    Self {
      core: Arc::new(BehaviorCore {
        state: ReentrantMutex::new(RefCell::new(state)),
        tracker: SynchronizationTracker::default(),
      }),
    }
  }

  /// The latest value.
  ///
  /// Fails with the terminal error if the subject errored, or with
  /// `RxError::Disposed` once disposed. A completed subject still reports
  /// its last value.
  pub fn value(&self) -> Result<Item, Err> {
    let guard = self.core.state.lock();
    let state = guard.borrow();
    if state.subject.is_disposed {
      return Err(RxError::Disposed { object: OBJECT }.into());
    }
    match &state.subject.stopped_event {
      Some(Event::Error(err)) => Err(err.clone()),
      _ => Ok(state.value.clone()),
    }
  }

  /// The latest value regardless of the subject's state.
  pub(crate) fn current(&self) -> Item { self.core.state.lock().borrow().value.clone() }

  pub fn observer_count(&self) -> usize { self.core.state.lock().borrow().subject.observers.len() }

  pub fn has_observers(&self) -> bool { self.observer_count() > 0 }

  /// Feeds `event` into the subject, failing only once it is disposed.
  pub fn try_on(&self, event: Event<Item, Err>) -> Result<(), RxError> {
    let _guard = self.core.tracker.register(OBJECT);
    let observers = {
      let lock = self.core.state.lock();
      let mut state = lock.borrow_mut();
      let observers = state.subject.synchronized_on(OBJECT, &event)?;
      if !state.subject.is_stopped() {
        if let Event::Next(value) = &event {
          state.value = value.clone();
        }
      }
      observers
    };
    broadcast(observers, event);
    Ok(())
  }
}

impl<Item, Err> Observer<Item, Err> for BehaviorSubject<Item, Err>
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

impl<Item, Err> Observable<Item, Err> for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    let lock = self.core.state.lock();
    let registered = {
      let mut state = lock.borrow_mut();
      match state.subject.event_for_late_observer(OBJECT) {
        Some(event) => Err(event),
        None => {
          let key = state.subject.observers.insert(observer.clone());
          Ok((key, state.value.clone()))
        }
      }
    };
    match registered {
      Ok((key, value)) => {
        observer.on_next(value);
        drop(lock);
        Box::new(SubscriptionDisposable::new(Arc::downgrade(&self.core), key))
      }
      Err(event) => {
        drop(lock);
        observer.on(event);
        Box::new(NopDisposable)
      }
    }
  }
}

impl<Item: Send, Err: Send> SynchronizedUnsubscribe for BehaviorCore<Item, Err> {
  type DisposeKey = BagKey;

  fn synchronized_unsubscribe(&self, key: BagKey) {
    let removed = self.state.lock().borrow_mut().subject.observers.remove(key);
    drop(removed);
  }
}

impl<Item, Err> Disposable for BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + From<RxError> + 'static,
{
  fn dispose(&self) {
    let released = self.core.state.lock().borrow_mut().subject.synchronized_dispose();
    tracing::debug!(observers = released.0.len(), "behavior subject disposed");
    drop(released);
  }

  fn is_disposed(&self) -> bool { self.core.state.lock().borrow().subject.is_disposed }
}

#[cfg(test)]
mod tests {
  use parking_lot::Mutex;

  use super::*;
  use crate::observable::ObservableExt;

  type Log = Arc<Mutex<Vec<Event<i32, RxError>>>>;

  fn recorder(subject: &BehaviorSubject<i32, RxError>) -> (Log, BoxedDisposable) {
    let log: Log = Arc::new(Mutex::new(vec![]));
    let l = log.clone();
    let d = subject.subscribe_event(move |e| l.lock().push(e));
    (log, d)
  }

  #[test]
  fn replays_latest_value() {
    let subject = BehaviorSubject::new(1);
    let (a, _da) = recorder(&subject);
    subject.on_next(2);
    let (b, _db) = recorder(&subject);
    subject.on_next(3);
    assert_eq!(*a.lock(), vec![Event::Next(1), Event::Next(2), Event::Next(3)]);
    assert_eq!(*b.lock(), vec![Event::Next(2), Event::Next(3)]);
    assert_eq!(subject.observer_count(), 2);
  }

  #[test]
  fn value_reflects_terminal_state() {
    let subject = BehaviorSubject::<i32, RxError>::new(1);
    subject.on_next(5);
    subject.on_completed();
    subject.on_next(6);
    assert_eq!(subject.value(), Ok(5));

    let failed = BehaviorSubject::<i32, RxError>::new(1);
    failed.on_error(RxError::Unknown);
    assert_eq!(failed.value(), Err(RxError::Unknown));
    assert_eq!(failed.current(), 1);

    failed.dispose();
    assert_eq!(failed.value(), Err(RxError::Disposed { object: "BehaviorSubject" }));
  }

  #[test]
  fn stopped_subject_replays_only_the_terminal_event() {
    let subject = BehaviorSubject::new(1);
    subject.on_completed();
    let (late, d) = recorder(&subject);
    assert_eq!(*late.lock(), vec![Event::Completed]);
    assert!(d.is_disposed());
    assert!(!subject.has_observers());
  }

  #[test]
  fn feeding_the_subject_from_the_initial_delivery() {
    let subject = BehaviorSubject::<i32, RxError>::new(0);
    let log = Arc::new(Mutex::new(vec![]));
    let (s, l) = (subject.clone(), log.clone());
    let _d = subject.subscribe_next(move |v| {
      l.lock().push(v);
      if v == 0 {
        s.on_next(1);
      }
    });
    assert_eq!(*log.lock(), vec![0, 1]);
    assert_eq!(subject.value(), Ok(1));
  }

  #[test]
  fn disposed_subject_rejects_emission() {
    let subject = BehaviorSubject::new(1);
    let (a, da) = recorder(&subject);
    da.dispose();
    subject.dispose();
    assert!(subject.is_disposed());
    assert!(subject.try_on(Event::Next(2)).is_err());
    assert_eq!(*a.lock(), vec![Event::Next(1)]);

    let (late, _d) = recorder(&subject);
    assert_eq!(*late.lock(), vec![Event::Error(RxError::Disposed { object: "BehaviorSubject" })]);
  }

  #[test]
  fn concurrent_emission_never_overtakes_the_initial_value() {
    let subject = BehaviorSubject::<i32, RxError>::new(0);
    let emitter = {
      let subject = subject.clone();
      std::thread::spawn(move || {
        for i in 1..=1000 {
          subject.on_next(i);
        }
      })
    };
    let mut logs = vec![];
    for _ in 0..20 {
      let log = Arc::new(Mutex::new(vec![]));
      let l = log.clone();
      subject.subscribe_next(move |v| l.lock().push(v));
      logs.push(log);
    }
    emitter.join().unwrap();
    for log in logs {
      let log = log.lock();
      assert!(log.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", *log);
      assert_eq!(log.last(), Some(&1000));
    }
  }
}
