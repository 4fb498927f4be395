//! Subjects: values that are both an observer and an observable.
//!
//! A subject fans every event it receives out to the observers registered
//! at that moment. All variants are cheap `Clone` handles onto one shared
//! core.
//!
//! # Delivery
//!
//! The decision of *what* to deliver and *to whom* is taken under the
//! subject's lock; the observers are then invoked outside of it. A callback
//! may therefore subscribe, dispose, or feed the subject again without
//! deadlocking. An observer registered while a value is being broadcast
//! does not receive that value.
//!
//! # Lifecycle
//!
//! | State | `subscribe` | `on` |
//! |-------|-------------|------|
//! | active | registers the observer | broadcasts |
//! | stopped | replays the terminal event | ignored |
//! | disposed | delivers `Error(RxError::Disposed)` | rejected, see [`PublishSubject::try_on`] |

mod behavior_subject;
mod publish_subject;
mod relay;

pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
pub use relay::{BehaviorRelay, PublishRelay};

use crate::{
  error::RxError,
  event::Event,
  observer::{AnyObserver, Observer},
  util::Bag,
};

/// Observer registry and terminal state shared by every subject variant.
struct SubjectState<Item, Err> {
  observers: Bag<AnyObserver<Item, Err>>,
  stopped_event: Option<Event<Item, Err>>,
  is_disposed: bool,
}

impl<Item, Err> Default for SubjectState<Item, Err> {
  fn default() -> Self {
    Self { observers: Bag::default(), stopped_event: None, is_disposed: false }
  }
}

impl<Item: Clone, Err: Clone> SubjectState<Item, Err> {
  fn is_stopped(&self) -> bool { self.stopped_event.is_some() }

  /// Decides who receives `event`. A terminal event is cached and empties
  /// the registry.
  fn synchronized_on(
    &mut self, object: &'static str, event: &Event<Item, Err>,
  ) -> Result<Vec<AnyObserver<Item, Err>>, RxError> {
    if self.is_disposed {
      return Err(RxError::Disposed { object });
    }
    if self.is_stopped() {
      return Ok(vec![]);
    }
    if event.is_stop_event() {
      self.stopped_event = Some(event.clone());
      return Ok(self.observers.drain().collect());
    }
    Ok(self.observers.snapshot())
  }

  /// The event a new observer receives instead of being registered.
  fn event_for_late_observer(&self, object: &'static str) -> Option<Event<Item, Err>>
  where
    Err: From<RxError>,
  {
    if self.is_disposed {
      return Some(Event::Error(RxError::Disposed { object }.into()));
    }
    self.stopped_event.clone()
  }

  /// Marks the subject disposed and hands back what it held, to be dropped
  /// outside the lock.
  fn synchronized_dispose(&mut self) -> (Bag<AnyObserver<Item, Err>>, Option<Event<Item, Err>>) {
    self.is_disposed = true;
    (std::mem::take(&mut self.observers), self.stopped_event.take())
  }
}

/// Delivers `event` to every observer, moving it into the last one.
fn broadcast<Item, Err>(observers: Vec<AnyObserver<Item, Err>>, event: Event<Item, Err>)
where
  Item: Clone,
  Err: Clone,
{
  let mut iter = observers.iter().peekable();
  while let Some(observer) = iter.next() {
    if iter.peek().is_some() {
      observer.on(event.clone());
    } else {
      observer.on(event);
      break;
    }
  }
}
