//! Observable trait and factories.
//!
//! An [`Observable`] is a producer of a `Next* (Error | Completed)?` event
//! sequence. `subscribe` wires an observer to it and hands back the
//! [`BoxedDisposable`] that severs the wiring again.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use rxcore::prelude::*;
//!
//! let log = Arc::new(Mutex::new(vec![]));
//! let l = log.clone();
//! let _d = of::<_, RxError>([1, 2])
//!   .concat_with(just(3))
//!   .subscribe_next(move |v| l.lock().push(v));
//! assert_eq!(*log.lock(), vec![1, 2, 3]);
//! ```

mod create;
mod deferred;
mod from_iter;
mod producer;
mod tail_recursive;
mod timer;
mod trivial;

use std::{fmt::Debug, sync::Arc};

pub use create::{create, Create};
pub use deferred::{deferred, Deferred};
pub use from_iter::{from_iter, from_iter_on, of, FromIter};
pub use producer::{Producer, Sink, SinkDisposer};
pub use tail_recursive::{concat, Concat, ConcatSources, MAX_TAIL_RECURSIVE_SINK_STACK_SIZE};
pub use timer::{interval, timer, Interval, Timer};
pub use trivial::{empty, just, never, throw, Empty, Just, Never, Throw};

use crate::{
  disposable::BoxedDisposable,
  error::RxError,
  event::Event,
  hooks::Hooks,
  observer::{AnonymousObserver, AnyObserver, Observer},
};

/// A sequence of events that can be subscribed to.
pub trait Observable<Item, Err>: Send + Sync {
  /// Starts delivering events to `observer`.
  ///
  /// Disposing the result stops delivery and releases whatever the
  /// subscription holds.
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable;

  /// The sources of a concatenation, so an enclosing concatenation can
  /// flatten them instead of nesting subscriptions.
  #[doc(hidden)]
  fn concat_sources(&self) -> Option<ConcatSources<Item, Err>> { None }
}

/// Type-erased, shareable observable.
pub type BoxedObservable<Item, Err> = Arc<dyn Observable<Item, Err>>;

impl<Item, Err, O: ?Sized + Observable<Item, Err>> Observable<Item, Err> for Arc<O> {
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    (**self).subscribe(observer)
  }

  fn concat_sources(&self) -> Option<ConcatSources<Item, Err>> { (**self).concat_sources() }
}

impl<Item, Err, O: ?Sized + Observable<Item, Err>> Observable<Item, Err> for Box<O> {
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    (**self).subscribe(observer)
  }

  fn concat_sources(&self) -> Option<ConcatSources<Item, Err>> { (**self).concat_sources() }
}

/// Subscription conveniences and composition for every observable.
pub trait ObservableExt<Item, Err>: Observable<Item, Err>
where
  Item: 'static,
  Err: 'static,
{
  /// Subscribes any observer implementation.
  fn subscribe_observer(&self, observer: impl Observer<Item, Err> + 'static) -> BoxedDisposable {
    self.subscribe(AnyObserver::new(observer))
  }

  /// Subscribes an event handler. The handler sees at most one terminal
  /// event and nothing after it.
  fn subscribe_event(
    &self, handler: impl Fn(Event<Item, Err>) + Send + Sync + 'static,
  ) -> BoxedDisposable {
    self.subscribe_observer(AnonymousObserver::boxed(handler))
  }

  /// Subscribes one handler per event kind.
  fn subscribe_all(
    &self, next: impl Fn(Item) + Send + Sync + 'static, error: impl Fn(Err) + Send + Sync + 'static,
    completed: impl Fn() + Send + Sync + 'static,
  ) -> BoxedDisposable {
    self.subscribe_event(move |event| match event {
      Event::Next(value) => next(value),
      Event::Error(err) => error(err),
      Event::Completed => completed(),
    })
  }

  /// Subscribes a value handler only.
  ///
  /// An error reaching this subscription has nowhere to go and is passed to
  /// the default error handler in [`Hooks`].
  fn subscribe_next(&self, next: impl Fn(Item) + Send + Sync + 'static) -> BoxedDisposable
  where
    Err: Debug,
  {
    self.subscribe_event(move |event| match event {
      Event::Next(value) => next(value),
      Event::Error(err) => Hooks::unhandled_error(&err),
      Event::Completed => {}
    })
  }

  /// Emits everything from `self`, then everything from `other`.
  fn concat_with(
    self, other: impl Observable<Item, Err> + 'static,
  ) -> Concat<Vec<BoxedObservable<Item, Err>>, Item, Err>
  where
    Self: Sized + 'static,
    Item: Send,
    Err: Send + From<RxError>,
  {
    concat(vec![self.into_boxed(), Arc::new(other) as BoxedObservable<Item, Err>])
  }

  /// Erases the concrete observable type.
  fn into_boxed(self) -> BoxedObservable<Item, Err>
  where
    Self: Sized + 'static,
  {
    Arc::new(self)
  }
}

impl<Item, Err, O> ObservableExt<Item, Err> for O
where
  Item: 'static,
  Err: 'static,
  O: ?Sized + Observable<Item, Err>,
{
}
