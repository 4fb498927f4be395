use crate::{
  disposable::BoxedDisposable,
  error::RxError,
  observable::Observable,
  observer::{AnyObserver, Observer},
};

use super::{BehaviorSubject, PublishSubject};

/// A [`PublishSubject`] that can only be fed values.
///
/// A relay never errors and never completes, so subscribers stay attached
/// until they dispose their subscription.
pub struct PublishRelay<Item> {
  subject: PublishSubject<Item, RxError>,
}

impl<Item> Clone for PublishRelay<Item> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone() } }
}

impl<Item: Clone + Send + 'static> Default for PublishRelay<Item> {
  fn default() -> Self { Self::new() }
}

impl<Item: Clone + Send + 'static> PublishRelay<Item> {
  pub fn new() -> Self { Self { subject: PublishSubject::new() } }

  /// Broadcasts `value` to the current subscribers.
  pub fn accept(&self, value: Item) { self.subject.on_next(value) }

  pub fn observer_count(&self) -> usize { self.subject.observer_count() }
}

impl<Item: Clone + Send + 'static> Observable<Item, RxError> for PublishRelay<Item> {
  fn subscribe(&self, observer: AnyObserver<Item, RxError>) -> BoxedDisposable {
    self.subject.subscribe(observer)
  }
}

/// A [`BehaviorSubject`] that can only be fed values.
///
/// # Examples
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let relay = BehaviorRelay::new("idle");
/// relay.accept("busy");
/// assert_eq!(relay.value(), "busy");
/// relay.subscribe_next(|state| assert_eq!(state, "busy"));
/// ```
pub struct BehaviorRelay<Item> {
  subject: BehaviorSubject<Item, RxError>,
}

impl<Item> Clone for BehaviorRelay<Item> {
  fn clone(&self) -> Self { Self { subject: self.subject.clone() } }
}

impl<Item: Clone + Send + 'static> BehaviorRelay<Item> {
  pub fn new(value: Item) -> Self { Self { subject: BehaviorSubject::new(value) } }

  pub fn accept(&self, value: Item) { self.subject.on_next(value) }

  /// The latest accepted value.
  pub fn value(&self) -> Item { self.subject.current() }

  pub fn observer_count(&self) -> usize { self.subject.observer_count() }
}

impl<Item: Clone + Send + 'static> Observable<Item, RxError> for BehaviorRelay<Item> {
  fn subscribe(&self, observer: AnyObserver<Item, RxError>) -> BoxedDisposable {
    self.subject.subscribe(observer)
  }
}
