use std::marker::PhantomData;

use crate::{
  disposable::{BoxedDisposable, NopDisposable},
  observer::{AnyObserver, Observer},
};

use super::Observable;

type TypeHint<T> = PhantomData<fn() -> T>;

/// Creates an observable that emits `value` and completes, on every
/// subscription.
///
/// # Examples
/// ```
/// use rxcore::prelude::*;
///
/// just::<_, ()>(42).subscribe_next(|v| assert_eq!(v, 42));
/// ```
pub fn just<Item, Err>(value: Item) -> Just<Item, Err> { Just { value, _hint: PhantomData } }

pub struct Just<Item, Err> {
  value: Item,
  _hint: TypeHint<Err>,
}

impl<Item: Clone, Err> Clone for Just<Item, Err> {
  fn clone(&self) -> Self { just(self.value.clone()) }
}

impl<Item, Err> Observable<Item, Err> for Just<Item, Err>
where
  Item: Clone + Send + Sync,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    observer.on_next(self.value.clone());
    observer.on_completed();
    Box::new(NopDisposable)
  }
}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(PhantomData) }

pub struct Empty<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err> Observable<Item, Err> for Empty<Item, Err> {
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    observer.on_completed();
    Box::new(NopDisposable)
  }
}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(PhantomData) }

pub struct Never<Item, Err>(TypeHint<(Item, Err)>);

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item, Err> Observable<Item, Err> for Never<Item, Err> {
  fn subscribe(&self, _observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    Box::new(NopDisposable)
  }
}

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `err` - An error to emit and terminate with
pub fn throw<Item, Err>(err: Err) -> Throw<Item, Err> { Throw { err, _hint: PhantomData } }

pub struct Throw<Item, Err> {
  err: Err,
  _hint: TypeHint<Item>,
}

impl<Item, Err: Clone> Clone for Throw<Item, Err> {
  fn clone(&self) -> Self { throw(self.err.clone()) }
}

impl<Item, Err> Observable<Item, Err> for Throw<Item, Err>
where
  Err: Clone + Send + Sync,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    observer.on_error(self.err.clone());
    Box::new(NopDisposable)
  }
}
