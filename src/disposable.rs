//! Cancellation handles.
//!
//! Every `subscribe` and every scheduling call hands back a [`Disposable`].
//! Disposing it releases the resources held by that piece of work: the
//! observer registration, the pending timer, the inner subscription.
//!
//! `dispose()` may be called any number of times from any thread, its side
//! effects happen at most once.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::{
//!   atomic::{AtomicUsize, Ordering},
//!   Arc,
//! };
//!
//! use rxcore::prelude::*;
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let c = calls.clone();
//! let d = Disposables::create_with(move || {
//!   c.fetch_add(1, Ordering::SeqCst);
//! });
//! d.dispose();
//! d.dispose();
//! assert!(d.is_disposed());
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

mod anonymous;
mod binary;
mod boolean;
mod composite;
mod dispose_bag;
mod serial;
mod single_assignment;
mod subscription;

use std::{
  fmt::{Debug, Formatter},
  sync::Arc,
};

pub use anonymous::AnonymousDisposable;
pub use binary::BinaryDisposable;
pub use boolean::BooleanDisposable;
pub use composite::CompositeDisposable;
pub use dispose_bag::DisposeBag;
pub use serial::SerialDisposable;
pub use single_assignment::SingleAssignmentDisposable;
pub use subscription::{SubscriptionDisposable, SynchronizedUnsubscribe};

/// A handle that releases a resource when disposed.
pub trait Disposable: Send + Sync {
  /// Releases the resource. Idempotent.
  fn dispose(&self);

  /// Whether `dispose` has already taken effect.
  fn is_disposed(&self) -> bool;
}

/// Type-erased disposable, what `subscribe` and the schedulers return.
pub type BoxedDisposable = Box<dyn Disposable>;

impl Debug for dyn Disposable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("dyn Disposable").field("is_disposed", &self.is_disposed()).finish()
  }
}

impl<T: ?Sized + Disposable> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: ?Sized + Disposable> Disposable for Arc<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }
  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// Disposable that does nothing.
///
/// Returned when `subscribe` has nothing to cancel, for example when a
/// stopped subject replays its terminal event. It is zero-sized, so every
/// boxed instance shares the same non-allocated value. It reports itself
/// as disposed: there is never anything left to release.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopDisposable;

impl Disposable for NopDisposable {
  #[inline]
  fn dispose(&self) {}
  #[inline]
  fn is_disposed(&self) -> bool { true }
}

/// Constructors for the common disposables.
pub struct Disposables;

impl Disposables {
  /// The shared no-op disposable.
  #[inline]
  pub fn create() -> NopDisposable { NopDisposable }

  /// A disposable that runs `action` on the first `dispose()`.
  pub fn create_with(action: impl FnOnce() + Send + 'static) -> AnonymousDisposable {
    AnonymousDisposable::new(action)
  }

  /// A disposable that disposes both arguments together.
  pub fn create_binary(
    first: impl Disposable + 'static, second: impl Disposable + 'static,
  ) -> BinaryDisposable {
    BinaryDisposable::new(first, second)
  }

  /// A disposable that disposes every element of `disposables`.
  pub fn create_composite(
    disposables: impl IntoIterator<Item = BoxedDisposable>,
  ) -> CompositeDisposable {
    CompositeDisposable::from_disposables(disposables)
  }
}

/// Extension methods for every disposable.
pub trait DisposableExt: Disposable + Sized + 'static {
  /// Adds `self` to `bag`, it is disposed when the bag is dropped.
  #[inline]
  fn disposed_by(self, bag: &DisposeBag) { bag.insert(self) }

  /// Boxes the disposable.
  #[inline]
  fn into_boxed_disposable(self) -> BoxedDisposable { Box::new(self) }
}

impl<T: Disposable + Sized + 'static> DisposableExt for T {}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use proptest::prelude::*;

  use super::*;

  fn counting() -> (AnonymousDisposable, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    (
      Disposables::create_with(move || {
        c.fetch_add(1, Ordering::SeqCst);
      }),
      count,
    )
  }

  #[test]
  fn nop_is_zero_sized() {
    assert_eq!(std::mem::size_of::<NopDisposable>(), 0);
    let d = Disposables::create();
    d.dispose();
    assert!(d.is_disposed());
  }

  #[test]
  fn boxed_and_arced_forward() {
    let (d, count) = counting();
    let shared: Arc<dyn Disposable> = Arc::new(d);
    let boxed: BoxedDisposable = Box::new(shared.clone());
    assert!(!boxed.is_disposed());
    boxed.dispose();
    assert!(shared.is_disposed());
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  proptest! {
    #[test]
    fn dispose_is_idempotent(times in 1usize..20) {
      let (anonymous, anonymous_count) = counting();
      let (first, first_count) = counting();
      let (second, second_count) = counting();
      let binary = Disposables::create_binary(first, second);
      let (inner, composite_count) = counting();
      let composite = Disposables::create_composite([inner.into_boxed_disposable()]);

      for _ in 0..times {
        anonymous.dispose();
        binary.dispose();
        composite.dispose();
        prop_assert!(anonymous.is_disposed());
        prop_assert!(binary.is_disposed());
        prop_assert!(composite.is_disposed());
      }
      prop_assert_eq!(anonymous_count.load(Ordering::SeqCst), 1);
      prop_assert_eq!(first_count.load(Ordering::SeqCst), 1);
      prop_assert_eq!(second_count.load(Ordering::SeqCst), 1);
      prop_assert_eq!(composite_count.load(Ordering::SeqCst), 1);
    }
  }
}
