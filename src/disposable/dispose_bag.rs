use std::mem;

use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};

/// A scope-bound collection of disposables.
///
/// Everything inserted is disposed when the bag is dropped, in insertion
/// order, each exactly once. Inserting into a bag that was already drained
/// disposes the argument immediately, so nothing is silently leaked.
///
/// ```rust
/// use std::sync::Arc;
///
/// use rxcore::prelude::*;
///
/// let flag = Arc::new(BooleanDisposable::new());
/// {
///   let bag = DisposeBag::new();
///   flag.clone().disposed_by(&bag);
///   assert!(!flag.is_disposed());
/// }
/// assert!(flag.is_disposed());
/// ```
#[derive(Default)]
#[must_use]
pub struct DisposeBag {
  state: Mutex<DisposeBagState>,
}

#[derive(Default)]
struct DisposeBagState {
  disposables: Vec<BoxedDisposable>,
  is_disposed: bool,
}

impl DisposeBag {
  pub fn new() -> Self { Self::default() }

  /// Adds `disposable` to the bag.
  pub fn insert(&self, disposable: impl Disposable + 'static) {
    let disposable: BoxedDisposable = Box::new(disposable);
    let rejected = {
      let mut state = self.state.lock();
      if state.is_disposed {
        Some(disposable)
      } else {
        state.disposables.push(disposable);
        None
      }
    };
    if let Some(d) = rejected {
      d.dispose();
    }
  }

  /// Number of disposables waiting in the bag.
  pub fn len(&self) -> usize { self.state.lock().disposables.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Drains the bag now instead of at drop time.
  pub fn dispose(&self) {
    let drained = {
      let mut state = self.state.lock();
      state.is_disposed = true;
      mem::take(&mut state.disposables)
    };
    for d in drained {
      d.dispose();
    }
  }
}

impl Disposable for DisposeBag {
  #[inline]
  fn dispose(&self) { DisposeBag::dispose(self) }

  fn is_disposed(&self) -> bool { self.state.lock().is_disposed }
}

impl Drop for DisposeBag {
  fn drop(&mut self) { DisposeBag::dispose(self) }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;
  use crate::disposable::{AnonymousDisposable, BooleanDisposable};

  #[test]
  fn drains_in_insertion_order_once() {
    let log = Arc::new(Mutex::new(vec![]));
    let bag = DisposeBag::new();
    for name in ["d1", "d2", "d3"] {
      let log = log.clone();
      bag.insert(AnonymousDisposable::new(move || log.lock().push(name)));
    }
    assert_eq!(bag.len(), 3);

    drop(bag);
    assert_eq!(*log.lock(), vec!["d1", "d2", "d3"]);
  }

  #[test]
  fn insert_after_dispose_is_immediate() {
    let bag = DisposeBag::new();
    bag.dispose();
    let late = Arc::new(BooleanDisposable::new());
    bag.insert(late.clone());
    assert!(late.is_disposed());
    assert!(bag.is_empty());
  }

  #[test]
  fn explicit_dispose_then_drop_runs_once() {
    let count = Arc::new(Mutex::new(0));
    let bag = DisposeBag::new();
    let c = count.clone();
    bag.insert(AnonymousDisposable::new(move || *c.lock() += 1));
    bag.dispose();
    drop(bag);
    assert_eq!(*count.lock(), 1);
  }
}
