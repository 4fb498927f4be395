use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};
use crate::util::{Bag, BagKey};

/// A group of disposables that are disposed together.
///
/// Members can be removed again by the key `insert` returned, which disposes
/// them. Inserting into a disposed group disposes the argument immediately.
pub struct CompositeDisposable {
  disposables: Mutex<Option<Bag<BoxedDisposable>>>,
}

impl Default for CompositeDisposable {
  fn default() -> Self { Self { disposables: Mutex::new(Some(Bag::default())) } }
}

impl CompositeDisposable {
  pub fn new() -> Self { Self::default() }

  pub fn from_disposables(disposables: impl IntoIterator<Item = BoxedDisposable>) -> Self {
    let mut bag = Bag::default();
    for d in disposables {
      bag.insert(d);
    }
    Self { disposables: Mutex::new(Some(bag)) }
  }

  /// Adds `disposable` to the group.
  ///
  /// Returns `None`, after disposing the argument, if the group was already
  /// disposed.
  pub fn insert(&self, disposable: impl Disposable + 'static) -> Option<BagKey> {
    let mut guard = self.disposables.lock();
    match guard.as_mut() {
      Some(bag) => Some(bag.insert(Box::new(disposable))),
      None => {
        drop(guard);
        disposable.dispose();
        None
      }
    }
  }

  /// Removes and disposes the member registered under `key`.
  pub fn remove(&self, key: BagKey) {
    let removed = self.disposables.lock().as_mut().and_then(|bag| bag.remove(key));
    if let Some(d) = removed {
      d.dispose();
    }
  }

  /// Number of members, zero once disposed.
  pub fn count(&self) -> usize { self.disposables.lock().as_ref().map_or(0, Bag::len) }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    let taken = self.disposables.lock().take();
    if let Some(mut bag) = taken {
      for d in bag.drain() {
        d.dispose();
      }
    }
  }

  fn is_disposed(&self) -> bool { self.disposables.lock().is_none() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::disposable::BooleanDisposable;

  #[test]
  fn insert_remove_dispose() {
    let group = CompositeDisposable::new();
    let a = Arc::new(BooleanDisposable::new());
    let b = Arc::new(BooleanDisposable::new());

    let key_a = group.insert(a.clone());
    group.insert(b.clone());
    assert_eq!(group.count(), 2);

    group.remove(key_a.unwrap());
    assert!(a.is_disposed());
    assert!(!b.is_disposed());
    assert_eq!(group.count(), 1);

    group.dispose();
    assert!(b.is_disposed());
    assert_eq!(group.count(), 0);
  }

  #[test]
  fn insert_after_dispose_disposes_argument() {
    let group = CompositeDisposable::new();
    group.dispose();

    let late = Arc::new(BooleanDisposable::new());
    assert!(group.insert(late.clone()).is_none());
    assert!(late.is_disposed());
  }
}
