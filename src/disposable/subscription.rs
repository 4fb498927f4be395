use std::sync::Weak;

use parking_lot::Mutex;

use super::Disposable;

/// Something observers can be removed from by key.
pub trait SynchronizedUnsubscribe: Send + Sync {
  type DisposeKey: Send;

  fn synchronized_unsubscribe(&self, key: Self::DisposeKey);
}

/// Unregisters one observer from its owner, typically a subject.
///
/// Only a weak reference to the owner is kept, so a long-lived subscription
/// handle never keeps the subject alive. Disposing after the owner is gone
/// is a no-op.
pub struct SubscriptionDisposable<T: SynchronizedUnsubscribe> {
  owner: Weak<T>,
  key: Mutex<Option<T::DisposeKey>>,
}

impl<T: SynchronizedUnsubscribe> SubscriptionDisposable<T> {
  pub fn new(owner: Weak<T>, key: T::DisposeKey) -> Self {
    Self { owner, key: Mutex::new(Some(key)) }
  }
}

impl<T: SynchronizedUnsubscribe> Disposable for SubscriptionDisposable<T> {
  fn dispose(&self) {
    let key = self.key.lock().take();
    if let (Some(key), Some(owner)) = (key, self.owner.upgrade()) {
      owner.synchronized_unsubscribe(key);
    }
  }

  fn is_disposed(&self) -> bool { self.key.lock().is_none() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;

  #[derive(Default)]
  struct Owner {
    removed: Mutex<Vec<usize>>,
  }

  impl SynchronizedUnsubscribe for Owner {
    type DisposeKey = usize;

    fn synchronized_unsubscribe(&self, key: usize) { self.removed.lock().push(key) }
  }

  #[test]
  fn unsubscribes_once() {
    let owner = Arc::new(Owner::default());
    let d = SubscriptionDisposable::new(Arc::downgrade(&owner), 7);
    d.dispose();
    d.dispose();
    assert!(d.is_disposed());
    assert_eq!(*owner.removed.lock(), vec![7]);
  }

  #[test]
  fn dead_owner_is_noop() {
    let owner = Arc::new(Owner::default());
    let d = SubscriptionDisposable::new(Arc::downgrade(&owner), 1);
    drop(owner);
    d.dispose();
    assert!(d.is_disposed());
  }
}
