use parking_lot::Mutex;

use super::Disposable;
use crate::util::AtomicInt;

type DisposeAction = Box<dyn FnOnce() + Send>;

/// Runs an action on the first `dispose()` call.
///
/// The action is dropped as soon as it has run, so whatever it captured is
/// released immediately, independent of how long the disposable itself lives.
pub struct AnonymousDisposable {
  disposed: AtomicInt,
  action: Mutex<Option<DisposeAction>>,
}

impl AnonymousDisposable {
  pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
    Self { disposed: AtomicInt::new(0), action: Mutex::new(Some(Box::new(action))) }
  }
}

impl Disposable for AnonymousDisposable {
  fn dispose(&self) {
    if self.disposed.fetch_or(1) == 0 {
      let action = self.action.lock().take();
      if let Some(action) = action {
        action();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.is_flag_set(1) }
}
