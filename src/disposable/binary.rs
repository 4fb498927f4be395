use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};
use crate::util::AtomicInt;

/// Disposes two disposables together, exactly once.
pub struct BinaryDisposable {
  disposed: AtomicInt,
  pair: Mutex<Option<(BoxedDisposable, BoxedDisposable)>>,
}

impl BinaryDisposable {
  pub fn new(first: impl Disposable + 'static, second: impl Disposable + 'static) -> Self {
    let pair: (BoxedDisposable, BoxedDisposable) = (Box::new(first), Box::new(second));
    Self { disposed: AtomicInt::new(0), pair: Mutex::new(Some(pair)) }
  }
}

impl Disposable for BinaryDisposable {
  fn dispose(&self) {
    if self.disposed.fetch_or(1) == 0 {
      let pair = self.pair.lock().take();
      if let Some((first, second)) = pair {
        first.dispose();
        second.dispose();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.is_flag_set(1) }
}
