use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};
use crate::util::AtomicInt;

const DISPOSED: i32 = 1;
const DISPOSABLE_SET: i32 = 2;

/// A disposable whose inner disposable can be assigned exactly once.
///
/// Lets a caller hand out the cancellation handle before the underlying
/// work has produced its own disposable. Disposing before assignment makes
/// the later assignment dispose immediately.
///
/// # Panics
///
/// Assigning twice is a programming error and panics.
#[derive(Default)]
pub struct SingleAssignmentDisposable {
  state: AtomicInt,
  current: Mutex<Option<BoxedDisposable>>,
}

impl SingleAssignmentDisposable {
  pub fn new() -> Self { Self::default() }

  pub fn set(&self, disposable: impl Disposable + 'static) {
    let disposable: BoxedDisposable = Box::new(disposable);
    let mut current = self.current.lock();
    let previous = self.state.fetch_or(DISPOSABLE_SET);
    if previous & DISPOSABLE_SET != 0 {
      drop(current);
      panic!("SingleAssignmentDisposable::set called more than once");
    }

    if previous & DISPOSED != 0 {
      drop(current);
      disposable.dispose();
    } else {
      *current = Some(disposable);
    }
  }
}

impl Disposable for SingleAssignmentDisposable {
  fn dispose(&self) {
    let previous = self.state.fetch_or(DISPOSED);
    if previous & DISPOSED != 0 {
      return;
    }
    if previous & DISPOSABLE_SET != 0 {
      let current = self.current.lock().take();
      if let Some(current) = current {
        current.dispose();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.state.is_flag_set(DISPOSED) }
}
