use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};

/// Holds one disposable at a time; replacing it disposes the previous one.
///
/// Once the serial disposable is disposed, anything assigned to it is
/// disposed right away.
#[derive(Default)]
pub struct SerialDisposable {
  state: Mutex<SerialState>,
}

#[derive(Default)]
struct SerialState {
  current: Option<BoxedDisposable>,
  is_disposed: bool,
}

impl SerialDisposable {
  pub fn new() -> Self { Self::default() }

  /// Replaces the current disposable, disposing the old one.
  pub fn set(&self, disposable: impl Disposable + 'static) {
    let disposable: BoxedDisposable = Box::new(disposable);
    let previous = {
      let mut state = self.state.lock();
      if state.is_disposed {
        Some(disposable)
      } else {
        state.current.replace(disposable)
      }
    };
    if let Some(previous) = previous {
      previous.dispose();
    }
  }
}

impl Disposable for SerialDisposable {
  fn dispose(&self) {
    let current = {
      let mut state = self.state.lock();
      if state.is_disposed {
        return;
      }
      state.is_disposed = true;
      state.current.take()
    };
    if let Some(current) = current {
      current.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.state.lock().is_disposed }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use super::*;
  use crate::disposable::BooleanDisposable;

  #[test]
  fn replacing_disposes_previous() {
    let serial = SerialDisposable::new();
    let first = Arc::new(BooleanDisposable::new());
    let second = Arc::new(BooleanDisposable::new());

    serial.set(first.clone());
    serial.set(second.clone());
    assert!(first.is_disposed());
    assert!(!second.is_disposed());

    serial.dispose();
    assert!(second.is_disposed());

    let late = Arc::new(BooleanDisposable::new());
    serial.set(late.clone());
    assert!(late.is_disposed());
  }
}
