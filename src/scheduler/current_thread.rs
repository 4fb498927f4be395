use std::{
  cell::{Cell, RefCell},
  sync::Arc,
};

use parking_lot::Mutex;

use super::ImmediateSchedulerType;
use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  util::Queue,
};

pub(super) type ScheduledAction = Box<dyn FnOnce() -> BoxedDisposable + Send>;

thread_local! {
  static IS_SCHEDULE_REQUIRED: Cell<bool> = const { Cell::new(true) };
  static QUEUE: RefCell<Option<Queue<Arc<ScheduledItem>>>> = const { RefCell::new(None) };
}

/// Runs work on the calling thread.
///
/// The outermost `schedule` call on a thread runs its action immediately and
/// then drains a thread-local FIFO queue. A `schedule` issued while that
/// action (or a queued one) is running is queued instead of run inline, so
/// recursive producers do not grow the call stack.
///
/// Zero-sized: every instance on a thread shares the same queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  /// `true` when no trampoline is running on this thread, meaning the next
  /// `schedule` call runs inline and becomes the trampoline.
  pub fn is_schedule_required() -> bool { IS_SCHEDULE_REQUIRED.with(Cell::get) }
}

/// Resets the thread-local trampoline state when the outermost action ends,
/// even if it unwinds.
struct TrampolineGuard;

impl Drop for TrampolineGuard {
  fn drop(&mut self) {
    IS_SCHEDULE_REQUIRED.with(|required| required.set(true));
    let pending = QUEUE.with(|queue| queue.borrow_mut().take());
    drop(pending);
  }
}

impl ImmediateSchedulerType for CurrentThreadScheduler {
  fn schedule<S, F>(&self, state: S, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static,
  {
    if Self::is_schedule_required() {
      IS_SCHEDULE_REQUIRED.with(|required| required.set(false));
      let _guard = TrampolineGuard;

      let disposable = action(state);
      let dequeue = || QUEUE.with(|queue| queue.borrow_mut().as_mut().and_then(Queue::dequeue));
      while let Some(item) = dequeue() {
        if !item.is_disposed() {
          item.invoke();
        }
      }
      return disposable;
    }

    let item = Arc::new(ScheduledItem::new(Box::new(move || action(state))));
    QUEUE.with(|queue| {
      queue.borrow_mut().get_or_insert_with(|| Queue::with_capacity(1)).enqueue(item.clone())
    });
    Box::new(item)
  }
}

/// A unit of work that can be cancelled until it starts running.
pub(super) struct ScheduledItem {
  action: Mutex<Option<ScheduledAction>>,
  disposable: SingleAssignmentDisposable,
}

impl ScheduledItem {
  pub(super) fn new(action: ScheduledAction) -> Self {
    Self { action: Mutex::new(Some(action)), disposable: SingleAssignmentDisposable::new() }
  }

  pub(super) fn invoke(&self) {
    let action = self.action.lock().take();
    if let Some(action) = action {
      self.disposable.set(action());
    }
  }
}

impl Disposable for ScheduledItem {
  fn dispose(&self) {
    self.disposable.dispose();
    let action = self.action.lock().take();
    drop(action);
  }

  fn is_disposed(&self) -> bool { self.disposable.is_disposed() }
}
