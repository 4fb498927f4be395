use std::mem;

use parking_lot::Mutex;

use super::queue::Queue;

/// A unit of work that can be run by an [`AsyncLock`].
pub trait Invocable {
  fn invoke(self);
}

/// Serializes invocations without blocking callers.
///
/// The first caller runs its item immediately. Items submitted while an
/// invocation is in flight, from any thread or re-entrantly from the running
/// item, are queued and executed by the caller that currently owns the lock,
/// one after another. No call ever waits for another and the call stack never
/// grows with the number of queued items.
pub struct AsyncLock<I> {
  state: Mutex<AsyncLockState<I>>,
}

struct AsyncLockState<I> {
  queue: Queue<I>,
  is_executing: bool,
  has_faulted: bool,
}

impl<I> Default for AsyncLock<I> {
  fn default() -> Self {
    Self {
      state: Mutex::new(AsyncLockState {
        queue: Queue::with_capacity(0),
        is_executing: false,
        has_faulted: false,
      }),
    }
  }
}

impl<I> AsyncLock<I> {
  pub fn new() -> Self { Self::default() }

  /// Drops queued work and rejects everything submitted afterwards.
  pub fn dispose(&self) {
    let pending = {
      let mut state = self.state.lock();
      state.has_faulted = true;
      mem::take(&mut state.queue)
    };
    drop(pending);
  }

  pub fn is_disposed(&self) -> bool { self.state.lock().has_faulted }

  fn enqueue(&self, action: I) -> Option<I> {
    let mut state = self.state.lock();
    if state.has_faulted {
      return None;
    }
    if state.is_executing {
      state.queue.enqueue(action);
      return None;
    }
    state.is_executing = true;
    Some(action)
  }

  fn dequeue(&self) -> Option<I> {
    let mut state = self.state.lock();
    let next = state.queue.dequeue();
    if next.is_none() {
      state.is_executing = false;
    }
    next
  }
}

impl<I: Invocable> AsyncLock<I> {
  /// Runs `action` now, or queues it behind the invocation in flight.
  ///
  /// If an item panics, the lock is released and the items still queued
  /// are dropped, so later calls run again.
  pub fn invoke(&self, action: I) {
    let Some(first) = self.enqueue(action) else {
      return;
    };
    let guard = ExecutingGuard(self);
    first.invoke();
    while let Some(next) = self.dequeue() {
      next.invoke();
    }
    mem::forget(guard);
  }
}

/// Releases the lock when an invocation unwinds.
struct ExecutingGuard<'a, I>(&'a AsyncLock<I>);

impl<I> Drop for ExecutingGuard<'_, I> {
  fn drop(&mut self) {
    let pending = {
      let mut state = self.0.state.lock();
      state.is_executing = false;
      mem::take(&mut state.queue)
    };
    drop(pending);
  }
}
