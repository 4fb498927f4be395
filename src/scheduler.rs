//! Scheduler abstraction: *where* and *when* a unit of work runs.
//!
//! | Scheduler | Execution context |
//! |-----------|-------------------|
//! | [`CurrentThreadScheduler`] | the calling thread, nested work is trampolined |
//! | [`SerialDispatchQueueScheduler`] | a serial work queue on a tokio runtime |
//! | [`TestScheduler`] | virtual time, advanced explicitly by the test |
//!
//! Every entry point returns a [`BoxedDisposable`]. Disposing it before the
//! work starts guarantees the work never runs: the cancel flag is checked
//! immediately before the action is invoked. Disposing after the work
//! started does not roll anything back.
//!
//! There is no global scheduler instance. Components that need to schedule
//! take a scheduler value, which keeps virtual-time testing straightforward.

mod current_thread;
mod recursive;
#[cfg(feature = "tokio-scheduler")]
mod serial_dispatch_queue;
mod test_observables;
mod test_scheduler;

pub use std::time::{Duration, Instant};

pub use current_thread::CurrentThreadScheduler;
pub use recursive::RecursiveScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use serial_dispatch_queue::{DispatchQueueConfiguration, SerialDispatchQueueScheduler};
pub use test_observables::{ColdObservable, HotObservable, TestSubscription};
pub use test_scheduler::{Recorded, TestScheduler, TestableObserver};

use crate::disposable::BoxedDisposable;

/// A scheduler that can run work now.
pub trait ImmediateSchedulerType: Send + Sync {
  /// Runs `action(state)` in this scheduler's execution context.
  ///
  /// The disposable returned by `action` is chained into the returned one.
  fn schedule<S, F>(&self, state: S, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static;
}

/// A scheduler with a notion of time.
pub trait SchedulerType: ImmediateSchedulerType + Clone + 'static {
  /// Current time according to this scheduler.
  fn now(&self) -> Instant;

  /// Runs `action(state)` once `due_time` has elapsed.
  fn schedule_relative<S, F>(&self, state: S, due_time: Duration, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static;

  /// Runs `action` every `period`, starting after `start_after`, threading
  /// the returned state into the next invocation until disposed.
  ///
  /// The default re-arms a relative timer after each tick.
  fn schedule_periodic<S, F>(
    &self, state: S, start_after: Duration, period: Duration, mut action: F,
  ) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnMut(S) -> S + Send + 'static,
  {
    self.schedule_recursive_after(state, start_after, move |state, recurse| {
      let next = action(state);
      recurse.schedule_after(next, period);
    })
  }

  /// Like [`ImmediateSchedulerExt::schedule_recursive`], with the first
  /// invocation delayed by `due_time`.
  fn schedule_recursive_after<S, F>(
    &self, state: S, due_time: Duration, action: F,
  ) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnMut(S, &RecursiveScheduler<S, Self>) + Send + 'static,
  {
    let scheduler = RecursiveScheduler::new(self.clone(), action);
    scheduler.schedule_after(state, due_time);
    Box::new(scheduler)
  }
}

/// Recursive scheduling for every immediate scheduler.
pub trait ImmediateSchedulerExt: ImmediateSchedulerType + Clone + 'static {
  /// Runs `action(state, recurse)`; calling `recurse.schedule(next)` schedules
  /// the next invocation on the same scheduler.
  ///
  /// Each step is a separately scheduled item, so a chain of any length runs
  /// with a constant call stack. Disposing the returned handle stops the
  /// chain.
  fn schedule_recursive<S, F>(&self, state: S, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnMut(S, &RecursiveScheduler<S, Self>) + Send + 'static,
  {
    let scheduler = RecursiveScheduler::new(self.clone(), action);
    scheduler.schedule(state);
    Box::new(scheduler)
  }
}

impl<T: ImmediateSchedulerType + Clone + 'static> ImmediateSchedulerExt for T {}
