use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{ImmediateSchedulerType, SchedulerType};
use crate::{
  disposable::{BoxedDisposable, CompositeDisposable, Disposable, NopDisposable},
  util::BagKey,
};

type RecursiveAction<S, Sch> = Box<dyn FnMut(S, &RecursiveScheduler<S, Sch>) + Send>;
type Job<S> = Box<dyn FnOnce(S) -> BoxedDisposable + Send>;

/// Handle passed to a recursively scheduled action.
///
/// Every pending step lives in a [`CompositeDisposable`] group until it runs,
/// so disposing the handle cancels whichever step is outstanding.
pub struct RecursiveScheduler<S, Sch> {
  inner: Arc<Inner<S, Sch>>,
}

struct Inner<S, Sch> {
  scheduler: Sch,
  group: CompositeDisposable,
  action: Mutex<Option<RecursiveAction<S, Sch>>>,
}

/// Tracks whether a scheduled step has been added to the group, or already ran.
enum StepState {
  Initial,
  Added(BagKey),
  Done,
}

impl<S, Sch> Clone for RecursiveScheduler<S, Sch> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<S, Sch> RecursiveScheduler<S, Sch>
where
  S: Send + 'static,
  Sch: ImmediateSchedulerType + Clone + 'static,
{
  pub(crate) fn new(
    scheduler: Sch, action: impl FnMut(S, &RecursiveScheduler<S, Sch>) + Send + 'static,
  ) -> Self {
    Self {
      inner: Arc::new(Inner {
        scheduler,
        group: CompositeDisposable::new(),
        action: Mutex::new(Some(Box::new(action))),
      }),
    }
  }

  /// Schedules the next invocation with `state`.
  pub fn schedule(&self, state: S) {
    self.schedule_with(state, |scheduler, state, job| scheduler.schedule(state, job))
  }

  fn schedule_with(
    &self, state: S, dispatch: impl FnOnce(&Sch, S, Job<S>) -> BoxedDisposable,
  ) {
    if self.is_disposed() {
      return;
    }
    let step = Arc::new(Mutex::new(StepState::Initial));
    let this = self.clone();
    let job_step = step.clone();
    let job: Job<S> = Box::new(move |state| {
      let previous = std::mem::replace(&mut *job_step.lock(), StepState::Done);
      if let StepState::Added(key) = previous {
        this.inner.group.remove(key);
      }
      if !this.is_disposed() {
        this.invoke(state);
      }
      Box::new(NopDisposable)
    });

    let disposable = dispatch(&self.inner.scheduler, state, job);

    let mut step = step.lock();
    match *step {
      StepState::Initial => {
        *step = match self.inner.group.insert(disposable) {
          Some(key) => StepState::Added(key),
          None => StepState::Done,
        }
      }
      StepState::Done => {}
      StepState::Added(_) => unreachable!("recursive step registered twice"),
    }
  }

  fn invoke(&self, state: S) {
    let mut action = self.inner.action.lock();
    if let Some(action) = action.as_mut() {
      action(state, self);
    }
    // disposed while running: the action's captures must not outlive us
    if self.is_disposed() {
      action.take();
    }
  }
}

impl<S, Sch> RecursiveScheduler<S, Sch>
where
  S: Send + 'static,
  Sch: SchedulerType,
{
  /// Schedules the next invocation with `state` once `due_time` has elapsed.
  pub fn schedule_after(&self, state: S, due_time: Duration) {
    self.schedule_with(state, move |scheduler, state, job| {
      scheduler.schedule_relative(state, due_time, job)
    })
  }
}

impl<S, Sch> Disposable for RecursiveScheduler<S, Sch>
where
  S: Send,
  Sch: Send + Sync,
{
  fn dispose(&self) {
    self.inner.group.dispose();
    // while the action runs it is released by `invoke` instead
    if let Some(mut action) = self.inner.action.try_lock() {
      action.take();
    }
  }

  fn is_disposed(&self) -> bool { self.inner.group.is_disposed() }
}
