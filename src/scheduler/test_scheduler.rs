//! Virtual-time scheduler for deterministic tests of time-based code.
//!
//! Time only moves when the test says so. Work scheduled for the same
//! virtual instant runs in FIFO order.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let observer = scheduler.create_observer::<u64, RxError>();
//! let _d = timer::<_, RxError>(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(observer.to_any());
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(observer.events().is_empty());
//!
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(
//!   observer.events(),
//!   vec![
//!     Recorded::next(Duration::from_millis(100), 0),
//!     Recorded::completed(Duration::from_millis(100)),
//!   ]
//! );
//! ```

use std::{
  cmp::Ordering,
  collections::BinaryHeap,
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{
  current_thread::{ScheduledAction, ScheduledItem},
  ImmediateSchedulerType, SchedulerType,
};
use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observer::{AnyObserver, Observer},
};

#[derive(Default)]
struct TestSchedulerState {
  clock: Duration,
  task_queue: BinaryHeap<ScheduledTask>,
  next_task_id: usize,
}

struct ScheduledTask {
  scheduled_time: Duration,
  task_id: usize,
  item: Arc<ScheduledItem>,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool {
    self.scheduled_time == other.scheduled_time && self.task_id == other.task_id
  }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by task_id
    other
      .scheduled_time
      .cmp(&self.scheduled_time)
      .then_with(|| other.task_id.cmp(&self.task_id))
  }
}

/// A virtual time scheduler.
///
/// Clones share the same clock and task queue. The clock starts at zero;
/// [`SchedulerType::now`] maps it onto a fixed epoch captured at creation.
#[derive(Clone)]
pub struct TestScheduler {
  state: Arc<Mutex<TestSchedulerState>>,
  epoch: Instant,
}

impl Default for TestScheduler {
  fn default() -> Self { Self::new() }
}

impl TestScheduler {
  pub fn new() -> Self {
    Self { state: Arc::new(Mutex::new(TestSchedulerState::default())), epoch: Instant::now() }
  }

  /// Virtual time elapsed since creation.
  pub fn clock(&self) -> Duration { self.state.lock().clock }

  /// Number of tasks still waiting to run, cancelled ones excluded.
  pub fn pending_count(&self) -> usize {
    self.state.lock().task_queue.iter().filter(|task| !task.item.is_disposed()).count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Advances the clock by `duration`, running every task due on the way.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.clock() + duration;
    self.advance_to(target);
  }

  /// Advances the clock to `target`, running every task due on the way.
  ///
  /// A target in the past leaves the clock where it is.
  pub fn advance_to(&self, target: Duration) {
    if target < self.clock() {
      tracing::warn!(?target, clock = ?self.clock(), "test scheduler cannot move backwards");
      return;
    }
    self.execute_tasks_until(Some(target));
    let mut state = self.state.lock();
    state.clock = state.clock.max(target);
  }

  /// Runs every pending task, moving the clock to each task's due time.
  ///
  /// Periodic work never drains; use [`advance_by`](Self::advance_by) for it.
  pub fn start(&self) { self.execute_tasks_until(None); }

  /// Schedules `action` to run at the absolute virtual time `at`.
  pub fn schedule_at<S, F>(&self, state: S, at: Duration, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static,
  {
    let item = Arc::new(ScheduledItem::new(Box::new(move || action(state)) as ScheduledAction));
    let mut state = self.state.lock();
    let task_id = state.next_task_id;
    state.next_task_id += 1;
    let scheduled_time = at.max(state.clock);
    state.task_queue.push(ScheduledTask { scheduled_time, task_id, item: item.clone() });
    Box::new(item)
  }

  /// An observer that records every event with the virtual time it arrived.
  pub fn create_observer<Item, Err>(&self) -> TestableObserver<Item, Err> {
    TestableObserver { scheduler: self.clone(), events: Arc::new(Mutex::new(vec![])) }
  }

  fn execute_tasks_until(&self, target_time: Option<Duration>) {
    loop {
      let task = {
        let mut state = self.state.lock();
        let due = state
          .task_queue
          .peek()
          .is_some_and(|task| target_time.map_or(true, |limit| task.scheduled_time <= limit));
        if !due {
          return;
        }
        let task = state.task_queue.pop();
        if let Some(task) = &task {
          state.clock = state.clock.max(task.scheduled_time);
        }
        task
      };

      let Some(task) = task else { return };
      if task.item.is_disposed() {
        continue;
      }
      let (task_id, at) = (task.task_id, task.scheduled_time);
      tracing::trace!(task_id, at = ?at, "test scheduler runs task");
      task.item.invoke();
    }
  }
}

impl ImmediateSchedulerType for TestScheduler {
  fn schedule<S, F>(&self, state: S, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static,
  {
    self.schedule_relative(state, Duration::ZERO, action)
  }
}

impl SchedulerType for TestScheduler {
  fn now(&self) -> Instant { self.epoch + self.clock() }

  fn schedule_relative<S, F>(&self, state: S, due_time: Duration, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static,
  {
    let at = self.clock() + due_time;
    self.schedule_at(state, at, action)
  }
}

/// A value stamped with the virtual time it was observed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded<T> {
  pub time: Duration,
  pub value: T,
}

impl<Item, Err> Recorded<Event<Item, Err>> {
  pub fn next(time: Duration, value: Item) -> Self { Self { time, value: Event::Next(value) } }

  pub fn error(time: Duration, err: Err) -> Self { Self { time, value: Event::Error(err) } }

  pub fn completed(time: Duration) -> Self { Self { time, value: Event::Completed } }
}

/// Observer that records events together with the scheduler's clock.
pub struct TestableObserver<Item, Err> {
  scheduler: TestScheduler,
  events: Arc<Mutex<Vec<Recorded<Event<Item, Err>>>>>,
}

impl<Item, Err> Clone for TestableObserver<Item, Err> {
  fn clone(&self) -> Self {
    Self { scheduler: self.scheduler.clone(), events: self.events.clone() }
  }
}

impl<Item: Clone, Err: Clone> TestableObserver<Item, Err> {
  pub fn events(&self) -> Vec<Recorded<Event<Item, Err>>> { self.events.lock().clone() }
}

impl<Item: Send + 'static, Err: Send + 'static> TestableObserver<Item, Err> {
  pub fn to_any(&self) -> AnyObserver<Item, Err> { AnyObserver::new(self.clone()) }
}

impl<Item: Send, Err: Send> Observer<Item, Err> for TestableObserver<Item, Err> {
  fn on(&self, event: Event<Item, Err>) {
    let time = self.scheduler.clock();
    self.events.lock().push(Recorded { time, value: event });
  }
}
