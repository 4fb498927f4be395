//! A scheduler that runs every action, one at a time, on a single worker
//! task of a tokio runtime.

use std::{sync::Arc, time::Duration};

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use tokio::{
  runtime::Handle,
  sync::mpsc::{unbounded_channel, UnboundedSender},
};

use super::{ImmediateSchedulerType, Instant, SchedulerType};
use crate::disposable::{
  BooleanDisposable, BoxedDisposable, Disposable, Disposables, SingleAssignmentDisposable,
};

type Job = Box<dyn FnOnce() + Send>;

/// Where a [`SerialDispatchQueueScheduler`] runs and how precise its timers
/// need to be.
#[derive(Debug, Clone)]
pub struct DispatchQueueConfiguration {
  handle: Handle,
  leeway: Duration,
}

impl DispatchQueueConfiguration {
  /// Runs on `handle` with no timer leeway.
  pub fn new(handle: Handle) -> Self { Self { handle, leeway: Duration::ZERO } }

  /// Allowed lateness of timers. Advisory: tokio timers are not coalesced,
  /// the value is kept for callers that inspect it.
  pub fn with_leeway(mut self, leeway: Duration) -> Self {
    self.leeway = leeway;
    self
  }

  pub fn handle(&self) -> &Handle { &self.handle }

  pub fn leeway(&self) -> Duration { self.leeway }
}

/// Serial work queue on a tokio runtime.
///
/// Actions never run concurrently with each other and run in the order they
/// were enqueued. Delayed actions are enqueued when their timer fires. The
/// worker stops once every clone of the scheduler and every pending timer is
/// gone.
///
/// # Examples
///
/// ```rust
/// use std::sync::mpsc::channel;
///
/// use rxcore::prelude::*;
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// let scheduler =
///   SerialDispatchQueueScheduler::new(DispatchQueueConfiguration::new(runtime.handle().clone()));
///
/// let (tx, rx) = channel();
/// let _d = timer::<_, RxError>(Duration::from_millis(5), scheduler)
///   .subscribe_next(move |v| tx.send(v).unwrap());
/// assert_eq!(rx.recv().unwrap(), 0);
/// ```
#[derive(Clone)]
pub struct SerialDispatchQueueScheduler {
  inner: Arc<QueueInner>,
}

struct QueueInner {
  configuration: DispatchQueueConfiguration,
  sender: UnboundedSender<Job>,
}

impl SerialDispatchQueueScheduler {
  pub fn new(configuration: DispatchQueueConfiguration) -> Self {
    let (sender, mut receiver) = unbounded_channel::<Job>();
    configuration.handle.spawn(async move {
      tracing::debug!("dispatch queue worker started");
      while let Some(job) = receiver.recv().await {
        job();
      }
      tracing::debug!("dispatch queue worker stopped");
    });
    Self { inner: Arc::new(QueueInner { configuration, sender }) }
  }

  pub fn configuration(&self) -> &DispatchQueueConfiguration { &self.inner.configuration }

  fn enqueue(&self, job: Job) { send_job(&self.inner.sender, job) }

  /// Spawns `timer` on the runtime; disposing the result aborts it.
  fn spawn_abortable<Fut>(&self, timer: Fut) -> AbortHandle
  where
    Fut: std::future::Future<Output = ()> + Send + 'static,
  {
    let (abort, registration) = AbortHandle::new_pair();
    self.inner.configuration.handle.spawn(Abortable::new(timer, registration));
    abort
  }
}

fn send_job(sender: &UnboundedSender<Job>, job: Job) {
  if sender.send(job).is_err() {
    tracing::warn!("dispatch queue worker is gone, scheduled work dropped");
  }
}

/// Wraps `action` so it runs at most once and only if not disposed first.
fn cancellable<S, F>(state: S, action: F) -> (Job, Arc<SingleAssignmentDisposable>)
where
  S: Send + 'static,
  F: FnOnce(S) -> BoxedDisposable + Send + 'static,
{
  let disposable = Arc::new(SingleAssignmentDisposable::new());
  let d = disposable.clone();
  let job: Job = Box::new(move || {
    if !d.is_disposed() {
      d.set(action(state));
    }
  });
  (job, disposable)
}

impl ImmediateSchedulerType for SerialDispatchQueueScheduler {
  fn schedule<S, F>(&self, state: S, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static,
  {
    let (job, disposable) = cancellable(state, action);
    self.enqueue(job);
    Box::new(disposable)
  }
}

impl SchedulerType for SerialDispatchQueueScheduler {
  fn now(&self) -> Instant { tokio::time::Instant::now().into_std() }

  fn schedule_relative<S, F>(&self, state: S, due_time: Duration, action: F) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnOnce(S) -> BoxedDisposable + Send + 'static,
  {
    if due_time.is_zero() {
      return self.schedule(state, action);
    }
    let (job, disposable) = cancellable(state, action);
    let sender = self.inner.sender.clone();
    let abort = self.spawn_abortable(async move {
      tokio::time::sleep(due_time).await;
      send_job(&sender, job);
    });
    Box::new(Disposables::create_binary(
      Disposables::create_with(move || abort.abort()),
      disposable,
    ))
  }

  fn schedule_periodic<S, F>(
    &self, state: S, start_after: Duration, period: Duration, action: F,
  ) -> BoxedDisposable
  where
    S: Send + 'static,
    F: FnMut(S) -> S + Send + 'static,
  {
    // tokio intervals reject a zero period
    let period = period.max(Duration::from_nanos(1));
    let cancel = Arc::new(BooleanDisposable::new());
    let tick_state = Arc::new(Mutex::new((Some(state), action)));
    let sender = self.inner.sender.clone();
    let c = cancel.clone();
    let abort = self.spawn_abortable(async move {
      let start = tokio::time::Instant::now() + start_after;
      let mut ticker = tokio::time::interval_at(start, period);
      loop {
        ticker.tick().await;
        if c.is_disposed() {
          break;
        }
        let (c, tick_state) = (c.clone(), tick_state.clone());
        let job: Job = Box::new(move || {
          if c.is_disposed() {
            return;
          }
          let mut guard = tick_state.lock();
          let (state, action) = &mut *guard;
          if let Some(current) = state.take() {
            *state = Some(action(current));
          }
        });
        if sender.send(job).is_err() {
          tracing::warn!("dispatch queue worker is gone, periodic work stopped");
          break;
        }
      }
    });
    Box::new(Disposables::create_binary(Disposables::create_with(move || abort.abort()), cancel))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc::{channel, Receiver},
  };

  use super::*;
  use crate::{disposable::NopDisposable, scheduler::ImmediateSchedulerExt};

  fn scheduler() -> SerialDispatchQueueScheduler {
    SerialDispatchQueueScheduler::new(DispatchQueueConfiguration::new(Handle::current()))
  }

  fn recv(rx: &Receiver<usize>) -> usize {
    rx.recv_timeout(Duration::from_secs(5)).expect("scheduled work did not run")
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn runs_in_enqueue_order() {
    let scheduler = scheduler();
    let log = Arc::new(Mutex::new(vec![]));
    let (tx, rx) = channel();
    for i in 0..100 {
      let (log, tx) = (log.clone(), tx.clone());
      scheduler.schedule(i, move |i| {
        log.lock().push(i);
        if i == 99 {
          tx.send(i).unwrap();
        }
        Box::new(NopDisposable)
      });
    }
    tokio::task::spawn_blocking(move || recv(&rx)).await.unwrap();
    assert_eq!(*log.lock(), (0..100).collect::<Vec<_>>());
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn disposed_before_running_never_runs() {
    let scheduler = scheduler();
    let (gate_tx, gate_rx) = channel::<()>();
    let ran = Arc::new(AtomicUsize::new(0));
    let (done_tx, done_rx) = channel();

    scheduler.schedule((), move |_| {
      gate_rx.recv_timeout(Duration::from_secs(5)).ok();
      Box::new(NopDisposable)
    });
    let r = ran.clone();
    let cancelled = scheduler.schedule((), move |_| {
      r.fetch_add(1, Ordering::SeqCst);
      Box::new(NopDisposable)
    });
    scheduler.schedule((), move |_| {
      done_tx.send(0).unwrap();
      Box::new(NopDisposable)
    });

    cancelled.dispose();
    gate_tx.send(()).unwrap();
    tokio::task::spawn_blocking(move || recv(&done_rx)).await.unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 0);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn relative_work_waits_for_its_due_time() {
    let scheduler = scheduler();
    let (tx, rx) = channel();
    let start = scheduler.now();
    let s = scheduler.clone();
    scheduler.schedule_relative((), Duration::from_millis(30), move |_| {
      tx.send(s.now().duration_since(start).as_millis() as usize).unwrap();
      Box::new(NopDisposable)
    });
    let elapsed = tokio::task::spawn_blocking(move || recv(&rx)).await.unwrap();
    assert!(elapsed >= 30, "ran after {elapsed}ms");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn cancelled_timer_never_fires() {
    let scheduler = scheduler();
    let ran = Arc::new(AtomicUsize::new(0));
    let r = ran.clone();
    let d = scheduler.schedule_relative((), Duration::from_millis(20), move |_| {
      r.fetch_add(1, Ordering::SeqCst);
      Box::new(NopDisposable)
    });
    d.dispose();
    assert!(d.is_disposed());
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(ran.load(Ordering::SeqCst), 0);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn periodic_threads_state_until_disposed() {
    let scheduler = scheduler();
    let (tx, rx) = channel();
    let period = Duration::from_millis(20);
    let d = scheduler.schedule_periodic(0usize, Duration::ZERO, period, move |n| {
      tx.send(n).ok();
      n + 1
    });
    let seen = tokio::task::spawn_blocking(move || {
      let first = (0..3).map(|_| recv(&rx)).collect::<Vec<_>>();
      (first, rx)
    })
    .await
    .unwrap();
    d.dispose();
    let (first, rx) = seen;
    assert_eq!(first, vec![0, 1, 2]);

    tokio::time::sleep(Duration::from_millis(80)).await;
    let late = rx.try_iter().count();
    assert!(late <= 1, "{late} ticks after dispose");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn recursive_chain_runs_serially() {
    let scheduler = scheduler();
    let (tx, rx) = channel();
    let _d = scheduler.schedule_recursive(0usize, move |n, recurse| {
      if n == 1000 {
        tx.send(n).unwrap();
      } else {
        recurse.schedule(n + 1);
      }
    });
    assert_eq!(tokio::task::spawn_blocking(move || recv(&rx)).await.unwrap(), 1000);
  }

  #[test]
  fn configuration_defaults() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let configuration = DispatchQueueConfiguration::new(runtime.handle().clone());
    assert_eq!(configuration.leeway(), Duration::ZERO);
    let configuration = configuration.with_leeway(Duration::from_millis(3));
    assert_eq!(configuration.leeway(), Duration::from_millis(3));
    let scheduler = SerialDispatchQueueScheduler::new(configuration);
    assert_eq!(scheduler.configuration().leeway(), Duration::from_millis(3));
  }
}
