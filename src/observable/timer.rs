use std::{marker::PhantomData, sync::Arc, time::Duration};

use super::{Observable, Producer, Sink, SinkDisposer};
use crate::{
  disposable::{BoxedDisposable, Disposable, NopDisposable},
  error::RxError,
  event::Event,
  observer::AnyObserver,
  scheduler::SchedulerType,
};

/// Returns an observable which emits `0` once `due_time` has elapsed on
/// `scheduler`, then completes.
pub fn timer<Sch, Err>(due_time: Duration, scheduler: Sch) -> Timer<Sch, Err> {
  Timer { due_time, scheduler, _hint: PhantomData }
}

/// Returns an observable which emits `0, 1, 2, ...` every `period` on
/// `scheduler`, starting one period after subscription. It never completes.
///
/// A zero period is rejected with [`RxError::ArgumentOutOfRange`].
pub fn interval<Sch, Err>(period: Duration, scheduler: Sch) -> Interval<Sch, Err> {
  Interval { period, scheduler, _hint: PhantomData }
}

pub struct Timer<Sch, Err> {
  due_time: Duration,
  scheduler: Sch,
  _hint: PhantomData<fn() -> Err>,
}

impl<Sch: Clone, Err> Clone for Timer<Sch, Err> {
  fn clone(&self) -> Self { timer(self.due_time, self.scheduler.clone()) }
}

impl<Sch, Err> Producer<u64, Err> for Timer<Sch, Err>
where
  Sch: SchedulerType,
  Err: 'static,
{
  fn run(
    &self, observer: AnyObserver<u64, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable) {
    let sink = Arc::new(Sink::new(observer, cancel));
    let subscription = self.scheduler.schedule_relative(sink.clone(), self.due_time, |sink| {
      sink.forward_on(Event::Next(0));
      sink.forward_on(Event::Completed);
      sink.dispose();
      Box::new(NopDisposable)
    });
    (Box::new(sink), subscription)
  }
}

impl<Sch, Err> Observable<u64, Err> for Timer<Sch, Err>
where
  Sch: SchedulerType,
  Err: 'static,
{
  fn subscribe(&self, observer: AnyObserver<u64, Err>) -> BoxedDisposable {
    self.subscribe_producer(observer)
  }
}

pub struct Interval<Sch, Err> {
  period: Duration,
  scheduler: Sch,
  _hint: PhantomData<fn() -> Err>,
}

impl<Sch: Clone, Err> Clone for Interval<Sch, Err> {
  fn clone(&self) -> Self { interval(self.period, self.scheduler.clone()) }
}

impl<Sch, Err> Producer<u64, Err> for Interval<Sch, Err>
where
  Sch: SchedulerType,
  Err: From<RxError> + 'static,
{
  fn run(
    &self, observer: AnyObserver<u64, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable) {
    let sink = Arc::new(Sink::new(observer, cancel));
    if self.period.is_zero() {
      sink.forward_on(Event::Error(RxError::ArgumentOutOfRange.into()));
      sink.dispose();
      return (Box::new(sink), Box::new(NopDisposable));
    }
    let ticker = sink.clone();
    let subscription =
      self.scheduler.schedule_periodic(0u64, self.period, self.period, move |count| {
        ticker.forward_on(Event::Next(count));
        count + 1
      });
    (Box::new(sink), subscription)
  }
}

impl<Sch, Err> Observable<u64, Err> for Interval<Sch, Err>
where
  Sch: SchedulerType,
  Err: From<RxError> + 'static,
{
  fn subscribe(&self, observer: AnyObserver<u64, Err>) -> BoxedDisposable {
    self.subscribe_producer(observer)
  }
}
