use std::{marker::PhantomData, sync::Arc};

use super::{Observable, Producer, Sink, SinkDisposer};
use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observer::AnyObserver,
  scheduler::{CurrentThreadScheduler, ImmediateSchedulerExt, ImmediateSchedulerType},
};

/// Creates an observable that emits each element of `iter`, then completes.
///
/// Elements are delivered one scheduled step at a time on the
/// [`CurrentThreadScheduler`], so a long (or endless) iterator never grows
/// the call stack and the subscription can be disposed between elements.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let sum = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
/// let s = sum.clone();
/// from_iter::<_, ()>(1..=100u64).subscribe_next(move |v| {
///   s.fetch_add(v, std::sync::atomic::Ordering::SeqCst);
/// });
/// assert_eq!(sum.load(std::sync::atomic::Ordering::SeqCst), 5050);
/// ```
pub fn from_iter<I, Err>(iter: I) -> FromIter<I, CurrentThreadScheduler, Err>
where
  I: IntoIterator,
{
  from_iter_on(iter, CurrentThreadScheduler)
}

/// Like [`from_iter`], scheduling every element on `scheduler`.
pub fn from_iter_on<I, Sch, Err>(iter: I, scheduler: Sch) -> FromIter<I, Sch, Err>
where
  I: IntoIterator,
{
  FromIter { iter, scheduler, _hint: PhantomData }
}

/// Creates an observable that emits the given values in order, then completes.
pub fn of<Item, Err>(
  items: impl IntoIterator<Item = Item>,
) -> FromIter<Vec<Item>, CurrentThreadScheduler, Err> {
  from_iter(items.into_iter().collect::<Vec<_>>())
}

pub struct FromIter<I, Sch, Err> {
  iter: I,
  scheduler: Sch,
  _hint: PhantomData<fn() -> Err>,
}

impl<I: Clone, Sch: Clone, Err> Clone for FromIter<I, Sch, Err> {
  fn clone(&self) -> Self {
    Self { iter: self.iter.clone(), scheduler: self.scheduler.clone(), _hint: PhantomData }
  }
}

impl<I, Sch, Err> Producer<I::Item, Err> for FromIter<I, Sch, Err>
where
  I: IntoIterator + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
  I::Item: 'static,
  Sch: ImmediateSchedulerType + Clone + 'static,
  Err: 'static,
{
  fn run(
    &self, observer: AnyObserver<I::Item, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable) {
    let sink = Arc::new(Sink::new(observer, cancel));
    let emitter = sink.clone();
    let subscription =
      self.scheduler.schedule_recursive(self.iter.clone().into_iter(), move |mut iter, recurse| {
        if emitter.is_disposed() {
          return;
        }
        match iter.next() {
          Some(value) => {
            emitter.forward_on(Event::Next(value));
            recurse.schedule(iter);
          }
          None => {
            emitter.forward_on(Event::Completed);
            emitter.dispose();
          }
        }
      });
    (Box::new(sink), subscription)
  }
}

impl<I, Sch, Err> Observable<I::Item, Err> for FromIter<I, Sch, Err>
where
  I: IntoIterator + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
  I::Item: 'static,
  Sch: ImmediateSchedulerType + Clone + 'static,
  Err: 'static,
{
  fn subscribe(&self, observer: AnyObserver<I::Item, Err>) -> BoxedDisposable {
    self.subscribe_producer(observer)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use parking_lot::Mutex;

  use super::*;
  use crate::{
    observable::ObservableExt,
    scheduler::{Recorded, TestScheduler},
  };

  #[test]
  fn emits_in_order_then_completes() {
    let log = Arc::new(Mutex::new(vec![]));
    let l = log.clone();
    of::<_, ()>(["a", "b", "c"]).subscribe_event(move |e| l.lock().push(e));
    assert_eq!(
      *log.lock(),
      vec![Event::Next("a"), Event::Next("b"), Event::Next("c"), Event::Completed]
    );
  }

  #[test]
  fn dispose_inside_next_stops_an_endless_iterator() {
    let seen = Arc::new(Mutex::new(vec![]));
    let subscription: Arc<Mutex<Option<BoxedDisposable>>> = Arc::new(Mutex::new(None));
    let (s, sub) = (seen.clone(), subscription.clone());

    // subscribe from inside a trampoline so the handle exists before the first value
    CurrentThreadScheduler.schedule((), move |()| {
      let s2 = s.clone();
      let sub2 = sub.clone();
      let d = from_iter::<_, ()>(0..).subscribe_next(move |v| {
        s2.lock().push(v);
        if v == 3 {
          if let Some(d) = sub2.lock().as_ref() {
            d.dispose();
          }
        }
      });
      *sub.lock() = Some(d);
      Box::new(crate::disposable::NopDisposable)
    });
    assert_eq!(*seen.lock(), vec![0, 1, 2, 3]);
  }

  #[test]
  fn runs_on_the_given_scheduler() {
    let scheduler = TestScheduler::new();
    let observer = scheduler.create_observer::<i32, ()>();
    from_iter_on(vec![1, 2], scheduler.clone()).subscribe(observer.to_any());
    assert!(observer.events().is_empty());

    scheduler.start();
    assert_eq!(
      observer.events(),
      vec![
        Recorded::next(Duration::ZERO, 1),
        Recorded::next(Duration::ZERO, 2),
        Recorded::completed(Duration::ZERO)
      ]
    );
  }
}
