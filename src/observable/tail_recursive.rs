//! Sequential concatenation driven by an explicit generator stack.
//!
//! Moving to the next inner observable is funneled through an [`AsyncLock`]:
//! an inner sequence that completes synchronously while being subscribed
//! only queues the next step, it never recurses into it. Nested
//! concatenations are flattened onto the stack instead of nesting
//! subscriptions, so chains of any depth run with a constant call stack.

use std::{marker::PhantomData, mem, sync::Arc};

use parking_lot::Mutex;

use super::{BoxedObservable, Observable, Producer, Sink, SinkDisposer};
use crate::{
  disposable::{BoxedDisposable, Disposable, SerialDisposable, SingleAssignmentDisposable},
  error::RxError,
  event::Event,
  observer::AnyObserver,
  util::{AsyncLock, AtomicInt, Invocable},
};

/// Generators deeper than this abort the concatenation with
/// [`RxError::TailRecursionOverflow`].
pub const MAX_TAIL_RECURSIVE_SINK_STACK_SIZE: usize = 10_000;

/// The remaining sources of a concatenation plus, when known, how many are
/// left.
pub type ConcatSources<Item, Err> =
  (Box<dyn Iterator<Item = BoxedObservable<Item, Err>> + Send>, Option<usize>);

/// Emits every event of each source in turn, subscribing to the next source
/// once the current one completes. An error from any source ends the
/// concatenation.
///
/// The sources are re-iterated on every subscription. Endless iterators are
/// fine: only the source being observed is ever subscribed.
///
/// ```rust
/// use std::sync::Arc;
///
/// use parking_lot::Mutex;
/// use rxcore::prelude::*;
///
/// let sources: Vec<BoxedObservable<i32, RxError>> =
///   vec![of([1, 2]).into_boxed(), empty().into_boxed(), just(3).into_boxed()];
///
/// let log = Arc::new(Mutex::new(vec![]));
/// let l = log.clone();
/// concat(sources).subscribe_next(move |v| l.lock().push(v));
/// assert_eq!(*log.lock(), vec![1, 2, 3]);
/// ```
pub fn concat<I, Item, Err>(sources: I) -> Concat<I, Item, Err>
where
  I: IntoIterator<Item = BoxedObservable<Item, Err>> + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
{
  Concat { sources, _hint: PhantomData }
}

pub struct Concat<I, Item, Err> {
  sources: I,
  _hint: PhantomData<fn() -> (Item, Err)>,
}

impl<I: Clone, Item, Err> Clone for Concat<I, Item, Err> {
  fn clone(&self) -> Self { Self { sources: self.sources.clone(), _hint: PhantomData } }
}

impl<I, Item, Err> Concat<I, Item, Err>
where
  I: IntoIterator<Item = BoxedObservable<Item, Err>> + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
{
  fn generator(&self) -> ConcatSources<Item, Err> {
    let iter = self.sources.clone().into_iter();
    let remaining = match iter.size_hint() {
      (lower, Some(upper)) if lower == upper => Some(lower),
      _ => None,
    };
    (Box::new(iter), remaining)
  }
}

impl<I, Item, Err> Producer<Item, Err> for Concat<I, Item, Err>
where
  I: IntoIterator<Item = BoxedObservable<Item, Err>> + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
  Item: Send + 'static,
  Err: Send + From<RxError> + 'static,
{
  fn run(
    &self, observer: AnyObserver<Item, Err>, cancel: Arc<SinkDisposer>,
  ) -> (BoxedDisposable, BoxedDisposable) {
    let sink = Arc::new(TailRecursiveSink::new(observer, cancel));
    sink.run(self.generator());
    (Box::new(sink.clone()), Box::new(TailRecursiveSubscription(sink)))
  }
}

impl<I, Item, Err> Observable<Item, Err> for Concat<I, Item, Err>
where
  I: IntoIterator<Item = BoxedObservable<Item, Err>> + Clone + Send + Sync + 'static,
  I::IntoIter: Send + 'static,
  Item: Send + 'static,
  Err: Send + From<RxError> + 'static,
{
  fn subscribe(&self, observer: AnyObserver<Item, Err>) -> BoxedDisposable {
    self.subscribe_producer(observer)
  }

  fn concat_sources(&self) -> Option<ConcatSources<Item, Err>> { Some(self.generator()) }
}

/// Drives the generator stack of one concatenation subscription.
struct TailRecursiveSink<Item, Err> {
  sink: Sink<Item, Err>,
  generators: Mutex<Vec<ConcatSources<Item, Err>>>,
  is_disposed: AtomicInt,
  subscription: SerialDisposable,
  gate: AsyncLock<MoveNext<Item, Err>>,
}

struct MoveNext<Item, Err>(Arc<TailRecursiveSink<Item, Err>>);

impl<Item, Err> Invocable for MoveNext<Item, Err>
where
  Item: Send + 'static,
  Err: Send + From<RxError> + 'static,
{
  fn invoke(self) { self.0.move_next_command() }
}

/// Disposes the inner subscription and the remaining generators.
struct TailRecursiveSubscription<Item, Err>(Arc<TailRecursiveSink<Item, Err>>);

impl<Item, Err> TailRecursiveSink<Item, Err>
where
  Item: Send + 'static,
  Err: Send + From<RxError> + 'static,
{
  fn new(observer: AnyObserver<Item, Err>, cancel: Arc<SinkDisposer>) -> Self {
    Self {
      sink: Sink::new(observer, cancel),
      generators: Mutex::new(vec![]),
      is_disposed: AtomicInt::new(0),
      subscription: SerialDisposable::new(),
      gate: AsyncLock::new(),
    }
  }

  fn run(self: &Arc<Self>, sources: ConcatSources<Item, Err>) {
    self.generators.lock().push(sources);
    self.schedule_move_next();
  }

  fn schedule_move_next(self: &Arc<Self>) { self.gate.invoke(MoveNext(self.clone())) }

  fn move_next_command(self: &Arc<Self>) {
    let next = loop {
      if self.is_disposed.is_flag_set(1) {
        return;
      }
      let Some((mut generator, remaining)) = self.generators.lock().pop() else {
        break None;
      };
      let Some(candidate) = generator.next() else {
        continue;
      };

      let depth = {
        let mut generators = self.generators.lock();
        match remaining {
          // generator.next() was just called, one fewer is left
          Some(left) if left > 1 => generators.push((generator, Some(left - 1))),
          Some(_) => {}
          None => generators.push((generator, None)),
        }
        match candidate.concat_sources() {
          Some(nested) => {
            generators.push(nested);
            Some(generators.len())
          }
          None => None,
        }
      };

      match depth {
        Some(depth) if depth > MAX_TAIL_RECURSIVE_SINK_STACK_SIZE => {
          tracing::error!(depth, "concatenation exceeded the tail recursion stack limit");
          let limit = MAX_TAIL_RECURSIVE_SINK_STACK_SIZE;
          self.sink.forward_on(Event::Error(RxError::TailRecursionOverflow { limit }.into()));
          self.dispose();
          return;
        }
        Some(_) => {}
        None => break Some(candidate),
      }
    };

    let Some(next) = next else {
      self.sink.forward_on(Event::Completed);
      self.dispose();
      return;
    };

    let disposable = Arc::new(SingleAssignmentDisposable::new());
    self.subscription.set(disposable.clone());
    disposable.set(next.subscribe(self.inner_observer()));
  }

  fn inner_observer(self: &Arc<Self>) -> AnyObserver<Item, Err> {
    let sink = self.clone();
    AnyObserver::from_fn(move |event| match event {
      Event::Next(_) => sink.sink.forward_on(event),
      Event::Error(_) => {
        sink.sink.forward_on(event);
        sink.dispose();
      }
      Event::Completed => sink.schedule_move_next(),
    })
  }
}

impl<Item, Err> TailRecursiveSink<Item, Err> {
  fn dispose_generators(&self) {
    if self.is_disposed.fetch_or(1) != 0 {
      return;
    }
    self.subscription.dispose();
    self.gate.dispose();
    let generators = mem::take(&mut *self.generators.lock());
    drop(generators);
  }
}

impl<Item, Err> Disposable for TailRecursiveSink<Item, Err>
where
  Item: Send,
  Err: Send,
{
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<Item, Err> Disposable for TailRecursiveSubscription<Item, Err>
where
  Item: Send,
  Err: Send,
{
  fn dispose(&self) { self.0.dispose_generators() }

  fn is_disposed(&self) -> bool { self.0.is_disposed.is_flag_set(1) }
}
