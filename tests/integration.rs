//! Integration tests for rxcore
//!
//! Subject lifecycle, concatenation and scheduling working together, plus
//! the threading behaviour of subjects.

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
  },
  thread,
};

use parking_lot::Mutex;
use proptest::prelude::*;
use rxcore::prelude::*;

type Log<T> = Arc<Mutex<Vec<Event<T, RxError>>>>;

fn record<T: Send + 'static>(source: &impl Observable<T, RxError>) -> (Log<T>, BoxedDisposable) {
  let log: Log<T> = Arc::new(Mutex::new(vec![]));
  let l = log.clone();
  let d = source.subscribe_event(move |e| l.lock().push(e));
  (log, d)
}

#[test]
fn test_subject_late_subscribe() {
  let subject = PublishSubject::<i32, RxError>::new();
  let (a, _da) = record(&subject);

  subject.on_next(1);
  subject.on_next(2);
  subject.on_completed();
  assert_eq!(subject.observer_count(), 0);

  let (b, _db) = record(&subject);
  let (c, _dc) = record(&subject);
  assert_eq!(*a.lock(), vec![Event::Next(1), Event::Next(2), Event::Completed]);
  assert_eq!(*b.lock(), vec![Event::Completed]);
  assert_eq!(*c.lock(), vec![Event::Completed]);
  assert_eq!(subject.observer_count(), 0);
}

#[test]
fn test_broadcast_under_concurrent_subscribe() {
  let subject = PublishSubject::<String, RxError>::new();
  let b_log: Log<String> = Arc::new(Mutex::new(vec![]));
  let b_subscription = Arc::new(Mutex::new(None));

  let (s, b, slot) = (subject.clone(), b_log.clone(), b_subscription.clone());
  let _da = subject.subscribe_next(move |_| {
    let b = b.clone();
    *slot.lock() = Some(s.subscribe_event(move |e| b.lock().push(e)));
  });

  subject.on_next("x".to_string());
  assert!(b_log.lock().is_empty());
  assert!(b_subscription.lock().is_some());

  subject.on_completed();
  assert_eq!(*b_log.lock(), vec![Event::Completed]);
}

#[test]
fn test_subjects_from_many_threads() {
  let subject = PublishSubject::<usize, RxError>::new();
  let total = Arc::new(AtomicUsize::new(0));
  let barrier = Arc::new(Barrier::new(9));

  let subscribers = (0..8)
    .map(|_| {
      let (subject, total, barrier) = (subject.clone(), total.clone(), barrier.clone());
      thread::spawn(move || {
        let d = subject.subscribe_next(move |v| {
          total.fetch_add(v, Ordering::SeqCst);
        });
        barrier.wait();
        d
      })
    })
    .collect::<Vec<_>>();

  barrier.wait();
  let subscriptions = subscribers.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>();
  assert_eq!(subject.observer_count(), 8);

  subject.on_next(1);
  assert_eq!(total.load(Ordering::SeqCst), 8);

  let disposers = subscriptions
    .into_iter()
    .map(|d| thread::spawn(move || d.dispose()))
    .collect::<Vec<_>>();
  for d in disposers {
    d.join().unwrap();
  }
  assert_eq!(subject.observer_count(), 0);
}

#[test]
fn test_dispose_bag_ordering() {
  let order = Arc::new(Mutex::new(vec![]));
  let subject = PublishSubject::<i32, RxError>::new();
  let seen = Arc::new(Mutex::new(vec![]));
  {
    let bag = DisposeBag::new();
    for name in ["first", "second", "third"] {
      let o = order.clone();
      Disposables::create_with(move || o.lock().push(name)).disposed_by(&bag);
    }
    let s = seen.clone();
    subject.subscribe_next(move |v| s.lock().push(v)).disposed_by(&bag);
    subject.on_next(1);
    assert_eq!(bag.len(), 4);
  }
  subject.on_next(2);

  assert_eq!(*order.lock(), vec!["first", "second", "third"]);
  assert_eq!(*seen.lock(), vec![1]);
  assert!(!subject.has_observers());
}

#[test]
fn test_scheduler_cancellation_race() {
  let scheduler = TestScheduler::new();
  let runs = Arc::new(AtomicUsize::new(0));

  let handles = (0..100)
    .map(|i| {
      let r = runs.clone();
      scheduler.schedule_relative(i, Duration::from_millis(10), move |_| {
        r.fetch_add(1, Ordering::SeqCst);
        Box::new(NopDisposable)
      })
    })
    .collect::<Vec<_>>();

  let disposers = handles
    .into_iter()
    .enumerate()
    .filter(|(i, _)| i % 2 == 0)
    .map(|(_, handle)| thread::spawn(move || handle.dispose()))
    .collect::<Vec<_>>();
  for d in disposers {
    d.join().unwrap();
  }

  assert_eq!(scheduler.pending_count(), 50);
  scheduler.advance_by(Duration::from_millis(10));
  assert_eq!(runs.load(Ordering::SeqCst), 50);
}

#[test]
fn test_concat_of_live_and_timed_sources() {
  let scheduler = TestScheduler::new();
  let subject = PublishSubject::<u64, RxError>::new();
  let observer = scheduler.create_observer::<u64, RxError>();

  let source = concat(vec![
    timer::<_, RxError>(Duration::from_millis(10), scheduler.clone()).into_boxed(),
    subject.clone().into_boxed(),
    just::<u64, RxError>(7).into_boxed(),
  ]);
  let _d = source.subscribe(observer.to_any());

  subject.on_next(100);
  assert!(!subject.has_observers());
  scheduler.advance_by(Duration::from_millis(10));
  assert!(subject.has_observers());

  scheduler.advance_by(Duration::from_millis(5));
  subject.on_next(1);
  subject.on_completed();

  assert_eq!(
    observer.events(),
    vec![
      Recorded::next(Duration::from_millis(10), 0),
      Recorded::next(Duration::from_millis(15), 1),
      Recorded::next(Duration::from_millis(15), 7),
      Recorded::completed(Duration::from_millis(15)),
    ]
  );
}

#[test]
fn test_behavior_relay_as_state_store() {
  let relay = BehaviorRelay::new(0);
  let renders = Arc::new(Mutex::new(vec![]));
  let r = renders.clone();
  let bag = DisposeBag::new();
  relay.subscribe_next(move |v| r.lock().push(v)).disposed_by(&bag);

  for i in 1..=3 {
    relay.accept(relay.value() + i);
  }
  assert_eq!(relay.value(), 6);
  assert_eq!(*renders.lock(), vec![0, 1, 3, 6]);
}

#[derive(Debug, Clone)]
enum Step {
  Next(u8),
  Error,
  Completed,
}

fn step() -> impl Strategy<Value = Step> {
  prop_oneof![
    8 => any::<u8>().prop_map(Step::Next),
    1 => Just(Step::Error),
    1 => Just(Step::Completed),
  ]
}

proptest! {
  #[test]
  fn created_sequences_obey_the_event_grammar(steps in prop::collection::vec(step(), 0..30)) {
    let script = steps.clone();
    let source = create(move |observer: AnyObserver<u8, RxError>| {
      for step in &script {
        match step {
          Step::Next(v) => observer.on_next(*v),
          Step::Error => observer.on_error(RxError::Unknown),
          Step::Completed => observer.on_completed(),
        }
      }
      Box::new(NopDisposable)
    });
    let (log, _d) = record(&source);

    let expected = steps
      .iter()
      .scan(false, |stopped, step| {
        if *stopped {
          return None;
        }
        *stopped = !matches!(step, Step::Next(_));
        Some(match step {
          Step::Next(v) => Event::Next(*v),
          Step::Error => Event::Error(RxError::Unknown),
          Step::Completed => Event::Completed,
        })
      })
      .collect::<Vec<_>>();
    prop_assert_eq!(&*log.lock(), &expected);
  }

  // A subscription racing a broadcast may or may not catch the in-flight
  // value; whatever it sees is a contiguous suffix of what was sent.
  #[test]
  fn racing_subscriber_sees_a_suffix(count in 1usize..200, delay in 0u64..50) {
    let subject = PublishSubject::<usize, RxError>::new();
    let seen = Arc::new(Mutex::new(vec![]));

    let late = {
      let (subject, seen) = (subject.clone(), seen.clone());
      thread::spawn(move || {
        thread::sleep(Duration::from_micros(delay));
        subject.subscribe_next(move |v| seen.lock().push(v))
      })
    };
    for i in 0..count {
      subject.on_next(i);
    }
    let _d = late.join().unwrap();
    subject.on_next(count);

    let seen = seen.lock();
    prop_assert!(!seen.is_empty());
    let first = seen[0];
    prop_assert_eq!(&*seen, &(first..=count).collect::<Vec<_>>());
  }
}
