//! The queue-backed scheduler driving observables on a tokio runtime.
#![cfg(feature = "tokio-scheduler")]

use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    mpsc::channel,
    Arc,
  },
  thread,
};

use parking_lot::Mutex;
use rxcore::prelude::*;
use tokio::runtime::Handle;

fn scheduler() -> SerialDispatchQueueScheduler {
  SerialDispatchQueueScheduler::new(DispatchQueueConfiguration::new(Handle::current()))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_interval_on_dispatch_queue() {
  let (tx, rx) = channel();
  let tx = Mutex::new(tx);
  let subscription = interval::<_, RxError>(Duration::from_millis(10), scheduler())
    .subscribe_next(move |v| {
      tx.lock().send(v).ok();
    });

  let ticks = tokio::task::spawn_blocking(move || {
    (0..3).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect::<Vec<_>>()
  })
  .await
  .unwrap();
  subscription.dispose();
  assert_eq!(ticks, vec![0, 1, 2]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_from_iter_on_dispatch_queue_keeps_order() {
  let (tx, rx) = channel();
  let log = Arc::new(Mutex::new(vec![]));
  let l = log.clone();
  let tx = Mutex::new(tx);
  let _d = from_iter_on::<_, _, RxError>(0..500, scheduler()).subscribe_all(
    move |v| l.lock().push(v),
    |_| {},
    move || {
      tx.lock().send(()).ok();
    },
  );

  tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)).unwrap())
    .await
    .unwrap();
  assert_eq!(*log.lock(), (0..500).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dispose_races_execution() {
  let scheduler = scheduler();
  let runs = Arc::new(AtomicUsize::new(0));
  let handles = (0..200)
    .map(|_| {
      let r = runs.clone();
      scheduler.schedule((), move |_| {
        r.fetch_add(1, Ordering::SeqCst);
        Box::new(NopDisposable)
      })
    })
    .collect::<Vec<_>>();

  let disposer = thread::spawn(move || {
    for handle in &handles {
      handle.dispose();
    }
    handles.len()
  });
  assert_eq!(disposer.join().unwrap(), 200);

  let (tx, rx) = channel();
  scheduler.schedule((), move |_| {
    tx.send(()).ok();
    Box::new(NopDisposable)
  });
  tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)).unwrap())
    .await
    .unwrap();
  // each action ran at most once and none started after its dispose
  assert!(runs.load(Ordering::SeqCst) <= 200);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_subject_fed_from_the_queue() {
  let scheduler = scheduler();
  let subject = BehaviorSubject::<i32, RxError>::new(0);
  let (tx, rx) = channel();
  let tx = Mutex::new(tx);
  let _d = subject.subscribe_all(
    |_| {},
    |_| {},
    move || {
      tx.lock().send(()).ok();
    },
  );

  for i in 1..=10 {
    let s = subject.clone();
    scheduler.schedule_relative(i, Duration::from_millis(i as u64), move |i| {
      s.on_next(i);
      if i == 10 {
        s.on_completed();
      }
      Box::new(NopDisposable)
    });
  }

  tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)).unwrap())
    .await
    .unwrap();
  assert_eq!(subject.value(), Ok(10));
}
