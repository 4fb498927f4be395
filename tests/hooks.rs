//! The default error handler is process-wide, so these tests live in their
//! own binary.

use std::sync::Arc;

use parking_lot::Mutex;
use rxcore::prelude::*;

#[test]
fn test_unhandled_errors_reach_the_default_handler() {
  let _ = tracing_subscriber::fmt().with_test_writer().try_init();
  let reported = Arc::new(Mutex::new(vec![]));
  let r = reported.clone();
  Hooks::set_default_error_handler(move |err| r.lock().push(format!("{err:?}")));

  let subject = PublishSubject::<i32, RxError>::new();
  let _d = subject.subscribe_next(|_| {});
  subject.on_error(RxError::ArgumentOutOfRange);

  // handled errors never reach the hook
  let _d = throw::<i32, _>(RxError::Unknown).subscribe_all(|_| {}, |_| {}, || {});

  Hooks::reset_default_error_handler();
  throw::<i32, _>(RxError::Unknown).subscribe_next(|_| {});

  assert_eq!(*reported.lock(), vec!["ArgumentOutOfRange".to_string()]);
}
