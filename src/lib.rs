//! # rxcore: reactive-streams primitives
//!
//! The building blocks of a ReactiveX implementation, thread-safe and
//! dynamically dispatched: events and observers, disposables, subjects,
//! schedulers and sequential concatenation.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use rxcore::prelude::*;
//!
//! let subject = PublishSubject::<i32, RxError>::new();
//! let log = Arc::new(Mutex::new(vec![]));
//!
//! let l = log.clone();
//! let bag = DisposeBag::new();
//! of::<_, RxError>([1, 2])
//!   .concat_with(subject.clone())
//!   .subscribe_next(move |v| l.lock().push(v))
//!   .disposed_by(&bag);
//!
//! subject.on_next(3);
//! subject.on_completed();
//! assert_eq!(*log.lock(), vec![1, 2, 3]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Event`] | `Next`, `Error` or `Completed`; a sequence is `Next* (Error \| Completed)?` |
//! | [`Observer`] | Consumes events through `on` |
//! | [`Observable`] | Produces events for each `subscribe` |
//! | [`Disposable`] | Handle that cancels a subscription or scheduled work |
//! | [`PublishSubject`] | Observer and observable at once, broadcasting to many |
//! | [`SchedulerType`] | Decides where and when work runs |
//!
//! ## Feature Flags
//!
//! - **`tokio-scheduler`** (default): [`SerialDispatchQueueScheduler`], a
//!   serial work queue on a tokio runtime.
//!
//! [`Event`]: event::Event
//! [`Observer`]: observer::Observer
//! [`Observable`]: observable::Observable
//! [`Disposable`]: disposable::Disposable
//! [`PublishSubject`]: subject::PublishSubject
//! [`SchedulerType`]: scheduler::SchedulerType
//! [`SerialDispatchQueueScheduler`]: scheduler::SerialDispatchQueueScheduler

pub mod disposable;
pub mod error;
pub mod event;
pub mod hooks;
pub mod observable;
pub mod observer;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod util;

pub use prelude::*;
