//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Events and errors
pub use crate::{error::RxError, event::Event, hooks::Hooks};
// Disposables
pub use crate::disposable::{
  AnonymousDisposable, BinaryDisposable, BooleanDisposable, BoxedDisposable, CompositeDisposable,
  Disposable, DisposableExt, DisposeBag, Disposables, NopDisposable, SerialDisposable,
  SingleAssignmentDisposable,
};
// Observer trait
pub use crate::observer::{AnyObserver, Observer};
// Core traits and factories
pub use crate::observable::{
  concat, create, deferred, empty, from_iter, from_iter_on, interval, just, never, of, throw,
  timer, BoxedObservable, Observable, ObservableExt,
};
// Schedulers
pub use crate::scheduler::{
  CurrentThreadScheduler, Duration, ImmediateSchedulerExt, ImmediateSchedulerType, Instant,
  Recorded, SchedulerType, TestScheduler, TestableObserver,
};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::{DispatchQueueConfiguration, SerialDispatchQueueScheduler};
// Subjects
pub use crate::subject::{BehaviorRelay, BehaviorSubject, PublishRelay, PublishSubject};
