//! Debug-build detector for misuse of the observer grammar at subject
//! boundaries: a subject must never be fed from two threads at once, and
//! feeding it from inside one of its own callbacks is almost always a bug.

#[cfg(debug_assertions)]
use std::{collections::HashMap, thread::ThreadId};

#[cfg(debug_assertions)]
use parking_lot::Mutex;

#[derive(Default)]
pub(crate) struct SynchronizationTracker {
  #[cfg(debug_assertions)]
  threads: Mutex<HashMap<ThreadId, usize>>,
}

pub(crate) struct TrackerGuard<'a> {
  #[cfg(debug_assertions)]
  tracker: &'a SynchronizationTracker,
  #[cfg(not(debug_assertions))]
  _marker: std::marker::PhantomData<&'a ()>,
}

impl SynchronizationTracker {
  #[cfg(debug_assertions)]
  pub(crate) fn register(&self, object: &'static str) -> TrackerGuard<'_> {
    let mut threads = self.threads.lock();
    let count = threads.entry(std::thread::current().id()).or_insert(0);
    *count += 1;
    if *count > 1 {
      tracing::warn!(
        object,
        "re-entrant emission detected; a callback fed the subject it observes"
      );
    }
    if threads.len() > 1 {
      tracing::warn!(object, "concurrent emission detected; the subject was fed from two threads");
    }
    TrackerGuard { tracker: self }
  }

  #[cfg(not(debug_assertions))]
  #[inline]
  pub(crate) fn register(&self, _object: &'static str) -> TrackerGuard<'_> {
    TrackerGuard { _marker: std::marker::PhantomData }
  }
}

#[cfg(debug_assertions)]
impl Drop for TrackerGuard<'_> {
  fn drop(&mut self) {
    let mut threads = self.tracker.threads.lock();
    let id = std::thread::current().id();
    if let Some(count) = threads.get_mut(&id) {
      *count -= 1;
      if *count == 0 {
        threads.remove(&id);
      }
    }
  }
}
