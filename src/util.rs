//! Internal building blocks shared by disposables, subjects and schedulers.

pub mod async_lock;
pub mod atomic_int;
pub mod bag;
pub mod queue;
pub(crate) mod sync_tracker;

pub use async_lock::{AsyncLock, Invocable};
pub use atomic_int::AtomicInt;
pub use bag::{Bag, BagKey};
pub use queue::Queue;
