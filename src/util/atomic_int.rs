use std::sync::atomic::{AtomicI32, Ordering};

/// Integer cell used for one-shot flags and counters.
///
/// Every operation returns the value held *before* the update, so
/// `fetch_or(&flag, 1) == 0` identifies the single caller that performed the
/// false -> true transition.
#[derive(Debug, Default)]
pub struct AtomicInt(AtomicI32);

impl AtomicInt {
  #[inline]
  pub const fn new(value: i32) -> Self { Self(AtomicI32::new(value)) }

  #[inline]
  pub fn add(&self, value: i32) -> i32 { self.0.fetch_add(value, Ordering::AcqRel) }

  #[inline]
  pub fn sub(&self, value: i32) -> i32 { self.0.fetch_sub(value, Ordering::AcqRel) }

  #[inline]
  pub fn fetch_or(&self, mask: i32) -> i32 { self.0.fetch_or(mask, Ordering::AcqRel) }

  #[inline]
  pub fn load(&self) -> i32 { self.0.load(Ordering::Acquire) }

  #[inline]
  pub fn increment(&self) -> i32 { self.add(1) }

  #[inline]
  pub fn decrement(&self) -> i32 { self.sub(1) }

  #[inline]
  pub fn is_flag_set(&self, mask: i32) -> bool { self.load() & mask != 0 }
}
