/// Growable ring buffer with amortized O(1) `enqueue` and `dequeue`.
///
/// Storage doubles when full and halves once the element count drops below a
/// quarter of the capacity, never shrinking below the initial capacity.
///
/// `Queue` does no synchronization of its own. Components that share one
/// across threads keep it behind their own lock.
pub struct Queue<T> {
  storage: Vec<Option<T>>,
  initial_capacity: usize,
  count: usize,
  push_next_index: usize,
}

const RESIZE_FACTOR: usize = 2;

impl<T> Queue<T> {
  /// Creates a queue with room for `capacity` elements.
  pub fn with_capacity(capacity: usize) -> Self {
    let mut storage = Vec::with_capacity(capacity);
    storage.resize_with(capacity, || None);
    Self { storage, initial_capacity: capacity, count: 0, push_next_index: 0 }
  }

  #[inline]
  pub fn len(&self) -> usize { self.count }

  #[inline]
  pub fn is_empty(&self) -> bool { self.count == 0 }

  /// Number of slots in the backing storage.
  #[inline]
  pub fn capacity(&self) -> usize { self.storage.len() }

  #[inline]
  fn dequeue_index(&self) -> usize {
    let cap = self.storage.len();
    (self.push_next_index + cap - self.count) % cap
  }

  /// Appends `element` at the back of the queue.
  pub fn enqueue(&mut self, element: T) {
    if self.count == self.storage.len() {
      self.resize_to(self.storage.len().max(1) * RESIZE_FACTOR);
    }

    self.storage[self.push_next_index] = Some(element);
    self.push_next_index += 1;
    self.count += 1;

    if self.push_next_index >= self.storage.len() {
      self.push_next_index -= self.storage.len();
    }
  }

  /// Returns the element at the front of the queue without removing it.
  pub fn peek(&self) -> Option<&T> {
    if self.is_empty() {
      return None;
    }
    self.storage[self.dequeue_index()].as_ref()
  }

  /// Removes and returns the element at the front of the queue.
  pub fn dequeue(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }

    let index = self.dequeue_index();
    let value = self.storage[index].take();
    self.count -= 1;

    let downsize_limit = self.storage.len() / (RESIZE_FACTOR * RESIZE_FACTOR);
    if self.count < downsize_limit && self.storage.len() > self.initial_capacity {
      self.resize_to(self.storage.len() / RESIZE_FACTOR);
    }

    value
  }

  /// Iterates from the front to the back of the queue.
  pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
    let cap = self.storage.len();
    let start = if cap == 0 { 0 } else { self.dequeue_index() };
    (0..self.count).filter_map(move |offset| self.storage[(start + offset) % cap].as_ref())
  }

  fn resize_to(&mut self, size: usize) {
    let mut storage = Vec::with_capacity(size);
    storage.resize_with(size, || None);

    let count = self.count;
    let cap = self.storage.len();
    if count > 0 {
      let start = self.dequeue_index();
      for (offset, slot) in storage.iter_mut().enumerate().take(count) {
        *slot = self.storage[(start + offset) % cap].take();
      }
    }

    self.storage = storage;
    self.push_next_index = count;
  }
}

impl<T> Default for Queue<T> {
  fn default() -> Self { Self::with_capacity(0) }
}
