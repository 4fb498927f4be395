use std::collections::HashMap;

use smallvec::SmallVec;

/// Key returned by [`Bag::insert`], used to remove the element again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BagKey(u64);

/// Number of elements kept in the inline array before spilling into the map.
const ARRAY_DICTIONARY_MAX_SIZE: usize = 30;

/// Unordered keyed collection optimised for the few-observers case.
///
/// The first elements live in a small inline array where removal is a short
/// linear scan; once that array holds `ARRAY_DICTIONARY_MAX_SIZE` elements the
/// rest go to a hash map. Both insertion and removal by key are O(1)
/// (amortized), keys are never reused.
///
/// # Examples
///
/// ```rust
/// use rxcore::util::Bag;
///
/// let mut bag = Bag::default();
/// let a = bag.insert("a");
/// let _b = bag.insert("b");
/// assert_eq!(bag.len(), 2);
/// assert_eq!(bag.remove(a), Some("a"));
/// assert_eq!(bag.remove(a), None);
/// ```
pub struct Bag<T> {
  next_key: u64,
  pairs: SmallVec<[(BagKey, T); 2]>,
  dictionary: HashMap<BagKey, T>,
}

impl<T> Default for Bag<T> {
  fn default() -> Self { Self { next_key: 0, pairs: SmallVec::new(), dictionary: HashMap::new() } }
}

impl<T> Bag<T> {
  /// Inserts `element` and returns the key that removes it.
  pub fn insert(&mut self, element: T) -> BagKey {
    let key = BagKey(self.next_key);
    self.next_key = self.next_key.wrapping_add(1);

    if self.pairs.len() < ARRAY_DICTIONARY_MAX_SIZE {
      self.pairs.push((key, element));
    } else {
      self.dictionary.insert(key, element);
    }
    key
  }

  /// Removes the element registered under `key`.
  pub fn remove(&mut self, key: BagKey) -> Option<T> {
    if let Some(pos) = self.pairs.iter().position(|(k, _)| *k == key) {
      return Some(self.pairs.remove(pos).1);
    }
    self.dictionary.remove(&key)
  }

  #[inline]
  pub fn len(&self) -> usize { self.pairs.len() + self.dictionary.len() }

  #[inline]
  pub fn is_empty(&self) -> bool { self.pairs.is_empty() && self.dictionary.is_empty() }

  /// Removes every element.
  pub fn remove_all(&mut self) {
    self.pairs.clear();
    self.dictionary.clear();
  }

  /// Iterates the inline elements first, then the spilled ones.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.pairs.iter().map(|(_, v)| v).chain(self.dictionary.values())
  }

  /// Takes every element out of the bag.
  pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
    self.pairs.drain(..).map(|(_, v)| v).chain(self.dictionary.drain().map(|(_, v)| v))
  }

  /// Clones the current elements, used to deliver outside a lock.
  pub fn snapshot(&self) -> Vec<T>
  where
    T: Clone,
  {
    self.iter().cloned().collect()
  }
}
