use crate::entry::CacheEntry;
use crate::policy::EvictionPolicy;

use std::collections::VecDeque;

/// The ordered sequence both store backends operate on.
///
/// It tracks whether it was modified so the persistent store only rewrites
/// its file when something actually changed.
#[derive(Debug)]
pub(crate) struct EntryList<K, V> {
  items: VecDeque<CacheEntry<K, V>>,
  dirty: bool,
}

impl<K, V> Default for EntryList<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V> EntryList<K, V> {
  pub(crate) fn new() -> Self {
    Self::from_items(VecDeque::new())
  }

  pub(crate) fn from_items(items: VecDeque<CacheEntry<K, V>>) -> Self {
    Self {
      items,
      dirty: false,
    }
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.items.len()
  }

  #[inline]
  pub(crate) fn items(&self) -> &VecDeque<CacheEntry<K, V>> {
    &self.items
  }

  #[inline]
  pub(crate) fn is_dirty(&self) -> bool {
    self.dirty
  }

  /// Drops every entry whose deadline lies before `now_millis`.
  pub(crate) fn sweep(&mut self, now_millis: u64) -> usize {
    let before = self.items.len();
    self.items.retain(|entry| !entry.is_expired_at(now_millis));
    let removed = before - self.items.len();
    if removed > 0 {
      self.dirty = true;
    }
    removed
  }

  pub(crate) fn pop_front(&mut self) -> Option<CacheEntry<K, V>> {
    let entry = self.items.pop_front();
    self.dirty |= entry.is_some();
    entry
  }

  pub(crate) fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
    let entry = self.items.pop_back();
    self.dirty |= entry.is_some();
    entry
  }

  pub(crate) fn clear(&mut self) {
    if !self.items.is_empty() {
      self.items.clear();
      self.dirty = true;
    }
  }
}

impl<K: Eq, V> EntryList<K, V> {
  /// Linear scan for `key`.
  pub(crate) fn position(&self, key: &K) -> Option<usize> {
    self.items.iter().position(|entry| entry.key() == key)
  }

  /// Replaces the entry for the same key in place, or appends it.
  pub(crate) fn upsert(&mut self, entry: CacheEntry<K, V>) {
    match self.position(entry.key()) {
      Some(index) => self.items[index] = entry,
      None => self.items.push_back(entry),
    }
    self.dirty = true;
  }

  pub(crate) fn push_front(&mut self, entry: CacheEntry<K, V>) {
    self.remove(entry.key());
    self.items.push_front(entry);
    self.dirty = true;
  }

  pub(crate) fn push_back(&mut self, entry: CacheEntry<K, V>) {
    self.remove(entry.key());
    self.items.push_back(entry);
    self.dirty = true;
  }

  pub(crate) fn remove(&mut self, key: &K) -> Option<CacheEntry<K, V>> {
    let entry = self
      .position(key)
      .and_then(|index| self.items.remove(index));
    self.dirty |= entry.is_some();
    entry
  }

  /// Looks up `key`; on a hit the policy reorders the whole sequence.
  pub(crate) fn touch(&mut self, key: &K, policy: &dyn EvictionPolicy<K, V>) -> Option<V>
  where
    V: Clone,
  {
    let index = self.position(key)?;
    let value = self.items[index].value().clone();
    policy.shift(&mut self.items, index);
    // Reads reorder, so a hit must be persisted like any other mutation.
    self.dirty = true;
    Some(value)
  }

  pub(crate) fn to_vec(&self) -> Vec<CacheEntry<K, V>>
  where
    K: Clone,
    V: Clone,
  {
    self.items.iter().cloned().collect()
  }
}
