use super::EvictionPolicy;
use crate::entry::CacheEntry;

use std::collections::VecDeque;

/// An eviction policy that keeps the least recently used entries at the tail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lru;

impl Lru {
  pub fn new() -> Self {
    Self
  }
}

impl<K, V> EvictionPolicy<K, V> for Lru {
  /// When an entry is read, move it to the front of the sequence.
  fn shift(&self, entries: &mut VecDeque<CacheEntry<K, V>>, touched: usize) {
    if touched == 0 {
      return;
    }
    if let Some(entry) = entries.remove(touched) {
      entries.push_front(entry);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sequence(n: u32) -> VecDeque<CacheEntry<u32, ()>> {
    (0..n).map(|k| CacheEntry::with_expiry(k, (), u64::MAX)).collect()
  }

  fn keys(entries: &VecDeque<CacheEntry<u32, ()>>) -> Vec<u32> {
    entries.iter().map(|e| *e.key()).collect()
  }

  #[test]
  fn test_touched_entry_moves_to_front() {
    let mut entries = sequence(5);
    Lru.shift(&mut entries, 3);
    assert_eq!(keys(&entries), vec![3, 0, 1, 2, 4]);
  }

  #[test]
  fn test_front_and_out_of_range_are_noops() {
    let mut entries = sequence(3);
    Lru.shift(&mut entries, 0);
    Lru.shift(&mut entries, 7);
    assert_eq!(keys(&entries), vec![0, 1, 2]);
  }
}
