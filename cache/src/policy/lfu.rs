use super::EvictionPolicy;
use crate::entry::CacheEntry;

use std::collections::VecDeque;

/// An eviction policy that lets frequently read entries climb toward the
/// front one step per hit.
///
/// There is no access counter: each hit swaps the entry with its immediate
/// predecessor, so rank approximates frequency over many reads. An entry read
/// `n` times climbs at most `n` positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lfu;

impl Lfu {
  pub fn new() -> Self {
    Self
  }
}

impl<K, V> EvictionPolicy<K, V> for Lfu {
  fn shift(&self, entries: &mut VecDeque<CacheEntry<K, V>>, touched: usize) {
    if touched > 0 && touched < entries.len() {
      entries.swap(touched, touched - 1);
    }
  }
}
