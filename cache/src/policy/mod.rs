pub mod lfu;
pub mod lru;

use crate::entry::CacheEntry;

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use lfu::Lfu;
pub use lru::Lru;

/// A trait for implementing the reordering rule a store applies on every
/// successful lookup.
///
/// Position 0 of the sequence is the most favoured entry. Stores evict from
/// the tail, so a policy decides retention purely by where it moves the
/// touched entry.
pub trait EvictionPolicy<K, V>: Send + Sync {
  /// Reorders `entries` after the entry at `touched` was read.
  ///
  /// Implementations must keep every entry exactly once. A `touched` index
  /// outside the sequence must leave it unchanged.
  fn shift(&self, entries: &mut VecDeque<CacheEntry<K, V>>, touched: usize);
}

/// The built-in policies, selectable at construction time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
  /// Move the touched entry to the front.
  #[default]
  Lru,
  /// Move the touched entry one position toward the front.
  Lfu,
}

impl fmt::Display for Policy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Policy::Lru => write!(f, "lru"),
      Policy::Lfu => write!(f, "lfu"),
    }
  }
}

impl<K, V> EvictionPolicy<K, V> for Policy {
  #[inline]
  fn shift(&self, entries: &mut VecDeque<CacheEntry<K, V>>, touched: usize) {
    match self {
      Policy::Lru => Lru.shift(entries, touched),
      Policy::Lfu => Lfu.shift(entries, touched),
    }
  }
}
