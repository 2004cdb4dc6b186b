//! The storage capability shared by every cache tier.

mod entries;
pub mod memory;
pub mod persistent;

use crate::entry::CacheEntry;
use crate::error::Result;

use std::time::Duration;

pub(crate) use entries::EntryList;
pub use memory::InMemoryStore;
pub use persistent::PersistentStore;

/// An ordered, TTL-aware sequence of cache entries.
///
/// Position 0 is the most favoured entry and the tail is the first to go when
/// a tier runs out of room. Every operation first sweeps expired entries, so
/// expiry is evaluated lazily on access.
///
/// A key is stored at most once: `add` overwrites an existing entry in place
/// (value and deadline are replaced, its rank is kept) and `add_first` /
/// `add_last` move an existing key to the requested end.
pub trait Store<K, V>: Send + Sync {
  /// Creates a new entry with the store's TTL and appends it at the tail.
  fn add(&self, key: K, value: V) -> Result<()>;

  /// Inserts a pre-built entry at the head.
  fn add_first(&self, entry: CacheEntry<K, V>) -> Result<()>;

  /// Inserts a pre-built entry at the tail.
  fn add_last(&self, entry: CacheEntry<K, V>) -> Result<()>;

  /// Removes and returns the head entry.
  ///
  /// Fails with [`CacheError::EmptyStore`](crate::CacheError::EmptyStore) if
  /// there is no live entry.
  fn remove_first(&self) -> Result<CacheEntry<K, V>>;

  /// Removes and returns the tail entry.
  ///
  /// Fails with [`CacheError::EmptyStore`](crate::CacheError::EmptyStore) if
  /// there is no live entry.
  fn remove_last(&self) -> Result<CacheEntry<K, V>>;

  /// Removes the entry for `key`, if present.
  fn remove(&self, key: &K) -> Result<Option<CacheEntry<K, V>>>;

  /// Looks up `key` and, on a hit, lets the eviction policy reorder the
  /// sequence before returning a copy of the value.
  fn get(&self, key: &K) -> Result<Option<V>>;

  /// Returns the zero-based rank of `key`, or `None` if it is absent.
  fn index_of(&self, key: &K) -> Result<Option<usize>>;

  /// The number of live entries.
  fn size(&self) -> Result<usize>;

  fn clear(&self) -> Result<()>;

  /// Removes every expired entry and returns how many were removed.
  fn remove_expired(&self) -> Result<usize>;

  /// A rank-ordered copy of the live entries.
  fn entries(&self) -> Result<Vec<CacheEntry<K, V>>>;

  /// The time-to-live given to entries created through [`Store::add`].
  fn ttl(&self) -> Duration;

  fn is_empty(&self) -> Result<bool> {
    Ok(self.size()? == 0)
  }

  fn contains_key(&self, key: &K) -> Result<bool> {
    Ok(self.index_of(key)?.is_some())
  }
}
