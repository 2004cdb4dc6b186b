use super::{EntryList, Store};
use crate::entry::CacheEntry;
use crate::error::{BuildError, CacheError, Result};
use crate::policy::EvictionPolicy;
use crate::time;

use core::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

/// A store that keeps its ordered sequence in process memory.
///
/// A single mutex guards the sequence and is held for the whole of each
/// operation, including the expiry sweep and the policy reorder on a hit.
/// Lookups are linear scans; rank is the position in the sequence.
pub struct InMemoryStore<K, V> {
  entries: Mutex<EntryList<K, V>>,
  policy: Arc<dyn EvictionPolicy<K, V>>,
  ttl: Duration,
}

impl<K, V> fmt::Debug for InMemoryStore<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InMemoryStore")
      .field("len", &self.entries.lock().len())
      .field("ttl", &self.ttl)
      .finish_non_exhaustive()
  }
}

impl<K, V> InMemoryStore<K, V> {
  /// Creates an empty store.
  ///
  /// Fails if `ttl` is shorter than one millisecond.
  pub fn new<P>(policy: P, ttl: Duration) -> std::result::Result<Self, BuildError>
  where
    P: EvictionPolicy<K, V> + 'static,
  {
    Self::with_shared_policy(Arc::new(policy), ttl)
  }

  pub(crate) fn with_shared_policy(
    policy: Arc<dyn EvictionPolicy<K, V>>,
    ttl: Duration,
  ) -> std::result::Result<Self, BuildError> {
    if ttl.as_millis() == 0 {
      return Err(BuildError::ZeroTimeToLive);
    }
    Ok(Self {
      entries: Mutex::new(EntryList::new()),
      policy,
      ttl,
    })
  }

  /// Runs `f` on the swept sequence while holding the lock.
  fn with_live_entries<R>(&self, f: impl FnOnce(&mut EntryList<K, V>) -> R) -> R {
    let mut entries = self.entries.lock();
    entries.sweep(time::now_millis());
    f(&mut entries)
  }
}

impl<K, V> Store<K, V> for InMemoryStore<K, V>
where
  K: Eq + Clone + Send,
  V: Clone + Send,
{
  fn add(&self, key: K, value: V) -> Result<()> {
    let entry = CacheEntry::new(key, value, self.ttl);
    self.with_live_entries(|entries| entries.upsert(entry));
    Ok(())
  }

  fn add_first(&self, entry: CacheEntry<K, V>) -> Result<()> {
    self.with_live_entries(|entries| entries.push_front(entry));
    Ok(())
  }

  fn add_last(&self, entry: CacheEntry<K, V>) -> Result<()> {
    self.with_live_entries(|entries| entries.push_back(entry));
    Ok(())
  }

  fn remove_first(&self) -> Result<CacheEntry<K, V>> {
    self
      .with_live_entries(|entries| entries.pop_front())
      .ok_or(CacheError::EmptyStore)
  }

  fn remove_last(&self) -> Result<CacheEntry<K, V>> {
    self
      .with_live_entries(|entries| entries.pop_back())
      .ok_or(CacheError::EmptyStore)
  }

  fn remove(&self, key: &K) -> Result<Option<CacheEntry<K, V>>> {
    Ok(self.with_live_entries(|entries| entries.remove(key)))
  }

  fn get(&self, key: &K) -> Result<Option<V>> {
    Ok(self.with_live_entries(|entries| entries.touch(key, &*self.policy)))
  }

  fn index_of(&self, key: &K) -> Result<Option<usize>> {
    Ok(self.with_live_entries(|entries| entries.position(key)))
  }

  fn size(&self) -> Result<usize> {
    Ok(self.with_live_entries(|entries| entries.len()))
  }

  fn clear(&self) -> Result<()> {
    self.entries.lock().clear();
    Ok(())
  }

  fn remove_expired(&self) -> Result<usize> {
    Ok(self.entries.lock().sweep(time::now_millis()))
  }

  fn entries(&self) -> Result<Vec<CacheEntry<K, V>>> {
    Ok(self.with_live_entries(|entries| entries.to_vec()))
  }

  fn ttl(&self) -> Duration {
    self.ttl
  }
}
