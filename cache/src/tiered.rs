use crate::entry::CacheEntry;
use crate::error::{BuildError, CacheError, Result};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::store::{InMemoryStore, PersistentStore, Store};

use core::fmt;
use std::marker::PhantomData;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;

/// The tier of a [`TieredCache`] an entry currently lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
  Hot,
  Cold,
}

/// A cache composed of a capacity-bounded hot store in front of a
/// capacity-bounded cold store.
///
/// Reads check the hot tier first. New keys go to the hot tier; when it is
/// full its tail entry is demoted to the head of the cold tier, and when the
/// cold tier is full its tail entry is dropped. A cold hit that ends up at the
/// head of the cold tier is promoted back into the hot tier.
///
/// Ranks reported by [`Store::index_of`] treat the two tiers as one sequence:
/// a key at cold rank `r` has rank `r + hot_capacity`.
///
/// # Concurrency
///
/// Every operation holds a cache-wide lock for its whole duration, so a
/// cross-tier move is never observed half done through this cache. The tiers
/// returned by [`TieredCache::hot`] and [`TieredCache::cold`] are not covered
/// by that lock; mutating them directly can break the one-tier-per-key
/// invariant.
///
/// Moves run in two phases: an entry is removed from its source tier, then
/// inserted into the destination. If the insertion fails the entry is put back
/// where it came from before the error is returned.
pub struct TieredCache<K, V, H = InMemoryStore<K, V>, C = PersistentStore<K, V>> {
  hot: H,
  cold: C,
  hot_capacity: usize,
  cold_capacity: usize,
  moves: Mutex<()>,
  metrics: Metrics,
  _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, H: fmt::Debug, C: fmt::Debug> fmt::Debug for TieredCache<K, V, H, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TieredCache")
      .field("hot", &self.hot)
      .field("cold", &self.cold)
      .field("hot_capacity", &self.hot_capacity)
      .field("cold_capacity", &self.cold_capacity)
      .field("metrics", &self.metrics.snapshot())
      .finish()
  }
}

impl<K, V, H, C> TieredCache<K, V, H, C> {
  /// Composes two stores into a tiered cache.
  ///
  /// Both capacities count entries and must be non-zero. Entries already in
  /// the stores are kept as they are, even if they exceed the capacities; the
  /// next insertion brings the hot tier back within bounds.
  pub fn new(
    hot: H,
    cold: C,
    hot_capacity: usize,
    cold_capacity: usize,
  ) -> std::result::Result<Self, BuildError> {
    if hot_capacity == 0 {
      return Err(BuildError::ZeroHotCapacity);
    }
    if cold_capacity == 0 {
      return Err(BuildError::ZeroColdCapacity);
    }

    Ok(Self {
      hot,
      cold,
      hot_capacity,
      cold_capacity,
      moves: Mutex::new(()),
      metrics: Metrics::new(),
      _marker: PhantomData,
    })
  }

  /// The hot tier. Reads through it bypass the cache-wide lock.
  pub fn hot(&self) -> &H {
    &self.hot
  }

  /// The cold tier. Reads through it bypass the cache-wide lock.
  pub fn cold(&self) -> &C {
    &self.cold
  }

  /// The maximum number of entries in the hot tier.
  pub fn hot_capacity(&self) -> usize {
    self.hot_capacity
  }

  /// The maximum number of entries in the cold tier.
  pub fn cold_capacity(&self) -> usize {
    self.cold_capacity
  }

  /// A point-in-time snapshot of the cache's counters.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.metrics.snapshot()
  }
}

/// Maps the empty-store condition to `None` for steps that may race with
/// expiry.
fn non_empty<T>(result: Result<T>) -> Result<Option<T>> {
  match result {
    Ok(value) => Ok(Some(value)),
    Err(CacheError::EmptyStore) => Ok(None),
    Err(err) => Err(err),
  }
}

/// Logs a failed compensating step; the original error is what the caller
/// sees.
fn compensate(step: &'static str, result: Result<()>) {
  if let Err(err) = result {
    tracing::error!(step, error = %err, "compensating tier move failed, an entry may have been lost");
  }
}

impl<K, V, H, C> TieredCache<K, V, H, C>
where
  K: Eq + Clone + Send,
  V: Clone + Send,
  H: Store<K, V>,
  C: Store<K, V>,
{
  /// Reports which tier holds `key`.
  pub fn tier_of(&self, key: &K) -> Result<Option<Tier>> {
    let _guard = self.moves.lock();
    self.locate(key)
  }

  fn locate(&self, key: &K) -> Result<Option<Tier>> {
    if self.hot.contains_key(key)? {
      Ok(Some(Tier::Hot))
    } else if self.cold.contains_key(key)? {
      Ok(Some(Tier::Cold))
    } else {
      Ok(None)
    }
  }

  /// Demotes hot tail entries until the hot tier has a free slot.
  fn make_room_in_hot(&self) -> Result<()> {
    while self.hot.size()? >= self.hot_capacity {
      let Some(demoted) = non_empty(self.hot.remove_last())? else {
        break;
      };
      if let Err(err) = self.demote(demoted.clone()) {
        compensate("return demoted entry to hot tier", self.hot.add_last(demoted));
        return Err(err);
      }
    }
    Ok(())
  }

  /// Inserts `entry` at the head of the cold tier, dropping the cold tail
  /// first if the tier is full.
  fn demote(&self, entry: CacheEntry<K, V>) -> Result<()> {
    let dropped = self.drop_cold_tail_if_full()?;
    if let Err(err) = self.cold.add_first(entry) {
      if let Some(dropped) = dropped {
        compensate("restore dropped cold entry", self.cold.add_last(dropped));
      }
      return Err(err);
    }

    if dropped.is_some() {
      self.metrics.evicted_by_capacity.fetch_add(1, Ordering::Relaxed);
    }
    self.metrics.demotions.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(dropped = dropped.is_some(), "demoted hot tail to cold head");
    Ok(())
  }

  fn drop_cold_tail_if_full(&self) -> Result<Option<CacheEntry<K, V>>> {
    if self.cold.size()? >= self.cold_capacity {
      non_empty(self.cold.remove_last())
    } else {
      Ok(None)
    }
  }

  /// Moves the cold head (which must hold `key`) to the hot tail, then
  /// touches it once through the hot tier's policy.
  ///
  /// The hot tail is demoted to the cold head only when the hot tier is full.
  /// With free hot slots nothing is demoted, so every hot entry keeps its
  /// rank and the cold tier shrinks by one.
  fn promote(&self, key: &K) -> Result<()> {
    let Some(promoted) = non_empty(self.cold.remove_first())? else {
      return Ok(());
    };
    if promoted.key() != key {
      // The head changed between the lookup and the move; leave it in place.
      return self.cold.add_first(promoted);
    }

    let demoted = if self.hot.size()? >= self.hot_capacity {
      non_empty(self.hot.remove_last())?
    } else {
      None
    };
    if let Some(demoted) = &demoted {
      if let Err(err) = self.cold.add_first(demoted.clone()) {
        compensate("return demoted entry to hot tier", self.hot.add_last(demoted.clone()));
        compensate("return promoted entry to cold tier", self.cold.add_first(promoted));
        return Err(err);
      }
    }

    if let Err(err) = self.hot.add_last(promoted.clone()) {
      if let Some(demoted) = demoted {
        compensate(
          "take demoted entry back from cold tier",
          self.cold.remove(demoted.key()).map(|_| ()),
        );
        compensate("return demoted entry to hot tier", self.hot.add_last(demoted));
      }
      compensate("return promoted entry to cold tier", self.cold.add_first(promoted));
      return Err(err);
    }

    if demoted.is_some() {
      self.metrics.demotions.fetch_add(1, Ordering::Relaxed);
    }
    self.metrics.promotions.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(demoted = demoted.is_some(), "promoted cold head to hot tail");
    self.hot.get(key)?;
    Ok(())
  }

  /// Refills the hot tier from the cold head after a sweep, leaving one hot
  /// slot free.
  fn backfill(&self) -> Result<usize> {
    let slots = self
      .hot_capacity
      .saturating_sub(self.hot.size()?)
      .saturating_sub(1);

    let mut moved = 0;
    while moved < slots {
      let Some(entry) = non_empty(self.cold.remove_first())? else {
        break;
      };
      if let Err(err) = self.hot.add_last(entry.clone()) {
        compensate("return backfilled entry to cold tier", self.cold.add_first(entry));
        return Err(err);
      }
      moved += 1;
    }

    if moved > 0 {
      self.metrics.backfilled.fetch_add(moved as u64, Ordering::Relaxed);
      tracing::debug!(moved, "backfilled hot tier from cold head");
    }
    Ok(moved)
  }

  fn forget(&self, key: &K) -> Result<Option<CacheEntry<K, V>>> {
    match self.hot.remove(key)? {
      Some(entry) => Ok(Some(entry)),
      None => self.cold.remove(key),
    }
  }
}

impl<K, V, H, C> Store<K, V> for TieredCache<K, V, H, C>
where
  K: Eq + Clone + Send,
  V: Clone + Send,
  H: Store<K, V>,
  C: Store<K, V>,
{
  /// Overwrites `key` in the tier that holds it, or appends it to the hot
  /// tier, demoting the hot tail first if the hot tier is full.
  fn add(&self, key: K, value: V) -> Result<()> {
    let _guard = self.moves.lock();
    match self.locate(&key)? {
      Some(Tier::Hot) => {
        self.hot.add(key, value)?;
        self.metrics.updates.fetch_add(1, Ordering::Relaxed);
      }
      Some(Tier::Cold) => {
        self.cold.add(key, value)?;
        self.metrics.updates.fetch_add(1, Ordering::Relaxed);
      }
      None => {
        self.make_room_in_hot()?;
        self.hot.add(key, value)?;
        self.metrics.inserts.fetch_add(1, Ordering::Relaxed);
      }
    }
    Ok(())
  }

  /// Inserts `entry` at the head of the hot tier.
  fn add_first(&self, entry: CacheEntry<K, V>) -> Result<()> {
    let _guard = self.moves.lock();
    self.forget(entry.key())?;
    self.make_room_in_hot()?;
    self.hot.add_first(entry)?;
    self.metrics.inserts.fetch_add(1, Ordering::Relaxed);
    Ok(())
  }

  /// Appends `entry` at the tail of the cold tier, dropping the current cold
  /// tail first if the cold tier is full.
  fn add_last(&self, entry: CacheEntry<K, V>) -> Result<()> {
    let _guard = self.moves.lock();
    self.forget(entry.key())?;
    let dropped = self.drop_cold_tail_if_full()?;
    if let Err(err) = self.cold.add_last(entry) {
      if let Some(dropped) = dropped {
        compensate("restore dropped cold entry", self.cold.add_last(dropped));
      }
      return Err(err);
    }
    if dropped.is_some() {
      self.metrics.evicted_by_capacity.fetch_add(1, Ordering::Relaxed);
    }
    self.metrics.inserts.fetch_add(1, Ordering::Relaxed);
    Ok(())
  }

  /// Removes the head of the hot tier, or of the cold tier if hot is empty.
  fn remove_first(&self) -> Result<CacheEntry<K, V>> {
    let _guard = self.moves.lock();
    match non_empty(self.hot.remove_first())? {
      Some(entry) => Ok(entry),
      None => self.cold.remove_first(),
    }
  }

  /// Removes the tail of the cold tier, or of the hot tier if cold is empty.
  fn remove_last(&self) -> Result<CacheEntry<K, V>> {
    let _guard = self.moves.lock();
    match non_empty(self.cold.remove_last())? {
      Some(entry) => Ok(entry),
      None => self.hot.remove_last(),
    }
  }

  fn remove(&self, key: &K) -> Result<Option<CacheEntry<K, V>>> {
    let _guard = self.moves.lock();
    self.forget(key)
  }

  /// Looks `key` up in the hot tier, then in the cold tier.
  ///
  /// A cold hit is promoted only if, after the cold tier's policy has
  /// reordered it, the entry sits at the head of the cold tier.
  fn get(&self, key: &K) -> Result<Option<V>> {
    let _guard = self.moves.lock();
    if let Some(value) = self.hot.get(key)? {
      self.metrics.hot_hits.fetch_add(1, Ordering::Relaxed);
      return Ok(Some(value));
    }

    let Some(value) = self.cold.get(key)? else {
      self.metrics.misses.fetch_add(1, Ordering::Relaxed);
      return Ok(None);
    };
    self.metrics.cold_hits.fetch_add(1, Ordering::Relaxed);

    if self.cold.index_of(key)? == Some(0) {
      self.promote(key)?;
    }
    Ok(Some(value))
  }

  fn index_of(&self, key: &K) -> Result<Option<usize>> {
    let _guard = self.moves.lock();
    if let Some(rank) = self.hot.index_of(key)? {
      return Ok(Some(rank));
    }
    Ok(self.cold.index_of(key)?.map(|rank| rank + self.hot_capacity))
  }

  fn size(&self) -> Result<usize> {
    let _guard = self.moves.lock();
    Ok(self.hot.size()? + self.cold.size()?)
  }

  fn clear(&self) -> Result<()> {
    let _guard = self.moves.lock();
    self.hot.clear()?;
    self.cold.clear()
  }

  /// Sweeps both tiers, then backfills the hot tier from the cold head.
  ///
  /// Returns the number of expired entries removed.
  fn remove_expired(&self) -> Result<usize> {
    let _guard = self.moves.lock();
    let removed = self.hot.remove_expired()? + self.cold.remove_expired()?;
    self.metrics.expired.fetch_add(removed as u64, Ordering::Relaxed);

    if !self.cold.is_empty()? {
      self.backfill()?;
    }
    Ok(removed)
  }

  /// The hot tier's entries followed by the cold tier's.
  fn entries(&self) -> Result<Vec<CacheEntry<K, V>>> {
    let _guard = self.moves.lock();
    let mut entries = self.hot.entries()?;
    entries.extend(self.cold.entries()?);
    Ok(entries)
  }

  /// The hot tier's time-to-live, which new keys receive.
  fn ttl(&self) -> Duration {
    self.hot.ttl()
  }
}
