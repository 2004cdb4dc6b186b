use crate::error::BuildError;
use crate::policy::{EvictionPolicy, Policy};
use crate::store::{InMemoryStore, PersistentStore};
use crate::tiered::TieredCache;

use core::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A builder for creating [`TieredCache`] instances.
///
/// Capacities and the time-to-live have no defaults and must be set.
/// [`build`](Self::build) fails on a missing or zero value.
pub struct TieredCacheBuilder<K, V> {
  pub(crate) hot_capacity: usize,
  pub(crate) cold_capacity: usize,
  pub(crate) time_to_live: Option<Duration>,
  pub(crate) cold_path: Option<PathBuf>,
  policy: Arc<dyn EvictionPolicy<K, V>>,
  _marker: PhantomData<fn() -> (K, V)>,
}

// Manual Debug implementation for TieredCacheBuilder.
impl<K, V> fmt::Debug for TieredCacheBuilder<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TieredCacheBuilder")
      .field("hot_capacity", &self.hot_capacity)
      .field("cold_capacity", &self.cold_capacity)
      .field("time_to_live", &self.time_to_live)
      .field("cold_path", &self.cold_path)
      .finish_non_exhaustive()
  }
}

impl<K, V> Default for TieredCacheBuilder<K, V> {
  fn default() -> Self {
    Self {
      hot_capacity: 0,
      cold_capacity: 0,
      time_to_live: None,
      cold_path: None,
      policy: Arc::new(Policy::default()),
      _marker: PhantomData,
    }
  }
}

impl<K, V> TieredCacheBuilder<K, V> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets the maximum number of entries in the hot tier.
  pub fn hot_capacity(mut self, capacity: usize) -> Self {
    self.hot_capacity = capacity;
    self
  }

  /// Sets the maximum number of entries in the cold tier.
  pub fn cold_capacity(mut self, capacity: usize) -> Self {
    self.cold_capacity = capacity;
    self
  }

  /// Sets the time-to-live applied to every entry added through the cache.
  ///
  /// Deadlines have millisecond resolution.
  pub fn time_to_live(mut self, duration: Duration) -> Self {
    self.time_to_live = Some(duration);
    self
  }

  /// Sets the eviction policy used by both tiers.
  ///
  /// Defaults to [`Policy::Lru`].
  pub fn policy<P>(mut self, policy: P) -> Self
  where
    P: EvictionPolicy<K, V> + 'static,
  {
    self.policy = Arc::new(policy);
    self
  }

  /// Sets the file backing the persistent cold tier.
  pub fn cold_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.cold_path = Some(path.into());
    self
  }

  pub(crate) fn validate(&self) -> Result<Duration, BuildError> {
    if self.hot_capacity == 0 {
      return Err(BuildError::ZeroHotCapacity);
    }
    if self.cold_capacity == 0 {
      return Err(BuildError::ZeroColdCapacity);
    }
    match self.time_to_live {
      Some(ttl) if ttl.as_millis() > 0 => Ok(ttl),
      _ => Err(BuildError::ZeroTimeToLive),
    }
  }

  /// Builds a cache with an in-memory hot tier over a persistent cold tier.
  pub fn build(self) -> Result<TieredCache<K, V>, BuildError> {
    let ttl = self.validate()?;
    let path = self.cold_path.ok_or(BuildError::MissingColdPath)?;

    let hot = InMemoryStore::with_shared_policy(self.policy.clone(), ttl)?;
    let cold = PersistentStore::with_shared_policy(path, self.policy, ttl)?;
    TieredCache::new(hot, cold, self.hot_capacity, self.cold_capacity)
  }

  /// Builds a cache whose tiers are both held in memory.
  ///
  /// Any configured `cold_path` is ignored.
  pub fn build_in_memory(
    self,
  ) -> Result<TieredCache<K, V, InMemoryStore<K, V>, InMemoryStore<K, V>>, BuildError> {
    let ttl = self.validate()?;

    let hot = InMemoryStore::with_shared_policy(self.policy.clone(), ttl)?;
    let cold = InMemoryStore::with_shared_policy(self.policy, ttl)?;
    TieredCache::new(hot, cold, self.hot_capacity, self.cold_capacity)
  }
}
