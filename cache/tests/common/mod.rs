#![allow(dead_code)]

use fibre_tiered_cache::{
  InMemoryStore, PersistentStore, Policy, TieredCache, TieredCacheBuilder,
};
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

/// Long enough that nothing expires during an ordering test.
pub const LONG_TTL: Duration = Duration::from_secs(60);
pub const TINY_TTL: Duration = Duration::from_millis(150);
pub const SLEEP_MARGIN: Duration = Duration::from_millis(150);

pub type MemoryTiers = TieredCache<String, String, InMemoryStore<String, String>, InMemoryStore<String, String>>;

/// Routes `tracing` output through the test harness. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

pub fn key(i: usize) -> String {
  format!("key_{i}")
}

pub fn value(i: usize) -> String {
  format!("value_{i}")
}

pub fn memory_store(policy: Policy, ttl: Duration) -> InMemoryStore<String, String> {
  InMemoryStore::new(policy, ttl).unwrap()
}

pub fn persistent_store(dir: &Path, policy: Policy, ttl: Duration) -> PersistentStore<String, String> {
  PersistentStore::open(dir.join("cache.fc"), policy, ttl).unwrap()
}

/// A hot-in-memory, cold-on-disk cache inside a fresh temporary directory.
/// The directory must outlive the cache.
pub fn build_tiered(policy: Policy, ttl: Duration, hot: usize, cold: usize) -> (TempDir, TieredCache<String, String>) {
  init_tracing();
  let dir = tempfile::tempdir().unwrap();
  let cache = TieredCacheBuilder::new()
    .hot_capacity(hot)
    .cold_capacity(cold)
    .time_to_live(ttl)
    .policy(policy)
    .cold_path(dir.path().join("cold.fc"))
    .build()
    .unwrap();
  (dir, cache)
}

pub fn build_memory_tiered(policy: Policy, ttl: Duration, hot: usize, cold: usize) -> MemoryTiers {
  init_tracing();
  TieredCacheBuilder::new()
    .hot_capacity(hot)
    .cold_capacity(cold)
    .time_to_live(ttl)
    .policy(policy)
    .build_in_memory()
    .unwrap()
}
