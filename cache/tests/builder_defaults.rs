mod common;

use common::*;
use fibre_tiered_cache::{
  BuildError, InMemoryStore, Lfu, PersistentStore, Policy, Store, TieredCache, TieredCacheBuilder,
};
use std::fs;
use std::time::Duration;

fn complete() -> TieredCacheBuilder<String, String> {
  TieredCacheBuilder::new()
    .hot_capacity(4)
    .cold_capacity(4)
    .time_to_live(LONG_TTL)
}

#[test]
fn test_zero_hot_capacity_is_rejected() {
  let result = complete().hot_capacity(0).build_in_memory();
  assert_eq!(result.err(), Some(BuildError::ZeroHotCapacity));
}

#[test]
fn test_zero_cold_capacity_is_rejected() {
  let result = complete().cold_capacity(0).build_in_memory();
  assert_eq!(result.err(), Some(BuildError::ZeroColdCapacity));
}

#[test]
fn test_missing_time_to_live_is_rejected() {
  let result = TieredCacheBuilder::<String, String>::new()
    .hot_capacity(4)
    .cold_capacity(4)
    .build_in_memory();
  assert_eq!(result.err(), Some(BuildError::ZeroTimeToLive));
}

#[test]
fn test_sub_millisecond_time_to_live_is_rejected() {
  let result = complete().time_to_live(Duration::from_micros(500)).build_in_memory();
  assert_eq!(result.err(), Some(BuildError::ZeroTimeToLive));
}

#[test]
fn test_persistent_build_requires_path() {
  let result = complete().build();
  assert_eq!(result.err(), Some(BuildError::MissingColdPath));
}

#[test]
fn test_build_in_memory_ignores_cold_path() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("unused.fc");
  let cache = complete().cold_path(&path).build_in_memory().unwrap();

  cache.add(key(1), value(1)).unwrap();
  assert_eq!(cache.get(&key(1)).unwrap(), Some(value(1)));
  assert!(!path.exists());
}

#[test]
fn test_build_creates_cold_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("cold.fc");
  let cache = complete().policy(Policy::Lfu).cold_path(&path).build().unwrap();

  assert!(path.exists());
  assert_eq!(cache.cold().path(), path.as_path());
  assert_eq!(cache.hot_capacity(), 4);
  assert_eq!(cache.cold_capacity(), 4);
  assert_eq!(cache.ttl(), LONG_TTL);
}

#[test]
fn test_directory_as_cold_path_is_a_storage_error() {
  let dir = tempfile::tempdir().unwrap();
  let result = complete().cold_path(dir.path()).build();
  assert!(matches!(result, Err(BuildError::Storage { .. })));
}

#[test]
fn test_file_as_parent_directory_is_a_storage_error() {
  let dir = tempfile::tempdir().unwrap();
  let blocker = dir.path().join("blocker");
  fs::write(&blocker, b"").unwrap();

  let result = PersistentStore::<String, String>::open(blocker.join("cache.fc"), Policy::Lru, LONG_TTL);
  match result {
    Err(BuildError::Storage { path, .. }) => assert_eq!(path, blocker.join("cache.fc")),
    other => panic!("expected a storage error, got {other:?}"),
  }
}

#[test]
fn test_stores_reject_sub_millisecond_time_to_live() {
  let dir = tempfile::tempdir().unwrap();
  assert_eq!(
    InMemoryStore::<String, String>::new(Policy::Lru, Duration::ZERO).err(),
    Some(BuildError::ZeroTimeToLive)
  );
  assert_eq!(
    PersistentStore::<String, String>::open(dir.path().join("c.fc"), Policy::Lru, Duration::ZERO).err(),
    Some(BuildError::ZeroTimeToLive)
  );
}

#[test]
fn test_direct_composition_validates_capacities() {
  let hot = memory_store(Policy::Lru, LONG_TTL);
  let cold = memory_store(Policy::Lru, LONG_TTL);
  let result = TieredCache::<String, String, _, _>::new(hot, cold, 0, 1);
  assert_eq!(result.err(), Some(BuildError::ZeroHotCapacity));

  let hot = InMemoryStore::<String, String>::new(Lfu, LONG_TTL).unwrap();
  let cold = memory_store(Policy::Lfu, LONG_TTL);
  let cache = TieredCache::<String, String, _, _>::new(hot, cold, 2, 2).unwrap();
  cache.add(key(0), value(0)).unwrap();
  assert_eq!(cache.size().unwrap(), 1);
}

#[test]
fn test_build_error_messages() {
  assert_eq!(BuildError::ZeroHotCapacity.to_string(), "hot tier capacity cannot be zero");
  assert_eq!(
    BuildError::MissingColdPath.to_string(),
    "a persistent cold tier requires a file path"
  );
}
