mod common;

use common::*;
use fibre_tiered_cache::{CacheEntry, CacheError, InMemoryStore, Lfu, Policy, Store};

#[test]
fn test_add_then_get_returns_value() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  store.add(key(1), value(1)).unwrap();

  assert_eq!(store.get(&key(1)).unwrap(), Some(value(1)));
  assert_eq!(store.size().unwrap(), 1);
}

#[test]
fn test_get_missing_key_is_none() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  store.add(key(1), value(1)).unwrap();

  assert_eq!(store.get(&key(2)).unwrap(), None);
  assert_eq!(store.index_of(&key(2)).unwrap(), None);
  assert!(!store.contains_key(&key(2)).unwrap());
}

#[test]
fn test_add_appends_at_tail() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  for i in 0..5 {
    store.add(key(i), value(i)).unwrap();
  }

  for i in 0..5 {
    assert_eq!(store.index_of(&key(i)).unwrap(), Some(i));
  }
}

#[test]
fn test_lru_moves_hit_to_front() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  for i in 0..20 {
    store.add(key(i), value(i)).unwrap();
  }

  assert_eq!(store.get(&key(5)).unwrap(), Some(value(5)));
  assert_eq!(store.index_of(&key(5)).unwrap(), Some(0));
  assert_eq!(store.index_of(&key(0)).unwrap(), Some(1));
  assert_eq!(store.index_of(&key(6)).unwrap(), Some(6));
}

#[test]
fn test_lfu_moves_hit_one_step() {
  let store = InMemoryStore::<String, String>::new(Lfu, LONG_TTL).unwrap();
  for i in 0..20 {
    store.add(key(i), value(i)).unwrap();
  }

  store.get(&key(5)).unwrap();
  assert_eq!(store.index_of(&key(5)).unwrap(), Some(4));
  assert_eq!(store.index_of(&key(4)).unwrap(), Some(5));

  store.get(&key(5)).unwrap();
  assert_eq!(store.index_of(&key(5)).unwrap(), Some(3));

  store.get(&key(0)).unwrap();
  assert_eq!(store.index_of(&key(0)).unwrap(), Some(0));
}

#[test]
fn test_add_first_and_add_last() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  store.add(key(1), value(1)).unwrap();
  store.add_first(CacheEntry::new(key(0), value(0), LONG_TTL)).unwrap();
  store.add_last(CacheEntry::new(key(2), value(2), LONG_TTL)).unwrap();

  let keys: Vec<_> = store.entries().unwrap().into_iter().map(|e| e.key().clone()).collect();
  assert_eq!(keys, vec![key(0), key(1), key(2)]);
}

#[test]
fn test_remove_first_and_last() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  for i in 0..3 {
    store.add(key(i), value(i)).unwrap();
  }

  assert_eq!(store.remove_first().unwrap().key(), &key(0));
  assert_eq!(store.remove_last().unwrap().key(), &key(2));
  assert_eq!(store.size().unwrap(), 1);
  assert_eq!(store.index_of(&key(1)).unwrap(), Some(0));
}

#[test]
fn test_remove_from_empty_store_fails() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  assert!(matches!(store.remove_first(), Err(CacheError::EmptyStore)));
  assert!(matches!(store.remove_last(), Err(CacheError::EmptyStore)));
}

#[test]
fn test_add_existing_key_overwrites_in_place() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  for i in 0..3 {
    store.add(key(i), value(i)).unwrap();
  }
  store.add(key(1), "changed".to_string()).unwrap();

  assert_eq!(store.size().unwrap(), 3);
  assert_eq!(store.index_of(&key(1)).unwrap(), Some(1));
  assert_eq!(store.get(&key(1)).unwrap(), Some("changed".to_string()));
}

#[test]
fn test_add_first_existing_key_moves_it() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  for i in 0..3 {
    store.add(key(i), value(i)).unwrap();
  }
  store.add_first(CacheEntry::new(key(2), "moved".to_string(), LONG_TTL)).unwrap();

  assert_eq!(store.size().unwrap(), 3);
  assert_eq!(store.index_of(&key(2)).unwrap(), Some(0));
  assert_eq!(store.get(&key(2)).unwrap(), Some("moved".to_string()));
}

#[test]
fn test_remove_and_clear() {
  let store = memory_store(Policy::Lru, LONG_TTL);
  for i in 0..4 {
    store.add(key(i), value(i)).unwrap();
  }

  let removed = store.remove(&key(2)).unwrap().unwrap();
  assert_eq!(removed.into_parts(), (key(2), value(2)));
  assert!(store.remove(&key(2)).unwrap().is_none());
  assert_eq!(store.index_of(&key(3)).unwrap(), Some(2));

  store.clear().unwrap();
  assert!(store.is_empty().unwrap());
  assert_eq!(store.get(&key(0)).unwrap(), None);
}

#[test]
fn test_ttl_is_reported() {
  let store = memory_store(Policy::Lfu, LONG_TTL);
  assert_eq!(store.ttl(), LONG_TTL);
}
