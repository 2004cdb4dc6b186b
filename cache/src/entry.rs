use crate::time;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A key-value pair stored in the cache, together with its expiry deadline.
///
/// Entries are immutable once built. The only thing that changes over their
/// lifetime is the position a store keeps them at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<K, V> {
  key: K,
  value: V,
  /// Wall-clock deadline in milliseconds since the Unix epoch.
  expires_at: u64,
}

impl<K, V> CacheEntry<K, V> {
  /// Creates an entry that expires `ttl` from now.
  pub fn new(key: K, value: V, ttl: Duration) -> Self {
    Self {
      key,
      value,
      expires_at: time::deadline_after(ttl),
    }
  }

  /// Creates an entry from a pre-calculated deadline (milliseconds since the
  /// Unix epoch).
  pub fn with_expiry(key: K, value: V, expires_at: u64) -> Self {
    Self {
      key,
      value,
      expires_at,
    }
  }

  #[inline]
  pub fn key(&self) -> &K {
    &self.key
  }

  #[inline]
  pub fn value(&self) -> &V {
    &self.value
  }

  /// The expiry deadline in milliseconds since the Unix epoch.
  #[inline]
  pub fn expires_at(&self) -> u64 {
    self.expires_at
  }

  /// Checks if the deadline has passed.
  #[inline]
  pub fn is_expired(&self) -> bool {
    self.is_expired_at(time::now_millis())
  }

  /// Checks if the deadline lies strictly before `now_millis`.
  #[inline]
  pub fn is_expired_at(&self, now_millis: u64) -> bool {
    self.expires_at < now_millis
  }

  pub fn into_parts(self) -> (K, V) {
    (self.key, self.value)
  }
}
