use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// A thread-safe, internal metrics collector for a tiered cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookups ---
  pub(crate) hot_hits: CachePadded<AtomicU64>,
  pub(crate) cold_hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,

  // --- Writes ---
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) updates: CachePadded<AtomicU64>,

  // --- Tier movement ---
  pub(crate) promotions: CachePadded<AtomicU64>,
  pub(crate) demotions: CachePadded<AtomicU64>,
  pub(crate) backfilled: CachePadded<AtomicU64>,

  // --- Removals ---
  pub(crate) evicted_by_capacity: CachePadded<AtomicU64>,
  pub(crate) expired: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hot_hits: CachePadded::new(AtomicU64::new(0)),
      cold_hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      updates: CachePadded::new(AtomicU64::new(0)),
      promotions: CachePadded::new(AtomicU64::new(0)),
      demotions: CachePadded::new(AtomicU64::new(0)),
      backfilled: CachePadded::new(AtomicU64::new(0)),
      evicted_by_capacity: CachePadded::new(AtomicU64::new(0)),
      expired: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hot_hits = self.hot_hits.load(Ordering::Relaxed);
    let cold_hits = self.cold_hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let total_lookups = hot_hits + cold_hits + misses;

    MetricsSnapshot {
      hot_hits,
      cold_hits,
      misses,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        (hot_hits + cold_hits) as f64 / total_lookups as f64
      },
      inserts: self.inserts.load(Ordering::Relaxed),
      updates: self.updates.load(Ordering::Relaxed),
      promotions: self.promotions.load(Ordering::Relaxed),
      demotions: self.demotions.load(Ordering::Relaxed),
      backfilled: self.backfilled.load(Ordering::Relaxed),
      evicted_by_capacity: self.evicted_by_capacity.load(Ordering::Relaxed),
      expired: self.expired.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of a tiered cache's metrics.
#[derive(Clone)]
pub struct MetricsSnapshot {
  /// Lookups answered by the hot tier.
  pub hot_hits: u64,
  /// Lookups answered by the cold tier.
  pub cold_hits: u64,
  /// Lookups that found nothing in either tier.
  pub misses: u64,
  /// (hot_hits + cold_hits) / all lookups.
  pub hit_ratio: f64,
  /// New keys added.
  pub inserts: u64,
  /// Adds that overwrote a key already present in one of the tiers.
  pub updates: u64,
  /// Entries moved from the cold tier to the hot tier on a read.
  pub promotions: u64,
  /// Entries moved from the hot tier to the cold tier to make room.
  pub demotions: u64,
  /// Entries moved back into the hot tier after an expiry sweep.
  pub backfilled: u64,
  /// Entries dropped from the cold tier because it was full.
  pub evicted_by_capacity: u64,
  /// Expired entries removed through `remove_expired`.
  pub expired: u64,
  /// The number of seconds the cache has been running.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hot_hits", &self.hot_hits)
      .field("cold_hits", &self.cold_hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("inserts", &self.inserts)
      .field("updates", &self.updates)
      .field("promotions", &self.promotions)
      .field("demotions", &self.demotions)
      .field("backfilled", &self.backfilled)
      .field("evicted_by_capacity", &self.evicted_by_capacity)
      .field("expired", &self.expired)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
