//! A pluggable, thread-safe key-value cache with an in-memory tier, a
//! file-backed tier and a two-tier composite that moves entries between them.
//!
//! # Features
//! - **One storage contract**: [`Store`] is implemented by [`InMemoryStore`],
//!   [`PersistentStore`] and [`TieredCache`] itself.
//! - **Time-to-Live**: every entry carries an absolute deadline. Expiry is
//!   lazy: each operation sweeps expired entries before doing its work.
//! - **Swappable reordering**: an [`EvictionPolicy`] reorders a store on every
//!   hit. [`Policy::Lru`] moves the entry to the front, [`Policy::Lfu`] moves it
//!   one step toward the front. Stores evict from the tail.
//! - **Two tiers**: [`TieredCache`] demotes the hot tail into the cold tier when
//!   the hot tier is full and promotes cold hits that reach the cold head.
//! - **Persistence**: the cold tier can be a single bincode file, rewritten
//!   atomically on every change.
//!
//! ```no_run
//! use fibre_tiered_cache::{Policy, Store, TieredCacheBuilder};
//! use std::time::Duration;
//!
//! let cache = TieredCacheBuilder::<String, String>::new()
//!   .hot_capacity(10)
//!   .cold_capacity(100)
//!   .time_to_live(Duration::from_secs(60))
//!   .policy(Policy::Lru)
//!   .cold_path("/tmp/fibre-tiered-cache/cold.bin")
//!   .build()?;
//!
//! cache.add("key".to_string(), "value".to_string())?;
//! assert_eq!(cache.get(&"key".to_string())?, Some("value".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Public modules that form the API
pub mod builder;
pub mod entry;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod store;
pub mod tiered;

// Internal, crate-only modules
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::TieredCacheBuilder;
pub use entry::CacheEntry;
pub use error::{BuildError, CacheError, Result};
pub use metrics::MetricsSnapshot;
pub use policy::{EvictionPolicy, Lfu, Lru, Policy};
pub use store::{InMemoryStore, PersistentStore, Store};
pub use tiered::{Tier, TieredCache};
