use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when building a store or a tiered cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// The hot tier was configured with a capacity of zero.
  #[error("hot tier capacity cannot be zero")]
  ZeroHotCapacity,
  /// The cold tier was configured with a capacity of zero.
  #[error("cold tier capacity cannot be zero")]
  ZeroColdCapacity,
  /// No time-to-live was configured, or it is shorter than one millisecond.
  #[error("time-to-live must be at least one millisecond")]
  ZeroTimeToLive,
  /// A persistent cold tier was requested without a file path.
  #[error("a persistent cold tier requires a file path")]
  MissingColdPath,
  /// The backing file of a persistent store could not be created or opened.
  #[error("cannot open cache file '{}': {reason}", path.display())]
  Storage { path: PathBuf, reason: String },
}

/// Errors returned by store and cache operations.
///
/// A missing key is never an error; lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum CacheError {
  /// `remove_first`/`remove_last` was called on a store without live entries.
  #[error("store is empty")]
  EmptyStore,

  /// The persisted image could not be written. The file still holds the
  /// state it had before the failed operation.
  #[error("failed to persist cache file '{}': {source}", path.display())]
  Persist {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The entries could not be encoded for persistence.
  #[error("failed to encode cache entries: {0}")]
  Encode(#[from] bincode::Error),
}

/// A specialized `Result` type for cache operations.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;
