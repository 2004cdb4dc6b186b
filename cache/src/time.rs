use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Expiry timestamps are wall-clock milliseconds since the Unix epoch so that
// entries read back from a persisted file keep their original deadline.

/// The current wall-clock time in milliseconds since the Unix epoch.
#[inline]
pub(crate) fn now_millis() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map_or(0, |d| d.as_millis() as u64)
}

/// The absolute deadline `ttl` from now, saturating at `u64::MAX`.
#[inline]
pub(crate) fn deadline_after(ttl: Duration) -> u64 {
  let ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
  now_millis().saturating_add(ttl_millis)
}
