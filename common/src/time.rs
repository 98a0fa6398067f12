// Time types and helpers used across the worker.
//
// This is a single-writer ledger: there is no cross-node consensus to keep
// deterministic, so wall-clock time is safe to use directly for block
// numbering and ledger sharding, unlike in a replicated chain where every
// node must derive the same value independently of its own clock.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Millisecond-resolution timestamp.
pub type TimestampMillis = u64;

/// Second-resolution timestamp.
pub type TimestampSeconds = u64;

/// One week, in milliseconds. Used to derive the ledger shard number.
pub const MILLIS_PER_WEEK: u64 = 7 * 24 * 60 * 60 * 1000;

#[inline]
pub fn get_current_time() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
}

/// Current time in whole seconds since the epoch.
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}

/// Current time in whole milliseconds since the epoch.
///
/// Cast to `u64` is safe: this overflows in the year 584,942,417 AD.
pub fn get_current_time_in_millis() -> TimestampMillis {
    get_current_time().as_millis() as TimestampMillis
}

/// The ledger shard (week number) a timestamp falls into, counted from the
/// unix epoch. Used to name the `ledger_<shard>` transaction bucket.
pub fn week_of(timestamp_millis: TimestampMillis) -> u64 {
    timestamp_millis / MILLIS_PER_WEEK
}
