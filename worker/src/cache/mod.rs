//! The cache: an out-of-scope collaborator (spec.md §1). A TTL-backed KV
//! store with an atomic `set-if-absent`, used for both lock tokens
//! ([`crate::lock::DistributedLock`]) and response envelopes
//! ([`crate::dispatcher::Dispatcher`]).

mod memory;

pub use memory::InMemoryCache;

use async_trait::async_trait;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, String>;

    /// `SET key value EX ttl_ms NX` — stores `value` only if `key` is
    /// absent or expired. Returns `true` if the value was stored.
    async fn set_if_absent(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool, String>;

    /// Unconditional `SET key value EX ttl_ms`.
    async fn set(&self, key: &str, value: &str, ttl_ms: u64) -> Result<(), String>;

    /// Deletes `key` only if its current value equals `expected`. Used by
    /// `DistributedLock::release` so a stolen or expired lock is never
    /// deleted out from under its new holder.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, String>;
}
