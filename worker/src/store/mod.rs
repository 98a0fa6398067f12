//! The document store: an out-of-scope collaborator (spec.md §1). Modeled
//! as a KV+collection API with atomic single-document `get`/`put` and a
//! `scan` primitive callers filter in-process — every CORE algorithm that
//! needs a conditional update (block append, mining verify) already runs
//! inside a named [`crate::lock::DistributedLock`], so the store itself
//! only needs to guarantee that a single `get`/`put` is atomic.

mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use serde_json::Value;

pub const COLLECTION_ELEMENTS: &str = "elements";
pub const COLLECTION_BALANCES: &str = "balances";
pub const COLLECTION_SEQUENCES: &str = "sequences";
pub const COLLECTION_BLOCKS: &str = "blocks";

pub fn ledger_collection(shard: u64) -> String {
    format!("ledger_{shard}")
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, String>;

    async fn put(&self, collection: &str, id: &str, value: Value) -> Result<(), String>;

    /// All documents currently in `collection`, for in-process filtering
    /// (idempotency-by-hash lookups, scanning for the open block, etc).
    async fn scan(&self, collection: &str) -> Result<Vec<Value>, String>;
}
