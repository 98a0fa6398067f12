use super::Cache;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory `Cache`, sufficient for tests and the scenarios in spec.md
/// §8. A production backend (a real TTL-backed KV store) is a future
/// adapter behind the same trait.
#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, Entry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self, key: &str) -> Option<String> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                self.entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.live(key))
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_ms: u64) -> Result<bool, String> {
        if self.live(key).is_some() {
            return Ok(false);
        }
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Instant::now() + Duration::from_millis(ttl_ms),
            },
        );
        Ok(true)
    }

    async fn set(&self, key: &str, value: &str, ttl_ms: u64) -> Result<(), String> {
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Instant::now() + Duration::from_millis(ttl_ms),
            },
        );
        Ok(())
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> Result<bool, String> {
        match self.entries.get(key) {
            Some(entry) if entry.value == expected => {
                drop(entry);
                self.entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
