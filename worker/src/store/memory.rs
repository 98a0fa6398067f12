use super::DocumentStore;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::RwLock;

/// In-memory `DocumentStore`, sufficient for tests and the scenarios in
/// spec.md §8. Production backends (a real document database) are future
/// adapters behind the same trait.
#[derive(Default)]
pub struct InMemoryStore {
    collections: DashMap<String, RwLock<DashMap<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> dashmap::mapref::one::Ref<'_, String, RwLock<DashMap<String, Value>>> {
        if !self.collections.contains_key(name) {
            self.collections
                .entry(name.to_owned())
                .or_insert_with(|| RwLock::new(DashMap::new()));
        }
        self.collections.get(name).expect("just inserted")
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, String> {
        let col = self.collection(collection);
        let guard = col.read().await;
        Ok(guard.get(id).map(|v| v.clone()))
    }

    async fn put(&self, collection: &str, id: &str, value: Value) -> Result<(), String> {
        let col = self.collection(collection);
        let guard = col.write().await;
        guard.insert(id.to_owned(), value);
        Ok(())
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Value>, String> {
        let col = self.collection(collection);
        let guard = col.read().await;
        Ok(guard.iter().map(|entry| entry.value().clone()).collect())
    }
}
