//! Explicit dependency set every handler runs against (spec.md §9 design
//! note: no package-global mutable state — handlers and the dispatcher
//! are always passed a `Services` value).

use crate::balance::BalanceService;
use crate::cache::Cache;
use crate::config::WorkerConfig;
use crate::lock::DistributedLock;
use crate::sequence::SequenceStore;
use crate::store::DocumentStore;
use std::sync::Arc;
use std::time::Duration;

pub struct Services<S: DocumentStore, C: Cache> {
    pub store: Arc<S>,
    pub cache: Arc<C>,
    pub lock: Arc<DistributedLock<C>>,
    pub sequences: Arc<SequenceStore<S>>,
    pub balances: Arc<BalanceService<S>>,
    pub config: Arc<WorkerConfig>,
}

impl<S: DocumentStore, C: Cache> Services<S, C> {
    pub fn new(store: Arc<S>, cache: Arc<C>, config: WorkerConfig) -> Self {
        let config = Arc::new(config);
        let lock = Arc::new(DistributedLock::new(
            cache.clone(),
            config.semaphore_lock_timeout_ms,
            config.thread_initial_backoff_ms,
            config.thread_max_backoff_ms,
        ));
        let sequences = Arc::new(SequenceStore::new(store.clone()));
        let balances = Arc::new(BalanceService::new(store.clone()));
        Services {
            store,
            cache,
            lock,
            sequences,
            balances,
            config,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.config.semaphore_lock_timeout_ms)
    }
}

impl<S: DocumentStore, C: Cache> Clone for Services<S, C> {
    fn clone(&self) -> Self {
        Services {
            store: self.store.clone(),
            cache: self.cache.clone(),
            lock: self.lock.clone(),
            sequences: self.sequences.clone(),
            balances: self.balances.clone(),
            config: self.config.clone(),
        }
    }
}
