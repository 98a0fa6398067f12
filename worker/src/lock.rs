//! Distributed semaphore (spec.md §4.1): named mutual exclusion backed by
//! the cache's atomic `set-if-absent` with TTL, plus an in-process mutex
//! per name to cut cache round-trips between local callers racing for the
//! same name.

use crate::cache::Cache;
use crate::error::WorkerError;
use dashmap::DashMap;
use futures::FutureExt;
use rand::RngCore;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

pub struct DistributedLock<C: Cache> {
    cache: Arc<C>,
    in_process: DashMap<String, Arc<AsyncMutex<()>>>,
    default_ttl_ms: u64,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl<C: Cache> DistributedLock<C> {
    pub fn new(cache: Arc<C>, default_ttl_ms: u64, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        DistributedLock {
            cache,
            in_process: DashMap::new(),
            default_ttl_ms,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    fn generate_lock_id() -> String {
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Runs `f` with `name` held, retrying acquisition with backoff until
    /// `timeout` elapses. The in-process mutex is taken first so that two
    /// local callers racing for the same name don't both hit the cache.
    pub async fn execute<F, Fut, R>(&self, name: &str, timeout: Duration, f: F) -> Result<R, WorkerError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let mutex = self
            .in_process
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _in_process_guard = mutex.lock().await;

        let lock_id = Self::acquire(&self.cache, name, timeout, self.default_ttl_ms, self.initial_backoff_ms, self.max_backoff_ms).await?;
        trace!("lock '{name}' acquired as {lock_id}");

        let outcome = AssertUnwindSafe(f()).catch_unwind().await;

        let released = self
            .cache
            .delete_if_equals(name, &lock_id)
            .await
            .map_err(WorkerError::Cache)?;
        if released {
            self.in_process.remove(name);
            trace!("lock '{name}' released");
        } else {
            warn!("lock '{name}' release skipped: current holder does not match {lock_id}");
        }

        match outcome {
            // A mismatched release means our lock_id was no longer the
            // recognized owner by the time fn finished (spec.md §4.1:
            // "log and return failure") — the exclusivity fn ran under is
            // no longer guaranteed to have held through to completion, so
            // this surfaces as a failure rather than a silent success.
            Ok(value) if released => Ok(value),
            Ok(_) => Err(WorkerError::LockStolen { name: name.to_owned() }),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn acquire(
        cache: &C,
        name: &str,
        timeout: Duration,
        default_ttl_ms: u64,
        initial_backoff_ms: u64,
        max_backoff_ms: u64,
    ) -> Result<String, WorkerError> {
        let deadline = Instant::now() + timeout;
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let lock_id = Self::generate_lock_id();
            if cache
                .set_if_absent(name, &lock_id, default_ttl_ms)
                .await
                .map_err(WorkerError::Cache)?
            {
                return Ok(lock_id);
            }
            if Instant::now() >= deadline {
                return Err(WorkerError::LockTimeout {
                    name: name.to_owned(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            let backoff = initial_backoff_ms.saturating_mul(attempt as u64).min(max_backoff_ms);
            tokio::time::sleep(Duration::from_millis(backoff)).await;
        }
    }
}
