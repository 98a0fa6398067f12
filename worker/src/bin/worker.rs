//! Entrypoint: parses configuration, initializes logging, runs genesis
//! bootstrap, and starts the queue worker pool.

use clap::Parser;
use log::info;
use norsh_worker::cache::InMemoryCache;
use norsh_worker::config::WorkerConfig;
use norsh_worker::logging;
use norsh_worker::pool::WorkerPool;
use norsh_worker::queue::InMemoryQueue;
use norsh_worker::services::Services;
use norsh_worker::store::InMemoryStore;
use norsh_worker::bootstrap;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WorkerConfig::parse();
    logging::init(&config.log_level, config.log_dir.as_deref())?;

    // The document store, cache, and queue transport are out-of-scope
    // collaborators (spec.md §1); this binary wires the in-memory doubles
    // since no production backend is specified.
    let store = Arc::new(InMemoryStore::new());
    let cache = Arc::new(InMemoryCache::new());
    let services = Services::new(store, cache, config);

    if bootstrap::bootstrap(&services)
        .await
        .map_err(|e| anyhow::anyhow!("bootstrap failed: {e}"))?
    {
        info!("genesis bootstrap complete");
    } else {
        info!("bootstrap skipped: already initialized");
    }

    let queue = Arc::new(InMemoryQueue::new());
    let pool = WorkerPool::new(services, queue);
    let handles = pool.spawn();
    info!("worker pool started");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining in-flight work");
    pool.shutdown(handles).await;

    Ok(())
}
