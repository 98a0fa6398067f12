//! Queue worker pool (spec.md §5): a fixed number of tasks consume the
//! queue and hand each envelope to the [`crate::dispatcher::Dispatcher`].
//! Graceful shutdown wakes every worker and allows up to 5s to drain.

use crate::cache::Cache;
use crate::dispatcher::Dispatcher;
use crate::queue::QueueConsumer;
use crate::services::Services;
use crate::store::DocumentStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_POLL_BACKOFF: Duration = Duration::from_millis(50);
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(200);

pub struct WorkerPool<S: DocumentStore, C: Cache, Q: QueueConsumer> {
    services: Services<S, C>,
    queue: Arc<Q>,
    thread_count: usize,
    shutdown: Arc<Notify>,
    shutting_down: Arc<AtomicBool>,
}

impl<S, C, Q> WorkerPool<S, C, Q>
where
    S: DocumentStore + 'static,
    C: Cache + 'static,
    Q: QueueConsumer + 'static,
{
    pub fn new(services: Services<S, C>, queue: Arc<Q>) -> Self {
        let thread_count = services.config.queue_consumer_thread_pool;
        WorkerPool {
            services,
            queue,
            thread_count,
            shutdown: Arc::new(Notify::new()),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns `queueConsumerThreadPool` worker tasks and returns their
    /// handles for `shutdown` to drain.
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        (0..self.thread_count)
            .map(|id| {
                let services = self.services.clone();
                let queue = self.queue.clone();
                let shutdown = self.shutdown.clone();
                let shutting_down = self.shutting_down.clone();
                tokio::spawn(run_worker(id, services, queue, shutdown, shutting_down))
            })
            .collect()
    }

    /// Wakes every worker and waits up to 5s for them to drain in-flight
    /// work before forcing termination.
    pub async fn shutdown(&self, handles: Vec<JoinHandle<()>>) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.shutdown.notify_waiters();

        let drain = futures::future::join_all(handles);
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            warn!("worker pool drain exceeded {DRAIN_TIMEOUT:?}, forcing termination");
        }
    }
}

async fn run_worker<S, C, Q>(
    id: usize,
    services: Services<S, C>,
    queue: Arc<Q>,
    shutdown: Arc<Notify>,
    shutting_down: Arc<AtomicBool>,
) where
    S: DocumentStore + 'static,
    C: Cache + 'static,
    Q: QueueConsumer + 'static,
{
    let dispatcher = Dispatcher::new(services);
    loop {
        if shutting_down.load(Ordering::SeqCst) {
            debug!("worker {id} shutting down");
            return;
        }

        tokio::select! {
            _ = shutdown.notified() => {
                debug!("worker {id} received shutdown signal");
                return;
            }
            result = queue.recv() => {
                match result {
                    Ok(Some(envelope)) => {
                        let request_id = envelope.request_id.clone();
                        if let Err(e) = dispatcher.dispatch(envelope).await {
                            error!("worker {id} dispatch error for request '{request_id}': {e}");
                        }
                    }
                    Ok(None) => tokio::time::sleep(IDLE_POLL_BACKOFF).await,
                    Err(e) => {
                        error!("worker {id} queue recv error: {e}");
                        tokio::time::sleep(RECV_ERROR_BACKOFF).await;
                    }
                }
            }
        }
    }
}
