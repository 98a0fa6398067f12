use super::{Envelope, QueueConsumer};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// In-memory `QueueConsumer`, backed by a FIFO. Tests push envelopes with
/// [`InMemoryQueue::push`] before handing the queue to a worker.
#[derive(Default)]
pub struct InMemoryQueue {
    records: Mutex<std::collections::VecDeque<Envelope>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, envelope: Envelope) {
        self.records.lock().await.push_back(envelope);
    }
}

#[async_trait]
impl QueueConsumer for InMemoryQueue {
    async fn recv(&self) -> Result<Option<Envelope>, String> {
        Ok(self.records.lock().await.pop_front())
    }
}
