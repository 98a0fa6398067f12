//! Dynamic sequence service (spec.md §4.2): a per-key monotonic counter
//! plus an auxiliary `data` pointer, used to chain `previousId` across
//! elements, blocks, and per-element transaction streams.

use crate::error::WorkerError;
use crate::model::DynamicSequence;
use crate::store::{DocumentStore, COLLECTION_SEQUENCES};
use std::sync::Arc;

pub struct SequenceStore<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> SequenceStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        SequenceStore { store }
    }

    /// Returns the sequence, creating `{sequence: 0, data: ""}` when
    /// absent. This is the only operation guaranteed to observe consistent
    /// `data` without an enclosing lock.
    pub async fn get(&self, id: &str) -> Result<DynamicSequence, WorkerError> {
        match self
            .store
            .get(COLLECTION_SEQUENCES, id)
            .await
            .map_err(WorkerError::Store)?
        {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))
            }
            None => Ok(DynamicSequence::empty(id)),
        }
    }

    /// Sets `sequence`/`data` when provided; `Some("")` for `data` unsets
    /// it. Reads-then-writes, so callers needing atomicity with a read
    /// must hold the relevant named lock.
    pub async fn set(
        &self,
        id: &str,
        sequence: Option<u64>,
        data: Option<&str>,
    ) -> Result<DynamicSequence, WorkerError> {
        let mut seq = self.get(id).await?;
        if let Some(sequence) = sequence {
            seq.sequence = sequence;
        }
        if let Some(data) = data {
            seq.data = data.to_owned();
        }
        self.persist(&seq).await?;
        Ok(seq)
    }

    /// Atomic `sequence += 1` with optional `data` set/unset.
    pub async fn inc(&self, id: &str, data: Option<&str>) -> Result<DynamicSequence, WorkerError> {
        let mut seq = self.get(id).await?;
        seq.sequence += 1;
        if let Some(data) = data {
            seq.data = data.to_owned();
        }
        self.persist(&seq).await?;
        Ok(seq)
    }

    async fn persist(&self, seq: &DynamicSequence) -> Result<(), WorkerError> {
        let value = serde_json::to_value(seq).map_err(|e| WorkerError::Store(e.to_string()))?;
        self.store
            .put(COLLECTION_SEQUENCES, &seq.id, value)
            .await
            .map_err(WorkerError::Store)
    }
}
