//! Block assembly and closure (spec.md §4.5): the block timeline. Exactly
//! one `Block` document exists per `number`; opening a new one always
//! closes its predecessor as a required side effect.

use crate::cache::Cache;
use crate::error::WorkerError;
use crate::model::{Block, BlockTransactionRef, Transaction};
use crate::services::Services;
use crate::store::{DocumentStore, COLLECTION_BLOCKS};
use norsh_common::config::BLOCK_WINDOW_MILLIS;
use norsh_common::crypto::hash_concat;
use norsh_common::money::Money;
use norsh_common::time::get_current_time_in_millis;

const BLOCKCHAIN_LOCK: &str = "blockchain";
const BLOCK_ID_SEQUENCE: &str = "blockchain-block-id";
const MAX_APPEND_ATTEMPTS: u32 = 5;

pub struct BlockService<S: DocumentStore, C: Cache> {
    services: Services<S, C>,
}

impl<S: DocumentStore, C: Cache> BlockService<S, C> {
    pub fn new(services: Services<S, C>) -> Self {
        BlockService { services }
    }

    pub fn current_block_number() -> u64 {
        get_current_time_in_millis() / BLOCK_WINDOW_MILLIS
    }

    /// `addTransactionToBlock`. Runs the whole algorithm under the
    /// `"blockchain"` lock; the retry loop is bounded (design note §9:
    /// the original's unbounded retry is replaced with a cap) since under
    /// the lock there is never more than one writer to race against.
    pub async fn add_transaction_to_block(&self, tx: &Transaction) -> Result<u64, WorkerError> {
        let timeout = self.services.lock_timeout();
        let services = self.services.clone();
        let tx_ref = BlockTransactionRef {
            id: tx.id.clone(),
            ledger: tx.ledger.clone(),
            element: tx.element.clone(),
            tax: tx.total_tax,
            privacy: tx.privacy,
            volume: if tx.privacy { Some(tx.total) } else { None },
        };

        self.services
            .lock
            .execute(BLOCKCHAIN_LOCK, timeout, move || async move {
                append_with_retry(&services, tx_ref).await
            })
            .await?
    }

    pub async fn find_block_by_transaction_id(&self, tx_id: &str) -> Result<Option<Block>, WorkerError> {
        let blocks = self.services.store.scan(COLLECTION_BLOCKS).await.map_err(WorkerError::Store)?;
        for value in blocks {
            let block: Block = serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;
            if block.transactions.iter().any(|t| t.id == tx_id) {
                return Ok(Some(block));
            }
        }
        Ok(None)
    }

    /// Promotes the block at `height + 1` to mineable when it is closed
    /// and still lacks a `previousBlockHash`.
    pub async fn release_next_block_for_mining(&self, height: u64, previous_block_hash: &str) -> Result<bool, WorkerError> {
        let blocks = self.services.store.scan(COLLECTION_BLOCKS).await.map_err(WorkerError::Store)?;
        let next_height = height + 1;
        for value in blocks {
            let mut block: Block = serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;
            if block.height == next_height && block.closed && block.previous_block_hash.is_none() {
                block.previous_block_hash = Some(previous_block_hash.to_owned());
                block.mining_release_timestamp = Some(get_current_time_in_millis());
                let value = serde_json::to_value(&block).map_err(|e| WorkerError::Store(e.to_string()))?;
                self.services.store.put(COLLECTION_BLOCKS, &block.id, value).await.map_err(WorkerError::Store)?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

async fn append_with_retry<S: DocumentStore, C: Cache>(
    services: &Services<S, C>,
    tx_ref: BlockTransactionRef,
) -> Result<u64, WorkerError> {
    let number = BlockService::<S, C>::current_block_number();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        if try_append(services, number, &tx_ref).await? {
            return Ok(number);
        }

        if find_open_block(services, number).await?.is_none() {
            open_new_block(services, number).await?;
        }

        if attempt >= MAX_APPEND_ATTEMPTS {
            return Err(WorkerError::BlockAppendExhausted { number });
        }

        let backoff = services.config.thread_initial_backoff_ms.saturating_mul(attempt as u64).min(services.config.thread_max_backoff_ms);
        tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
    }
}

async fn find_open_block<S: DocumentStore, C: Cache>(services: &Services<S, C>, number: u64) -> Result<Option<Block>, WorkerError> {
    let blocks = services.store.scan(COLLECTION_BLOCKS).await.map_err(WorkerError::Store)?;
    for value in blocks {
        let block: Block = serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;
        if block.number == number && !block.closed {
            return Ok(Some(block));
        }
    }
    Ok(None)
}

/// Step 3: push `tx_ref` into the open block for `number`. Returns `true`
/// if exactly one document was modified.
async fn try_append<S: DocumentStore, C: Cache>(
    services: &Services<S, C>,
    number: u64,
    tx_ref: &BlockTransactionRef,
) -> Result<bool, WorkerError> {
    let Some(mut block) = find_open_block(services, number).await? else {
        return Ok(false);
    };
    block.transactions.push(tx_ref.clone());
    let value = serde_json::to_value(&block).map_err(|e| WorkerError::Store(e.to_string()))?;
    services.store.put(COLLECTION_BLOCKS, &block.id, value).await.map_err(WorkerError::Store)?;
    Ok(true)
}

/// Step 4: create the block for `number`, closing the previous one.
async fn open_new_block<S: DocumentStore, C: Cache>(services: &Services<S, C>, number: u64) -> Result<(), WorkerError> {
    let seq = services.sequences.get(BLOCK_ID_SEQUENCE).await?;
    let previous_id = seq.data.clone();
    let id = hash_concat(&previous_id, &number.to_string()).to_string();
    services.sequences.inc(BLOCK_ID_SEQUENCE, Some(&id)).await?;

    let height = services.sequences.get(BLOCK_ID_SEQUENCE).await?.sequence - 1;
    let timestamp = get_current_time_in_millis();
    let block = Block::new(id.clone(), previous_id.clone(), number, height, timestamp);

    if !previous_id.is_empty() {
        close_block(services, &previous_id).await?;
    }

    let value = serde_json::to_value(&block).map_err(|e| WorkerError::Store(e.to_string()))?;
    services.store.put(COLLECTION_BLOCKS, &block.id, value).await.map_err(WorkerError::Store)?;
    Ok(())
}

/// `closeBlock`: chains to the prior mined block's hash when available,
/// computes the merkle root, difficulty, and total fee, and marks the
/// block closed.
async fn close_block<S: DocumentStore, C: Cache>(services: &Services<S, C>, id: &str) -> Result<(), WorkerError> {
    let Some(value) = services.store.get(COLLECTION_BLOCKS, id).await.map_err(WorkerError::Store)? else {
        return Ok(());
    };
    let mut block: Block = serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;
    if block.closed {
        return Ok(());
    }

    let now = get_current_time_in_millis();
    if block.height == 0 {
        block.mining_release_timestamp = Some(now);
    } else {
        let blocks = services.store.scan(COLLECTION_BLOCKS).await.map_err(WorkerError::Store)?;
        for candidate in blocks {
            let candidate: Block = serde_json::from_value(candidate).map_err(|e| WorkerError::Store(e.to_string()))?;
            if candidate.height == block.height - 1 && candidate.mined {
                if let Some(hash) = candidate.block_hash.clone() {
                    block.previous_block_hash = Some(hash);
                    block.mining_release_timestamp = Some(now);
                }
                break;
            }
        }
    }

    let ids: Vec<String> = block.transactions.iter().map(|t| t.id.clone()).collect();
    block.merkle_root = merkle_root(&ids);

    let total_fee = block
        .transactions
        .iter()
        .fold(Money::ZERO, |acc, t| acc.checked_add(&t.tax).unwrap_or(acc));
    block.total_fee = total_fee;
    block.difficulty = total_fee.integer_digit_count() * 2;
    block.close_timestamp = Some(now);
    block.closed = true;

    let value = serde_json::to_value(&block).map_err(|e| WorkerError::Store(e.to_string()))?;
    services.store.put(COLLECTION_BLOCKS, &block.id, value).await.map_err(WorkerError::Store)?;
    Ok(())
}

/// Bottom-up pairwise Keccak-256 hashing over transaction ids; an odd
/// trailing node is duplicated. `None` for an empty transaction list.
pub fn merkle_root(ids: &[String]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let mut level = ids.to_vec();
    while level.len() > 1 {
        if level.len() % 2 == 1 {
            level.push(level.last().unwrap().clone());
        }
        level = level
            .chunks(2)
            .map(|pair| hash_concat(&pair[0], &pair[1]).to_string())
            .collect();
    }
    Some(level.into_iter().next().unwrap())
}
