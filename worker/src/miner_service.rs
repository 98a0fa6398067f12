//! Proof-of-work mining and verification (spec.md §4.6).

use crate::block_service::BlockService;
use crate::cache::Cache;
use crate::error::WorkerError;
use crate::model::Block;
use crate::services::Services;
use crate::store::{DocumentStore, COLLECTION_BLOCKS};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs after a block is successfully mined and verified. The amount and
/// mechanism of the reward are unspecified; see DESIGN.md for the Open
/// Question decision to expose this as an extension point rather than
/// guess at transaction mechanics.
#[async_trait]
pub trait RewardHook: Send + Sync {
    async fn reward(&self, block: &Block, miner: &str) -> Result<(), WorkerError>;
}

pub struct LoggingRewardHook;

#[async_trait]
impl RewardHook for LoggingRewardHook {
    async fn reward(&self, block: &Block, miner: &str) -> Result<(), WorkerError> {
        info!(
            "reward hook: miner '{miner}' credited for block '{}' (fee {})",
            block.id, block.total_fee
        );
        Ok(())
    }
}

pub struct MinerService<S: DocumentStore, C: Cache> {
    services: Services<S, C>,
    reward_hook: Arc<dyn RewardHook>,
}

impl<S: DocumentStore, C: Cache> MinerService<S, C> {
    pub fn new(services: Services<S, C>) -> Self {
        MinerService {
            services,
            reward_hook: Arc::new(LoggingRewardHook),
        }
    }

    pub fn with_reward_hook(services: Services<S, C>, reward_hook: Arc<dyn RewardHook>) -> Self {
        MinerService { services, reward_hook }
    }

    /// `mine(block, threadCount, maxNonceDepth) -> block`. Returns the
    /// winning nonce vector and its hex digest; the caller is responsible
    /// for feeding these into `verify_block_and_reward_miner`.
    pub async fn mine(
        &self,
        block: &Block,
        thread_count: usize,
        max_nonce_depth: usize,
    ) -> Result<(Vec<u64>, String), WorkerError> {
        let base = mining_base(block);
        let prefix = "0".repeat(block.difficulty as usize);
        let mined = Arc::new(AtomicBool::new(false));
        let mut nonce = vec![0u64];

        loop {
            if nonce.len() > max_nonce_depth {
                return Err(WorkerError::MiningDepthExhausted {
                    block_id: block.id.clone(),
                    max_nonce_depth,
                });
            }

            let mut batch = Vec::with_capacity(thread_count);
            for _ in 0..thread_count {
                batch.push(nonce.clone());
                increment_nonce(&mut nonce);
            }

            let mut tasks = Vec::with_capacity(batch.len());
            for snapshot in batch {
                let base = base.clone();
                let prefix = prefix.clone();
                let mined = mined.clone();
                tasks.push(tokio::task::spawn_blocking(move || {
                    if mined.load(Ordering::Relaxed) {
                        return None;
                    }
                    let digest = sha256_hex(&base, &snapshot);
                    if digest.starts_with(prefix.as_str()) {
                        mined.store(true, Ordering::Relaxed);
                        Some((snapshot, digest))
                    } else {
                        None
                    }
                }));
            }

            for task in tasks {
                if let Some(found) = task.await.map_err(|e| WorkerError::Store(e.to_string()))? {
                    return Ok(found);
                }
            }
        }
    }

    /// Runs under the blockchain lock: recomputes the hash from `nonces`,
    /// checks it against `providedHash` and the difficulty prefix, and
    /// atomically finalizes the block if it isn't already mined.
    pub async fn verify_block_and_reward_miner(
        &self,
        block_id: &str,
        nonces: &[u64],
        provided_hash: &str,
        miner: &str,
    ) -> Result<bool, WorkerError> {
        let timeout = self.services.lock_timeout();
        let services = self.services.clone();
        let reward_hook = self.reward_hook.clone();
        let block_id = block_id.to_owned();
        let nonces = nonces.to_vec();
        let provided_hash = provided_hash.to_owned();
        let miner = miner.to_owned();

        self.services
            .lock
            .execute("blockchain", timeout, move || async move {
                let Some(value) = services.store.get(COLLECTION_BLOCKS, &block_id).await.map_err(WorkerError::Store)? else {
                    return Ok(false);
                };
                let mut block: Block = serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;
                if block.mined {
                    return Ok(false);
                }

                let base = mining_base(&block);
                let digest = sha256_hex(&base, &nonces);
                let prefix = "0".repeat(block.difficulty as usize);
                if digest != provided_hash || !digest.starts_with(prefix.as_str()) {
                    return Ok(false);
                }

                block.miner = Some(miner.clone());
                block.mined = true;
                block.mining_end_timestamp = Some(norsh_common::time::get_current_time_in_millis());
                block.nonces = nonces;
                block.block_hash = Some(provided_hash.clone());

                let value = serde_json::to_value(&block).map_err(|e| WorkerError::Store(e.to_string()))?;
                services.store.put(COLLECTION_BLOCKS, &block.id, value).await.map_err(WorkerError::Store)?;

                reward_hook.reward(&block, &miner).await?;

                let block_service = BlockService::new(services.clone());
                block_service
                    .release_next_block_for_mining(block.height, &provided_hash)
                    .await?;

                Ok(true)
            })
            .await?
    }
}

/// `base = id ‖ timestamp ‖ merkleRoot ‖ previousBlockHash ‖ miningReleaseTimestamp`.
fn mining_base(block: &Block) -> String {
    format!(
        "{}{}{}{}{}",
        block.id,
        block.timestamp,
        block.merkle_root.as_deref().unwrap_or(""),
        block.previous_block_hash.as_deref().unwrap_or(""),
        block.mining_release_timestamp.unwrap_or(0),
    )
}

fn sha256_hex(base: &str, nonce: &[u64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    for n in nonce {
        hasher.update(n.to_string().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Little-endian nonce vector increment: carry out of the most
/// significant (last) position grows the vector by one dimension.
fn increment_nonce(nonce: &mut Vec<u64>) {
    for slot in nonce.iter_mut() {
        if *slot == u64::MAX {
            *slot = 0;
        } else {
            *slot += 1;
            return;
        }
    }
    nonce.push(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;
    use crate::config::WorkerConfig;
    use crate::store::InMemoryStore;

    fn services() -> Services<InMemoryStore, InMemoryCache> {
        Services::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryCache::new()),
            WorkerConfig::default(),
        )
    }

    fn block(difficulty: u32) -> Block {
        let mut b = Block::new("b1".into(), String::new(), 0, 0, 0);
        b.closed = true;
        b.difficulty = difficulty;
        b.merkle_root = Some("root".into());
        b.mining_release_timestamp = Some(1);
        b
    }

    #[test]
    fn increment_nonce_carries_and_grows_dimension() {
        let mut nonce = vec![u64::MAX];
        increment_nonce(&mut nonce);
        assert_eq!(nonce, vec![0, 1]);
    }

    #[test]
    fn increment_nonce_simple_case() {
        let mut nonce = vec![0];
        increment_nonce(&mut nonce);
        assert_eq!(nonce, vec![1]);
    }

    #[tokio::test]
    async fn mine_finds_nonce_matching_zero_difficulty() {
        let services = services();
        let miner = MinerService::new(services);
        let b = block(0);
        let (nonces, digest) = miner.mine(&b, 4, 64).await.unwrap();
        assert!(!nonces.is_empty());
        assert_eq!(digest.len(), 64);
    }

    #[tokio::test]
    async fn verify_rejects_mismatched_hash() {
        let services = services();
        let b = block(0);
        let value = serde_json::to_value(&b).unwrap();
        services.store.put(COLLECTION_BLOCKS, &b.id, value).await.unwrap();

        let miner = MinerService::new(services);
        let ok = miner
            .verify_block_and_reward_miner(&b.id, &[0], "not-the-real-hash", "alice")
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn verify_accepts_and_finalizes_matching_hash() {
        let services = services();
        let b = block(0);
        let value = serde_json::to_value(&b).unwrap();
        services.store.put(COLLECTION_BLOCKS, &b.id, value).await.unwrap();

        let miner = MinerService::new(services.clone());
        let (nonces, digest) = miner.mine(&b, 2, 64).await.unwrap();
        let ok = miner
            .verify_block_and_reward_miner(&b.id, &nonces, &digest, "alice")
            .await
            .unwrap();
        assert!(ok);

        let stored = services.store.get(COLLECTION_BLOCKS, &b.id).await.unwrap().unwrap();
        let stored: Block = serde_json::from_value(stored).unwrap();
        assert!(stored.mined);
        assert_eq!(stored.miner, Some("alice".to_owned()));
    }
}
