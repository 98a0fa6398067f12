use norsh_common::money::Money;
use serde::{Deserialize, Serialize};

/// A transaction reference embedded in a block's `transactions` array.
/// `volume` is carried only when the transaction is privacy-shielded
/// (`volume = total if privacy else None`, mirrored as written).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockTransactionRef {
    pub id: String,
    pub ledger: String,
    pub element: String,
    pub tax: Money,
    pub privacy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Money>,
}

/// One 6-minute time-windowed block. Exactly one `Block` exists per
/// `number`; `height` is a separate monotonic ordinal independent of wall
/// clock, assigned from the `blockchain-block-id` sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub previous_id: String,
    pub number: u64,
    pub height: u64,
    pub closed: bool,
    pub mined: bool,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mining_release_timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mining_end_timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merkle_root: Option<String>,
    #[serde(default)]
    pub difficulty: u32,
    #[serde(default)]
    pub total_fee: Money,
    #[serde(default)]
    pub nonces: Vec<u64>,
    #[serde(default)]
    pub transactions: Vec<BlockTransactionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub miner: Option<String>,
}

impl Block {
    pub fn new(id: String, previous_id: String, number: u64, height: u64, timestamp: u64) -> Self {
        Block {
            id,
            previous_id,
            number,
            height,
            closed: false,
            mined: false,
            timestamp,
            close_timestamp: None,
            mining_release_timestamp: None,
            mining_end_timestamp: None,
            previous_block_hash: None,
            block_hash: None,
            merkle_root: None,
            difficulty: 0,
            total_fee: Money::ZERO,
            nonces: Vec::new(),
            transactions: Vec::new(),
            miner: None,
        }
    }
}
