use norsh_common::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request body for `TransactionService::create_transfer`. Self-validating:
/// the signature must verify over the canonical hash, volume must be
/// positive, and `public_key`/`element`/`to` must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub to: String,
    pub element: String,
    pub volume: Money,
    pub public_key: String,
    pub signature: String,
    pub hash: String,
    #[serde(default)]
    pub nonce: String,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

/// Request body for `ElementService::create_element`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateElementRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub decimals: u32,
    pub initial_supply: Money,
    pub tfo: String,
    pub hash: String,
    pub public_key: String,
    pub signature: String,
    #[serde(default)]
    pub monitored_networks: Vec<String>,
    #[serde(default)]
    pub transaction_tax: Option<Money>,
}

/// Request body for `ElementService::set_metadata`. A `None` entry leaves
/// the field untouched; `Some("")` unsets it; any other value sets it.
/// `capture_transaction` is the caller-supplied fee-capture transaction
/// required when the element already carries metadata (spec.md §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMetadataRequest {
    pub element_id: String,
    pub owner: String,
    #[serde(default)]
    pub fields: HashMap<String, Option<String>>,
    #[serde(default)]
    pub capture_transaction: Option<CreateTransferRequest>,
}
