use norsh_common::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "TRANSFER")]
    Transfer,
    #[serde(rename = "CAPTURE")]
    Capture,
    #[serde(rename = "REWARD")]
    Reward,
}

impl TransactionType {
    /// CAPTURE and REWARD are tax-exempt by spec.md §4.4's `computeTax`.
    pub fn is_tax_exempt(self) -> bool {
        matches!(self, TransactionType::Capture | TransactionType::Reward)
    }
}

/// A confirmed transfer, appended to the per-week ledger bucket
/// `ledger_<shard>` and chained to its element's previous transaction via
/// `previousId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub previous_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub from: String,
    pub to: String,
    pub element: String,
    pub volume: Money,
    #[serde(default)]
    pub nonce: String,
    pub hash: String,
    pub public_key: String,
    pub signature: String,
    pub timestamp: u64,
    pub shard: u64,
    pub ledger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,
    pub privacy: bool,
    pub version: u32,
    pub element_tax: Money,
    pub network_tax: Money,
    pub total_tax: Money,
    pub total: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    pub confirmed: bool,
}

/// Keyed by `owner_element` (see `BalanceService::build_id`). Created
/// lazily with a fixed seed amount when absent (spec.md §9 Open Question —
/// demonstration scaffolding, see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub id: String,
    pub owner: String,
    pub element: String,
    pub amount: Money,
}
