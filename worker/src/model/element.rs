use norsh_common::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    #[serde(rename = "COIN")]
    Coin,
    #[serde(rename = "PROXY")]
    Proxy,
    #[serde(rename = "TOKEN")]
    Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "ENABLED")]
    Enabled,
    #[serde(rename = "DISABLED")]
    Disabled,
}

/// Per-element governance policy. `transaction_tax` is a percent (e.g.
/// `0.3` means 0.3%), applied on top of the network tax in `computeTax`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_tax: Option<Money>,
}

/// A ledgered asset or proxy: COIN, PROXY, or a custom token, with an
/// owner, a decimal scale, and a governance policy.
///
/// `id = hash(previousId ++ hash ++ timestamp)`. Insert-only; only
/// `metadata`, `policy`, and `monitored_networks` may be patched by the
/// owner after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(default)]
    pub previous_id: String,
    pub owner: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub decimals: u32,
    pub initial_supply: Money,
    pub tfo: String,
    pub hash: String,
    pub public_key: String,
    pub signature: String,
    pub timestamp: u64,
    pub privacy: bool,
    pub status: ElementStatus,
    #[serde(default)]
    pub policy: ElementPolicy,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub monitored_networks: Vec<String>,
    pub version: u32,
}
