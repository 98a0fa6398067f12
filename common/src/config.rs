//! Workspace-wide constants.
//!
//! Values here are fixed by design (spec invariants), as opposed to the
//! runtime-tunable options in `norsh_worker::config::WorkerConfig`.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width of a block's time window: 6 minutes, in milliseconds.
/// `block_number = floor(now_ms / BLOCK_WINDOW_MILLIS)`.
pub const BLOCK_WINDOW_MILLIS: u64 = 6 * 60 * 1000;

/// Symbol of the genesis coin element.
pub const GENESIS_COIN_SYMBOL: &str = "NSH";

/// Symbol of the genesis proxy element seeded alongside the coin.
pub const GENESIS_PROXY_SYMBOL: &str = "USDN-P";

/// Default decimal precision for newly created elements when the request
/// does not specify one.
pub const DEFAULT_ELEMENT_DECIMALS: u32 = 18;

/// Demonstration seed amount `BalanceService::get` returns for a balance
/// that has never been written. See DESIGN.md for why this is not zero.
pub const DEMO_BALANCE_SEED_AMOUNT: &str = "10000";
