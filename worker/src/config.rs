//! Runtime-tunable worker configuration.
//!
//! Loaded with `clap::Parser`; every flag falls back to an environment
//! variable so the worker can be configured identically from a shell or a
//! container orchestrator. Options that spec.md marks as fixed constants
//! (the block window) live in [`norsh_common::config`] instead.

use clap::Parser;

fn default_semaphore_lock_timeout_ms() -> u64 {
    30_000
}

fn default_thread_initial_backoff_ms() -> u64 {
    20
}

fn default_thread_max_backoff_ms() -> u64 {
    2_000
}

fn default_messaging_ttl_ms() -> u64 {
    600_000
}

fn default_queue_consumer_thread_pool() -> usize {
    20
}

fn default_network_tax_percent() -> String {
    "0.3".to_owned()
}

fn default_genesis_tfo() -> String {
    "norsh-genesis".to_owned()
}

fn default_genesis_public_key() -> String {
    "0".repeat(64)
}

fn default_genesis_private_key() -> String {
    "1".repeat(64)
}

/// Worker process configuration.
///
/// Every field has a default matching spec.md §6; all can be overridden by
/// flag or by the matching environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "norsh-worker", about = "Norsh ledger write-side worker")]
pub struct WorkerConfig {
    /// Lock TTL and acquire timeout, in milliseconds.
    #[arg(long, env = "SEMAPHORE_LOCK_TIMEOUT_MS", default_value_t = default_semaphore_lock_timeout_ms())]
    pub semaphore_lock_timeout_ms: u64,

    /// Initial backoff for lock/block-append retries, in milliseconds.
    #[arg(long, env = "THREAD_INITIAL_BACKOFF_MS", default_value_t = default_thread_initial_backoff_ms())]
    pub thread_initial_backoff_ms: u64,

    /// Maximum backoff for lock/block-append retries, in milliseconds.
    #[arg(long, env = "THREAD_MAX_BACKOFF_MS", default_value_t = default_thread_max_backoff_ms())]
    pub thread_max_backoff_ms: u64,

    /// Response-cache TTL, in milliseconds.
    #[arg(long, env = "MESSAGING_TTL_MS", default_value_t = default_messaging_ttl_ms())]
    pub messaging_ttl_ms: u64,

    /// Number of worker tasks consuming the queue.
    #[arg(long, env = "QUEUE_CONSUMER_THREAD_POOL", default_value_t = default_queue_consumer_thread_pool())]
    pub queue_consumer_thread_pool: usize,

    /// Universal network tax rate, as a percent (e.g. "0.3" == 0.3%).
    #[arg(long, env = "NETWORK_TAX_PERCENT", default_value_t = default_network_tax_percent())]
    pub network_tax_percent: String,

    /// Genesis TFO (transaction fee object) material consumed by bootstrap.
    #[arg(long, env = "GENESIS_TFO", default_value_t = default_genesis_tfo())]
    pub genesis_tfo: String,

    /// Genesis signing public key (hex), consumed by bootstrap.
    #[arg(long, env = "GENESIS_PUBLIC_KEY", default_value_t = default_genesis_public_key())]
    pub genesis_public_key: String,

    /// Genesis signing private key (hex), consumed by bootstrap.
    ///
    /// Production key provisioning is outside this worker's scope; the
    /// default here is a fixed demonstration key, never a generated secret.
    #[arg(long, env = "GENESIS_PRIVATE_KEY", default_value_t = default_genesis_private_key())]
    pub genesis_private_key: String,

    /// Logging verbosity (error, warn, info, debug, trace).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Directory for rolling log files; unset disables file logging.
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            semaphore_lock_timeout_ms: default_semaphore_lock_timeout_ms(),
            thread_initial_backoff_ms: default_thread_initial_backoff_ms(),
            thread_max_backoff_ms: default_thread_max_backoff_ms(),
            messaging_ttl_ms: default_messaging_ttl_ms(),
            queue_consumer_thread_pool: default_queue_consumer_thread_pool(),
            network_tax_percent: default_network_tax_percent(),
            genesis_tfo: default_genesis_tfo(),
            genesis_public_key: default_genesis_public_key(),
            genesis_private_key: default_genesis_private_key(),
            log_level: "info".to_owned(),
            log_dir: None,
        }
    }
}
