//! Norsh ledger write-side worker.
//!
//! Consumes signed operation envelopes from a queue, mutates a document
//! store (elements, balances, sequences, blocks, per-week ledger shards),
//! and publishes responses through a TTL-backed cache. See `Services` for
//! the explicit dependency set every handler runs against.

#[macro_use]
extern crate log;

pub mod balance;
pub mod block_service;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod element_service;
pub mod error;
pub mod lock;
pub mod logging;
pub mod miner_service;
pub mod model;
pub mod pool;
pub mod queue;
pub mod sequence;
pub mod services;
pub mod store;
pub mod transaction_service;
