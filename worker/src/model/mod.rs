//! Plain serde document types, field-for-field as spec.md §3's data model
//! table, plus the request/response DTOs handlers exchange with the
//! dispatcher.

pub mod block;
pub mod dto;
pub mod element;
pub mod sequence;
pub mod transaction;

pub use block::{Block, BlockTransactionRef};
pub use dto::{CreateElementRequest, CreateTransferRequest, SetMetadataRequest};
pub use element::{Element, ElementPolicy, ElementStatus, ElementType};
pub use sequence::DynamicSequence;
pub use transaction::{Balance, Transaction, TransactionType};
