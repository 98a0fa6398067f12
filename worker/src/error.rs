//! Two error channels: [`WorkerError`] for infrastructure failures that
//! never reach a client, and [`Outcome`]/[`Status`] for domain results that
//! do.

use norsh_common::money::Money;
use thiserror::Error;

/// Infrastructure failures: lock unreachable, store unreachable, dispatcher
/// misconfiguration. Maps onto spec.md §7's `INTERNAL` kind.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("lock '{name}' not acquired within {timeout_ms}ms")]
    LockTimeout { name: String, timeout_ms: u64 },

    #[error("lock '{name}' release rejected: held by a different owner")]
    LockStolen { name: String },

    #[error("document store error: {0}")]
    Store(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("queue error: {0}")]
    Queue(String),

    #[error("no handler registered for payload '{payload_type}' method '{method}'")]
    UnknownHandler { payload_type: String, method: String },

    #[error("block-append retry budget exhausted for block {number}")]
    BlockAppendExhausted { number: u64 },

    #[error("mining exhausted nonce depth {max_nonce_depth} for block {block_id}")]
    MiningDepthExhausted { block_id: String, max_nonce_depth: usize },

    #[error("crypto error: {0}")]
    Crypto(#[from] norsh_common::crypto::CryptoError),
}

/// Domain-level status, carried in every response envelope.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", content = "detail")]
pub enum Status {
    Ok,
    Exists,
    NotFound,
    Forbidden,
    /// Carries the amount that was required but not available.
    InsufficientBalance { required: Money },
    Error(String),
}

/// A domain outcome: either a successful response payload, or a `Status`
/// describing why it failed, plus a human-readable message.
///
/// This is the worker-side equivalent of spec.md §9's
/// `{Ok(T), Err(Status, Message, Detail?)}` sum type. Infrastructure
/// failures never travel through this type — they are a `WorkerError`
/// returned from the outer `Result`.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ok(T),
    Err { status: Status, message: String },
}

impl Status {
    /// The wire-level status tag (spec.md §6: `OK, EXISTS, NOT_FOUND,
    /// FORBIDDEN, INSUFFICIENT_BALANCE, ERROR`).
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Exists => "EXISTS",
            Status::NotFound => "NOT_FOUND",
            Status::Forbidden => "FORBIDDEN",
            Status::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Status::Error(_) => "ERROR",
        }
    }
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Outcome::Ok(value)
    }

    pub fn err(status: Status, message: impl Into<String>) -> Self {
        Outcome::Err {
            status,
            message: message.into(),
        }
    }

    pub fn exists(message: impl Into<String>) -> Self {
        Self::err(Status::Exists, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::err(Status::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::err(Status::Forbidden, message)
    }

    pub fn insufficient_balance(required: Money) -> Self {
        Self::err(
            Status::InsufficientBalance { required },
            "insufficient balance",
        )
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::err(Status::Error(message.clone()), message)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn status(&self) -> Status {
        match self {
            Outcome::Ok(_) => Status::Ok,
            Outcome::Err { status, .. } => status.clone(),
        }
    }
}

impl<T: serde::Serialize> Outcome<T> {
    /// Flattens into the wire-level `(status, data)` pair the dispatcher
    /// writes onto a response envelope.
    pub fn into_response(self) -> Result<(String, Option<serde_json::Value>), WorkerError> {
        match self {
            Outcome::Ok(value) => {
                let data = serde_json::to_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;
                Ok((Status::Ok.as_wire_str().to_owned(), Some(data)))
            }
            Outcome::Err { status, message } => {
                let data = serde_json::json!({ "message": message });
                Ok((status.as_wire_str().to_owned(), Some(data)))
            }
        }
    }
}
