//! The queue: an out-of-scope collaborator (spec.md §1). An at-least-once
//! consumer yielding request envelopes.

mod memory;

pub use memory::InMemoryQueue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
}

/// Queue envelope, exactly spec.md §6's wire shape. Responses reuse the
/// same struct with `status`/`data` populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub request_id: String,
    pub request_class_name: String,
    pub method: Method,
    pub request_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn request(
        request_id: impl Into<String>,
        request_class_name: impl Into<String>,
        method: Method,
        request_data: Value,
    ) -> Self {
        Envelope {
            request_id: request_id.into(),
            request_class_name: request_class_name.into(),
            method,
            request_data,
            status: None,
            data: None,
        }
    }
}

/// At-least-once consumer: `recv` yields the next available envelope, or
/// `None` when the transport has no more records buffered right now.
#[async_trait]
pub trait QueueConsumer: Send + Sync {
    async fn recv(&self) -> Result<Option<Envelope>, String>;
}
