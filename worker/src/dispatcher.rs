//! Dispatcher (spec.md §4.8): maps `(requestClassName, method)` to a
//! handler via an explicit registration table — no reflection, no
//! annotation scanning.

use crate::cache::Cache;
use crate::element_service::ElementService;
use crate::error::WorkerError;
use crate::model::dto::{CreateElementRequest, CreateTransferRequest, SetMetadataRequest};
use crate::queue::{Envelope, Method};
use crate::services::Services;
use crate::store::DocumentStore;
use crate::transaction_service::TransactionService;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type HandlerResult = Result<(String, Option<Value>), WorkerError>;
type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;
type HandlerFn<S, C> = Arc<dyn Fn(Services<S, C>, Value) -> HandlerFuture + Send + Sync>;

/// A malformed payload is a client-input problem, not an infrastructure
/// failure — it comes back as a normal `ERROR` response, not a
/// `WorkerError`.
fn invalid_payload(type_name: &str, error: serde_json::Error) -> HandlerResult {
    Ok((
        "ERROR".to_owned(),
        Some(serde_json::json!({ "message": format!("invalid {type_name}: {error}") })),
    ))
}

pub struct Dispatcher<S: DocumentStore, C: Cache> {
    services: Services<S, C>,
    handlers: HashMap<(String, Method), HandlerFn<S, C>>,
}

impl<S: DocumentStore + 'static, C: Cache + 'static> Dispatcher<S, C> {
    pub fn new(services: Services<S, C>) -> Self {
        let mut handlers: HashMap<(String, Method), HandlerFn<S, C>> = HashMap::new();

        handlers.insert(
            ("CreateElementRequest".to_owned(), Method::POST),
            Arc::new(|services, data| {
                Box::pin(async move {
                    let dto: CreateElementRequest = match serde_json::from_value(data) {
                        Ok(dto) => dto,
                        Err(e) => return invalid_payload("CreateElementRequest", e),
                    };
                    ElementService::new(services).create_element(dto).await?.into_response()
                })
            }),
        );

        handlers.insert(
            ("SetMetadataRequest".to_owned(), Method::PUT),
            Arc::new(|services, data| {
                Box::pin(async move {
                    let dto: SetMetadataRequest = match serde_json::from_value(data) {
                        Ok(dto) => dto,
                        Err(e) => return invalid_payload("SetMetadataRequest", e),
                    };
                    ElementService::new(services).set_metadata(dto).await?.into_response()
                })
            }),
        );

        handlers.insert(
            ("CreateTransferRequest".to_owned(), Method::POST),
            Arc::new(|services, data| {
                Box::pin(async move {
                    let dto: CreateTransferRequest = match serde_json::from_value(data) {
                        Ok(dto) => dto,
                        Err(e) => return invalid_payload("CreateTransferRequest", e),
                    };
                    TransactionService::new(services).create_transfer(dto, None).await?.into_response()
                })
            }),
        );

        Dispatcher { services, handlers }
    }

    /// Unmarshals `envelope.requestData` into the registered type, invokes
    /// the handler, and writes the response envelope into the cache keyed
    /// by `requestId`. Unknown `(requestClassName, method)` pairs are an
    /// infrastructure error (`WorkerError::UnknownHandler`), not a domain
    /// `Outcome` — the caller never configured a route for them.
    pub async fn dispatch(&self, envelope: Envelope) -> Result<Envelope, WorkerError> {
        let key = (envelope.request_class_name.clone(), envelope.method);
        let handler = self.handlers.get(&key).ok_or_else(|| WorkerError::UnknownHandler {
            payload_type: envelope.request_class_name.clone(),
            method: format!("{:?}", envelope.method),
        })?;

        let (status, data) = handler(self.services.clone(), envelope.request_data.clone()).await?;

        let mut response = envelope;
        response.status = Some(status);
        response.data = data;

        let serialized = serde_json::to_string(&response).map_err(|e| WorkerError::Store(e.to_string()))?;
        self.services
            .cache
            .set(&response.request_id, &serialized, self.services.config.messaging_ttl_ms)
            .await
            .map_err(WorkerError::Cache)?;

        Ok(response)
    }
}
