//! Element creation and metadata management (spec.md §4.7).

use crate::cache::Cache;
use crate::error::{Outcome, WorkerError};
use crate::model::dto::SetMetadataRequest;
use crate::model::{CreateElementRequest, Element, ElementStatus, ElementType};
use crate::services::Services;
use crate::store::{DocumentStore, COLLECTION_ELEMENTS};
use crate::transaction_service::TransactionService;
use norsh_common::crypto::hash;
use norsh_common::time::get_current_time_in_millis;

const ELEMENTS_SEQUENCE: &str = "elements";

pub struct ElementService<S: DocumentStore, C: Cache> {
    services: Services<S, C>,
}

impl<S: DocumentStore, C: Cache> ElementService<S, C> {
    pub fn new(services: Services<S, C>) -> Self {
        ElementService { services }
    }

    fn parse_type(kind: &str) -> Result<ElementType, Outcome<Element>> {
        match kind {
            "COIN" => Ok(ElementType::Coin),
            "PROXY" => Ok(ElementType::Proxy),
            "TOKEN" => Ok(ElementType::Token),
            other => Err(Outcome::error(format!("unrecognized element type '{other}'"))),
        }
    }

    pub async fn create_element(&self, dto: CreateElementRequest) -> Result<Outcome<Element>, WorkerError> {
        if dto.public_key.is_empty() || dto.symbol.is_empty() || dto.hash.is_empty() {
            return Ok(Outcome::error("publicKey, symbol, and hash are required"));
        }

        let existing = self
            .services
            .store
            .scan(COLLECTION_ELEMENTS)
            .await
            .map_err(WorkerError::Store)?;
        let already_exists = existing.iter().any(|doc| {
            doc.get("hash").and_then(|v| v.as_str()) == Some(dto.hash.as_str())
        });
        if already_exists {
            return Ok(Outcome::exists("element with this hash already exists"));
        }

        let kind = match Self::parse_type(&dto.kind) {
            Ok(kind) => kind,
            Err(outcome) => return Ok(outcome),
        };

        let owner = owner_hash(&dto.public_key)?;
        let timestamp = get_current_time_in_millis();

        let timeout = self.services.lock_timeout();
        let sequences = self.services.sequences.clone();
        let store = self.services.store.clone();
        let dto_hash = dto.hash.clone();
        let element = self
            .services
            .lock
            .execute(ELEMENTS_SEQUENCE, timeout, move || async move {
                let seq = sequences.get(ELEMENTS_SEQUENCE).await?;
                let previous_id = seq.data.clone();
                let id = hash(format!("{previous_id}{dto_hash}{timestamp}").as_bytes()).to_string();

                let element = Element {
                    id: id.clone(),
                    previous_id,
                    owner,
                    symbol: dto.symbol,
                    kind,
                    decimals: dto.decimals,
                    initial_supply: dto.initial_supply,
                    tfo: dto.tfo,
                    hash: dto.hash,
                    public_key: dto.public_key,
                    signature: dto.signature,
                    timestamp,
                    privacy: false,
                    status: ElementStatus::Pending,
                    policy: crate::model::element::ElementPolicy {
                        transaction_tax: dto.transaction_tax,
                    },
                    metadata: Default::default(),
                    monitored_networks: dto.monitored_networks,
                    version: 1,
                };

                let value = serde_json::to_value(&element).map_err(|e| WorkerError::Store(e.to_string()))?;
                store.put(COLLECTION_ELEMENTS, &element.id, value).await.map_err(WorkerError::Store)?;
                sequences.inc(ELEMENTS_SEQUENCE, Some(&element.id)).await?;
                Ok::<Element, WorkerError>(element)
            })
            .await??;

        info!("element '{}' ({}) created", element.symbol, element.id);
        Ok(Outcome::ok(element))
    }

    /// `None` leaves a field untouched, `Some("")` unsets it, anything
    /// else sets it. When the element already carries metadata, applying
    /// new fields requires a caller-supplied fee-capture transaction;
    /// failure of that transaction propagates as the returned `Outcome`.
    pub async fn set_metadata(&self, dto: SetMetadataRequest) -> Result<Outcome<Element>, WorkerError> {
        let existing = self
            .services
            .store
            .get(COLLECTION_ELEMENTS, &dto.element_id)
            .await
            .map_err(WorkerError::Store)?;
        let Some(value) = existing else {
            return Ok(Outcome::not_found("element not found"));
        };
        let mut element: Element =
            serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))?;

        if element.owner != dto.owner {
            return Ok(Outcome::forbidden("caller does not own this element"));
        }

        if !element.metadata.is_empty() {
            match dto.capture_transaction {
                Some(capture_dto) => {
                    let transactions = TransactionService::new(self.services.clone());
                    let outcome = transactions.create_transfer(capture_dto, None).await?;
                    if !outcome.is_ok() {
                        return Ok(Outcome::err(
                            outcome.status(),
                            "metadata fee capture transaction failed",
                        ));
                    }
                }
                None => {
                    return Ok(Outcome::error(
                        "a capture transaction is required to modify existing metadata",
                    ));
                }
            }
        }

        for (key, value) in dto.fields {
            match value {
                None => {}
                Some(v) if v.is_empty() => {
                    element.metadata.remove(&key);
                }
                Some(v) => {
                    element.metadata.insert(key, v);
                }
            }
        }

        let value = serde_json::to_value(&element).map_err(|e| WorkerError::Store(e.to_string()))?;
        self.services
            .store
            .put(COLLECTION_ELEMENTS, &element.id, value)
            .await
            .map_err(WorkerError::Store)?;

        Ok(Outcome::ok(element))
    }
}

/// `owner = hash(decode(publicKey))`, shared by element and transaction
/// creation.
pub fn owner_hash(public_key_base64: &str) -> Result<String, WorkerError> {
    let public_key = norsh_common::crypto::PublicKey::from_base64(public_key_base64)
        .map_err(|_| WorkerError::Crypto(norsh_common::crypto::CryptoError::InvalidPublicKey(public_key_base64.to_owned())))?;
    Ok(public_key.owner_hash().to_string())
}
