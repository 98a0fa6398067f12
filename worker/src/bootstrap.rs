//! Genesis bootstrap (spec.md §4.7): seeds the genesis COIN element and a
//! seed PROXY element on first run. Idempotent — a second invocation is a
//! no-op, detected via the `elements` sequence sentinel.

use crate::cache::Cache;
use crate::error::WorkerError;
use crate::model::{Element, ElementStatus, ElementType};
use crate::services::Services;
use crate::store::{DocumentStore, COLLECTION_ELEMENTS, COLLECTION_SEQUENCES};
use norsh_common::config::{DEFAULT_ELEMENT_DECIMALS, GENESIS_COIN_SYMBOL, GENESIS_PROXY_SYMBOL};
use norsh_common::crypto::ed25519::{Ed25519KeyPair, Ed25519SecretKey};
use norsh_common::crypto::hash;
use norsh_common::money::Money;
use norsh_common::time::get_current_time_in_millis;

const ELEMENTS_SEQUENCE: &str = "elements";

/// Runs once: `SequenceStore.get("elements")` has never been initialized
/// when the `sequences` collection has no document for `elements`.
pub async fn bootstrap<S: DocumentStore, C: Cache>(services: &Services<S, C>) -> Result<bool, WorkerError> {
    let already_initialized = services
        .store
        .get(COLLECTION_SEQUENCES, ELEMENTS_SEQUENCE)
        .await
        .map_err(WorkerError::Store)?
        .is_some();
    if already_initialized {
        debug!("bootstrap skipped: elements sequence already initialized");
        return Ok(false);
    }

    let secret = Ed25519SecretKey::from_hex(&services.config.genesis_private_key)
        .map_err(|_| WorkerError::Store("invalid genesis private key".to_owned()))?;
    let keypair = Ed25519KeyPair::from_secret(&secret)
        .map_err(|_| WorkerError::Store("invalid genesis key pair".to_owned()))?;
    let public_key_hex = keypair.public_key().to_hex();
    let owner = keypair.owner_hash().to_string();

    if services.config.genesis_public_key != public_key_hex {
        warn!("configured genesisPublicKey does not match the key derived from genesisPrivateKey; using the derived key");
    }

    create_genesis_element(
        services,
        GENESIS_COIN_SYMBOL,
        ElementType::Coin,
        &owner,
        &public_key_hex,
        &keypair,
    )
    .await?;
    create_genesis_element(
        services,
        GENESIS_PROXY_SYMBOL,
        ElementType::Proxy,
        &owner,
        &public_key_hex,
        &keypair,
    )
    .await?;

    info!("bootstrap: genesis elements {GENESIS_COIN_SYMBOL} and {GENESIS_PROXY_SYMBOL} created");
    Ok(true)
}

async fn create_genesis_element<S: DocumentStore, C: Cache>(
    services: &Services<S, C>,
    symbol: &str,
    kind: ElementType,
    owner: &str,
    public_key_hex: &str,
    keypair: &Ed25519KeyPair,
) -> Result<Element, WorkerError> {
    let timestamp = get_current_time_in_millis();
    let content_hash = hash(format!("{}{}{symbol}{timestamp}", services.config.genesis_tfo, owner).as_bytes()).to_string();
    let signature = keypair.sign(content_hash.as_bytes());
    // Self-verify before persisting: a genesis record that doesn't verify
    // against its own signature must never be written.
    keypair
        .public_key()
        .verify(content_hash.as_bytes(), &signature)
        .map_err(|_| WorkerError::Store("genesis self-verification failed".to_owned()))?;
    let signature = signature.to_hex();

    let seq = services.sequences.get(ELEMENTS_SEQUENCE).await?;
    let previous_id = seq.data.clone();
    let id = hash(format!("{previous_id}{content_hash}{timestamp}").as_bytes()).to_string();

    let element = Element {
        id: id.clone(),
        previous_id,
        owner: owner.to_owned(),
        symbol: symbol.to_owned(),
        kind,
        decimals: DEFAULT_ELEMENT_DECIMALS,
        initial_supply: Money::ZERO,
        tfo: services.config.genesis_tfo.clone(),
        hash: content_hash,
        public_key: public_key_hex.to_owned(),
        signature,
        timestamp,
        privacy: false,
        status: ElementStatus::Enabled,
        policy: Default::default(),
        metadata: Default::default(),
        monitored_networks: Vec::new(),
        version: 1,
    };

    let value = serde_json::to_value(&element).map_err(|e| WorkerError::Store(e.to_string()))?;
    services
        .store
        .put(COLLECTION_ELEMENTS, &element.id, value)
        .await
        .map_err(WorkerError::Store)?;
    services.sequences.inc(ELEMENTS_SEQUENCE, Some(&element.id)).await?;

    Ok(element)
}
