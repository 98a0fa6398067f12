//! Transaction creation (spec.md §4.4): validates a transfer request,
//! computes tax, moves balances under the canonical lock order, appends a
//! chained transaction to the active ledger bucket, and enqueues it into
//! the current block.

use crate::balance::BalanceService;
use crate::block_service::BlockService;
use crate::cache::Cache;
use crate::element_service::owner_hash;
use crate::error::{Outcome, WorkerError};
use crate::model::dto::CreateTransferRequest;
use crate::model::{Element, Transaction, TransactionType};
use crate::services::Services;
use crate::store::{ledger_collection, DocumentStore, COLLECTION_ELEMENTS};
use norsh_common::crypto::hash;
use norsh_common::money::Money;
use norsh_common::time::{get_current_time_in_millis, week_of};

/// Optional hook letting a caller attach side data (e.g. `metadata`) to
/// the draft transaction before it is persisted.
pub type TransactionMutator = Box<dyn FnOnce(&mut Transaction) + Send>;

pub struct TransactionService<S: DocumentStore, C: Cache> {
    services: Services<S, C>,
}

impl<S: DocumentStore, C: Cache> TransactionService<S, C> {
    pub fn new(services: Services<S, C>) -> Self {
        TransactionService { services }
    }

    pub async fn create_transfer(
        &self,
        dto: CreateTransferRequest,
        tx_mutator: Option<TransactionMutator>,
    ) -> Result<Outcome<Transaction>, WorkerError> {
        if dto.public_key.is_empty() || dto.element.is_empty() || dto.to.is_empty() {
            return Ok(Outcome::error("publicKey, element, and to are required"));
        }

        let element_value = self
            .services
            .store
            .get(COLLECTION_ELEMENTS, &dto.element)
            .await
            .map_err(WorkerError::Store)?;
        let Some(element_value) = element_value else {
            return Ok(Outcome::error("Element not found"));
        };
        let element: Element =
            serde_json::from_value(element_value).map_err(|e| WorkerError::Store(e.to_string()))?;

        let shard = week_of(get_current_time_in_millis());
        let ledger = ledger_collection(shard);

        let existing = self.services.store.scan(&ledger).await.map_err(WorkerError::Store)?;
        if existing
            .iter()
            .any(|doc| doc.get("hash").and_then(|v| v.as_str()) == Some(dto.hash.as_str()))
        {
            return Ok(Outcome::exists("transaction with this hash already exists"));
        }

        let from = owner_hash(&dto.public_key)?;
        let timestamp = get_current_time_in_millis();
        let volume = dto.volume.abs();

        let mut draft = Transaction {
            id: String::new(),
            previous_id: String::new(),
            kind: TransactionType::Transfer,
            from: from.clone(),
            to: dto.to.clone(),
            element: element.id.clone(),
            volume,
            nonce: dto.nonce,
            hash: dto.hash,
            public_key: dto.public_key,
            signature: dto.signature,
            timestamp,
            shard,
            ledger: ledger.clone(),
            block: None,
            privacy: element.privacy,
            version: 1,
            element_tax: Money::ZERO,
            network_tax: Money::ZERO,
            total_tax: Money::ZERO,
            total: Money::ZERO,
            link: None,
            metadata: dto.metadata,
            confirmed: false,
        };

        compute_tax(
            &mut draft,
            &element,
            &self.services.config.network_tax_percent,
        );

        if let Some(mutator) = tx_mutator {
            mutator(&mut draft);
        }

        let sender_balance_id = BalanceService::<S>::build_id(&from, &element.id);
        let timeout = self.services.lock_timeout();

        let balances = self.services.balances.clone();
        let sequences = self.services.sequences.clone();
        let store = self.services.store.clone();
        let element_id = element.id.clone();
        let element_lock_timeout = timeout;
        let lock = self.services.lock.clone();

        let draft_clone = draft.clone();
        let total = draft.total;
        let volume_to_subtract = draft.volume;

        let outcome = self
            .services
            .lock
            .execute(&sender_balance_id, timeout, move || {
                let mut draft = draft_clone;
                async move {
                    let sender = balances.get(&from, &element_id).await?;
                    if !BalanceService::<S>::has_balance(&sender, total) {
                        return Ok::<Outcome<Transaction>, WorkerError>(Outcome::insufficient_balance(total));
                    }

                    let element_lock_name = element_id.clone();
                    let persisted = lock
                        .execute(&element_lock_name, element_lock_timeout, move || async move {
                            let seq = sequences.get(&element_id).await?;
                            draft.previous_id = seq.data.clone();
                            draft.id = hash(format!("{}{}", draft.previous_id, draft.hash).as_bytes()).to_string();

                            let value = serde_json::to_value(&draft).map_err(|e| WorkerError::Store(e.to_string()))?;
                            store.put(&draft.ledger.clone(), &draft.id, value).await.map_err(WorkerError::Store)?;
                            sequences.set(&element_id, None, Some(&draft.id)).await?;
                            Ok::<Transaction, WorkerError>(draft)
                        })
                        .await??;

                    // Open Question (spec.md §9, see DESIGN.md): subtracts
                    // `volume`, not `total` — the tax is not deducted
                    // on-chain by this operation.
                    let new_amount = sender.amount.checked_sub(&volume_to_subtract)
                        .map_err(|e| WorkerError::Store(e.to_string()))?;
                    balances.set(&sender, new_amount).await?;

                    Ok(Outcome::Ok(persisted))
                }
            })
            .await??;

        let mut persisted = match outcome {
            Outcome::Ok(tx) => tx,
            not_ok => return Ok(not_ok),
        };

        let recipient_balance_id = BalanceService::<S>::build_id(&persisted.to, &persisted.element);
        let balances = self.services.balances.clone();
        let to = persisted.to.clone();
        let element_id = persisted.element.clone();
        let volume = persisted.volume;
        self.services
            .lock
            .execute(&recipient_balance_id, timeout, move || async move {
                let recipient = balances.get(&to, &element_id).await?;
                let new_amount = recipient.amount.checked_add(&volume).map_err(|e| WorkerError::Store(e.to_string()))?;
                balances.set(&recipient, new_amount).await
            })
            .await??;

        let block_service = BlockService::new(self.services.clone());
        let block_number = block_service.add_transaction_to_block(&persisted).await?;
        persisted.confirmed = true;
        persisted.block = Some(block_number);

        let value = serde_json::to_value(&persisted).map_err(|e| WorkerError::Store(e.to_string()))?;
        self.services
            .store
            .put(&persisted.ledger.clone(), &persisted.id, value)
            .await
            .map_err(WorkerError::Store)?;

        Ok(Outcome::ok(persisted))
    }
}

/// `computeTax` (spec.md §4.4): CAPTURE/REWARD/zero-volume transactions
/// carry no tax; otherwise `elementTax`/`networkTax` are each the volume
/// times their respective percent rate, rounded half-up to the element's
/// decimals.
pub fn compute_tax(draft: &mut Transaction, element: &Element, network_tax_percent: &str) {
    if draft.kind.is_tax_exempt() || draft.volume.is_zero() {
        draft.element_tax = Money::ZERO;
        draft.network_tax = Money::ZERO;
        draft.total_tax = Money::ZERO;
        draft.total = draft.volume;
        return;
    }

    let element_rate = element
        .policy
        .transaction_tax
        .unwrap_or(Money::ZERO)
        .round_half_up(element.decimals);
    let network_rate = Money::from_str_exact(network_tax_percent)
        .unwrap_or(Money::ZERO)
        .round_half_up(element.decimals);

    draft.element_tax = draft.volume.percent_of(element_rate, element.decimals);
    draft.network_tax = draft.volume.percent_of(network_rate, element.decimals);
    draft.total_tax = draft.element_tax.checked_add(&draft.network_tax).unwrap_or(draft.element_tax);
    draft.total = draft.volume.checked_add(&draft.total_tax).unwrap_or(draft.volume);
}
