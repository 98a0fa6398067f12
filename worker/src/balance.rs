//! Balance service (spec.md §4.3): keyed by `(owner, element)`. All
//! mutation must be performed under `Lock.execute(build_id(owner, element))`
//! — this module does not take the lock itself, it just reads/writes.

use crate::error::WorkerError;
use crate::model::Balance;
use crate::store::{DocumentStore, COLLECTION_BALANCES};
use norsh_common::config::DEMO_BALANCE_SEED_AMOUNT;
use norsh_common::money::Money;
use std::sync::Arc;

pub struct BalanceService<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> BalanceService<S> {
    pub fn new(store: Arc<S>) -> Self {
        BalanceService { store }
    }

    /// Canonical balance id and canonical lock key.
    pub fn build_id(owner: &str, element: &str) -> String {
        format!("{owner}_{element}")
    }

    /// Returns the balance, or a synthesized record seeded to
    /// `DEMO_BALANCE_SEED_AMOUNT` when absent. This is documented
    /// demonstration behavior (see DESIGN.md) mirroring the original
    /// design's non-zero seed.
    pub async fn get(&self, owner: &str, element: &str) -> Result<Balance, WorkerError> {
        let id = Self::build_id(owner, element);
        match self
            .store
            .get(COLLECTION_BALANCES, &id)
            .await
            .map_err(WorkerError::Store)?
        {
            Some(value) => {
                serde_json::from_value(value).map_err(|e| WorkerError::Store(e.to_string()))
            }
            None => Ok(Balance {
                id,
                owner: owner.to_owned(),
                element: element.to_owned(),
                amount: Money::from_str_exact(DEMO_BALANCE_SEED_AMOUNT)
                    .expect("seed amount is a valid decimal literal"),
            }),
        }
    }

    pub async fn set(&self, balance: &Balance, new_amount: Money) -> Result<Balance, WorkerError> {
        let mut updated = balance.clone();
        updated.amount = new_amount;
        let value = serde_json::to_value(&updated).map_err(|e| WorkerError::Store(e.to_string()))?;
        self.store
            .put(COLLECTION_BALANCES, &updated.id, value)
            .await
            .map_err(WorkerError::Store)?;
        Ok(updated)
    }

    pub fn has_balance(balance: &Balance, amount: Money) -> bool {
        balance.amount >= amount
    }
}
