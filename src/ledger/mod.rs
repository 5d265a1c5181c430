//! Inventory ledger: catalog CRUD, search and the two stock mutations.
//!
//! Every write to an existing sweet (update, purchase, restock, delete) holds
//! that sweet's entry in [`StockLocks`] and performs its read-check-write in a
//! single store transaction. The lock guard travels into the blocking store
//! call, so it is released only once the write has finished, even when the
//! caller stopped waiting after a timeout. Reads take no lock. Idle entries
//! are pruned after each mutation, so the table only holds ids in use.

pub mod locks;
pub mod search;

use std::convert::Infallible;
use thiserror::Error;

use crate::storage::models::{Sweet, SweetDraft};
use crate::storage::{DatabaseError, Modified};
use crate::AppState;

pub use locks::StockLocks;
pub use search::SearchCriteria;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Sweet {0} not found")]
    NotFound(u64),

    #[error("Sweet {0} is out of stock")]
    OutOfStock(u64),

    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Sweet fields as submitted by a client, before validation
#[derive(Debug, Clone)]
pub struct SweetInput {
    pub category: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl SweetInput {
    /// Validate and trim into a storable draft
    pub fn into_draft(self) -> Result<SweetDraft, LedgerError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("name cannot be blank".to_string()));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(LedgerError::Validation(
                "category cannot be blank".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(LedgerError::Validation(
                "price must be zero or positive".to_string(),
            ));
        }
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            LedgerError::Validation(format!(
                "quantity must be between 0 and {}",
                u32::MAX
            ))
        })?;

        Ok(SweetDraft {
            category: category.to_string(),
            name: name.to_string(),
            price: self.price,
            quantity,
        })
    }
}

// ============================================================================
// CRUD
// ============================================================================

pub async fn add(state: &AppState, input: SweetInput) -> Result<Sweet, LedgerError> {
    let draft = input.into_draft()?;
    let sweet = state
        .db
        .run(state.config.store_timeout(), move |db| db.insert_sweet(draft))
        .await?;

    tracing::info!(id = sweet.id, name = %sweet.name, quantity = sweet.quantity, "Added sweet");
    Ok(sweet)
}

pub async fn list(state: &AppState) -> Result<Vec<Sweet>, LedgerError> {
    Ok(state
        .db
        .run(state.config.store_timeout(), |db| db.list_sweets())
        .await?)
}

pub async fn get(state: &AppState, id: u64) -> Result<Sweet, LedgerError> {
    state
        .db
        .run(state.config.store_timeout(), move |db| db.get_sweet(id))
        .await?
        .ok_or(LedgerError::NotFound(id))
}

/// Replace all caller-editable fields of a sweet
pub async fn update(state: &AppState, id: u64, input: SweetInput) -> Result<Sweet, LedgerError> {
    let draft = input.into_draft()?;
    let guard = state.stock_locks.lock(id).await;

    let outcome = state
        .db
        .run(state.config.store_timeout(), move |db| {
            let _guard = guard;
            db.modify_sweet::<Infallible, _>(id, |sweet| {
                *sweet = draft.into_sweet(id);
                Ok(())
            })
        })
        .await;
    state.stock_locks.prune(id);
    let outcome = outcome?;

    match outcome {
        Modified::Updated(sweet) => {
            tracing::info!(id, quantity = sweet.quantity, "Updated sweet");
            Ok(sweet)
        }
        Modified::Missing => Err(LedgerError::NotFound(id)),
        Modified::Rejected(never) => match never {},
    }
}

/// Delete a sweet, returning whether it existed
pub async fn delete(state: &AppState, id: u64) -> Result<bool, LedgerError> {
    let guard = state.stock_locks.lock(id).await;

    let deleted = state
        .db
        .run(state.config.store_timeout(), move |db| {
            let _guard = guard;
            db.delete_sweet(id)
        })
        .await;
    state.stock_locks.prune(id);
    let deleted = deleted?;

    if deleted {
        tracing::info!(id, "Deleted sweet");
    }
    Ok(deleted)
}

/// All sweets matching `criteria`, in catalog order
pub async fn search(state: &AppState, criteria: SearchCriteria) -> Result<Vec<Sweet>, LedgerError> {
    let criteria = criteria.normalized();
    let sweets = list(state).await?;
    Ok(criteria.apply(sweets))
}

// ============================================================================
// Stock mutations
// ============================================================================

/// Sell one unit
pub async fn purchase(state: &AppState, id: u64) -> Result<Sweet, LedgerError> {
    let guard = state.stock_locks.lock(id).await;

    let outcome = state
        .db
        .run(state.config.store_timeout(), move |db| {
            let _guard = guard;
            db.modify_sweet(id, |sweet| match sweet.quantity.checked_sub(1) {
                Some(remaining) => {
                    sweet.quantity = remaining;
                    Ok(())
                }
                None => Err(LedgerError::OutOfStock(id)),
            })
        })
        .await;
    state.stock_locks.prune(id);
    let outcome = outcome?;

    match outcome {
        Modified::Updated(sweet) => {
            tracing::info!(id, remaining = sweet.quantity, "Purchased sweet");
            Ok(sweet)
        }
        Modified::Missing => Err(LedgerError::NotFound(id)),
        Modified::Rejected(e) => {
            tracing::debug!(id, "Purchase rejected: out of stock");
            Err(e)
        }
    }
}

/// Add `amount` units to the stock of a sweet
pub async fn restock(state: &AppState, id: u64, amount: i64) -> Result<Sweet, LedgerError> {
    let amount = u32::try_from(amount).map_err(|_| {
        LedgerError::Validation(format!(
            "restock quantity must be between 0 and {}",
            u32::MAX
        ))
    })?;

    let guard = state.stock_locks.lock(id).await;

    let outcome = state
        .db
        .run(state.config.store_timeout(), move |db| {
            let _guard = guard;
            db.modify_sweet(id, |sweet| match sweet.quantity.checked_add(amount) {
                Some(total) => {
                    sweet.quantity = total;
                    Ok(())
                }
                None => Err(LedgerError::Validation(
                    "restock would exceed the maximum quantity".to_string(),
                )),
            })
        })
        .await;
    state.stock_locks.prune(id);
    let outcome = outcome?;

    match outcome {
        Modified::Updated(sweet) => {
            tracing::info!(id, added = amount, quantity = sweet.quantity, "Restocked sweet");
            Ok(sweet)
        }
        Modified::Missing => Err(LedgerError::NotFound(id)),
        Modified::Rejected(e) => Err(e),
    }
}
