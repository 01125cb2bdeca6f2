//! Collaborator-facing storage traits.
//!
//! The obligation store is the only shared mutable resource in the system;
//! `anchor_due_date` is mutated exclusively through the compare-and-swap
//! advance path. Pending peer requests are read-only here.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{PendingRequestItem, RealizedTransaction, RecurringObligation};

/// Store-level failure, translated into the engine taxonomy at the service
/// boundary. Raw storage errors never leak past this type.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a compare-and-swap anchor write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Applied,
    Conflict,
}

/// Identifies one logical occurrence of one obligation. A retried insert
/// under the same key is a no-op, so a partial failure between the realized
/// write and the anchor advance cannot duplicate the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdempotencyKey {
    pub obligation_id: Uuid,
    pub anchor: NaiveDate,
}

/// Persistence collaborator for recurring obligations and realized records.
#[async_trait]
pub trait ObligationStore: Send + Sync {
    async fn list_active(&self, owner_id: Uuid) -> Result<Vec<RecurringObligation>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<RecurringObligation>, StoreError>;

    /// Advances the anchor only if the stored value still equals `expected`.
    async fn advance_anchor(
        &self,
        id: Uuid,
        expected: NaiveDate,
        new_anchor: NaiveDate,
    ) -> Result<CasOutcome, StoreError>;

    /// Inserts a realized transaction, deduplicating on the idempotency key.
    async fn insert_realized(
        &self,
        record: RealizedTransaction,
        key: IdempotencyKey,
    ) -> Result<(), StoreError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), StoreError>;
}

/// Read-only collaborator owning pending peer-to-peer requests.
#[async_trait]
pub trait PendingRequestSource: Send + Sync {
    async fn list_pending(&self, owner_id: Uuid) -> Result<Vec<PendingRequestItem>, StoreError>;
}
