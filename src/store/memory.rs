//! In-memory store implementations for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::{CasOutcome, IdempotencyKey, ObligationStore, PendingRequestSource, StoreError};
use crate::domain::{PendingRequestItem, RealizedTransaction, RecurringObligation};

/// Obligation store backed by in-process maps.
#[derive(Default)]
pub struct MemoryObligationStore {
    obligations: RwLock<HashMap<Uuid, RecurringObligation>>,
    realized: RwLock<HashMap<IdempotencyKey, RealizedTransaction>>,
}

impl MemoryObligationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_obligation(&self, obligation: RecurringObligation) {
        let mut obligations = self.obligations.write().unwrap();
        obligations.insert(obligation.id, obligation);
    }

    /// Realized records for one obligation, ordered by resolved date.
    pub fn realized_for(&self, obligation_id: Uuid) -> Vec<RealizedTransaction> {
        let realized = self.realized.read().unwrap();
        let mut records: Vec<RealizedTransaction> = realized
            .values()
            .filter(|record| record.obligation_id == obligation_id)
            .cloned()
            .collect();
        records.sort_by_key(|record| record.resolved_date);
        records
    }
}

#[async_trait]
impl ObligationStore for MemoryObligationStore {
    async fn list_active(&self, owner_id: Uuid) -> Result<Vec<RecurringObligation>, StoreError> {
        let obligations = self.obligations.read().unwrap();
        Ok(obligations
            .values()
            .filter(|o| o.owner_id == owner_id && o.active)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<RecurringObligation>, StoreError> {
        let obligations = self.obligations.read().unwrap();
        Ok(obligations.get(&id).cloned())
    }

    async fn advance_anchor(
        &self,
        id: Uuid,
        expected: NaiveDate,
        new_anchor: NaiveDate,
    ) -> Result<CasOutcome, StoreError> {
        let mut obligations = self.obligations.write().unwrap();
        match obligations.get_mut(&id) {
            Some(obligation) if obligation.anchor_due_date == expected => {
                obligation.anchor_due_date = new_anchor;
                Ok(CasOutcome::Applied)
            }
            // A missing or already-advanced obligation lost the race.
            _ => Ok(CasOutcome::Conflict),
        }
    }

    async fn insert_realized(
        &self,
        record: RealizedTransaction,
        key: IdempotencyKey,
    ) -> Result<(), StoreError> {
        let mut realized = self.realized.write().unwrap();
        realized.entry(key).or_insert(record);
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), StoreError> {
        let mut obligations = self.obligations.write().unwrap();
        if let Some(obligation) = obligations.get_mut(&id) {
            obligation.active = active;
        }
        Ok(())
    }
}

/// Pending-request source backed by an in-process map.
#[derive(Default)]
pub struct MemoryRequestSource {
    pending: RwLock<HashMap<Uuid, Vec<PendingRequestItem>>>,
}

impl MemoryRequestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_pending(&self, owner_id: Uuid, item: PendingRequestItem) {
        let mut pending = self.pending.write().unwrap();
        pending.entry(owner_id).or_default().push(item);
    }
}

#[async_trait]
impl PendingRequestSource for MemoryRequestSource {
    async fn list_pending(&self, owner_id: Uuid) -> Result<Vec<PendingRequestItem>, StoreError> {
        let pending = self.pending.read().unwrap();
        Ok(pending.get(&owner_id).cloned().unwrap_or_default())
    }
}
