//! Executes user actions that mutate an obligation's schedule.
//!
//! Advancement is at-most-once per logical occurrence `(id, anchor)`. The
//! realized record is inserted first under an idempotency key, then the
//! anchor is advanced with a compare-and-swap; the CAS loser observes
//! [`EngineError::Conflict`] and can safely no-op because the occurrence was
//! already handled and the insert deduplicated.
//!
//! Every store call carries the configured bounded timeout; a hung store
//! surfaces as a retryable [`EngineError::StoreUnavailable`] instead of
//! hanging the user action.

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::{CompletionOverrides, RealizedTransaction, RecurringObligation};
use crate::errors::{EngineError, EngineResult};
use crate::schedule::compute_next_occurrence;
use crate::store::{CasOutcome, IdempotencyKey, ObligationStore, StoreError};

pub struct AdvancementCoordinator {
    store: Arc<dyn ObligationStore>,
    config: EngineConfig,
}

impl AdvancementCoordinator {
    pub fn new(store: Arc<dyn ObligationStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Records a realized transaction for the current occurrence and advances
    /// the anchor. Without overrides the obligation's current amount and
    /// description are snapshotted.
    pub async fn complete(
        &self,
        id: Uuid,
        overrides: Option<CompletionOverrides>,
    ) -> EngineResult<RealizedTransaction> {
        let obligation = self.load_active(id).await?;
        let anchor = obligation.anchor_due_date;
        let next = compute_next_occurrence(anchor, &obligation.frequency)?;
        let record = RealizedTransaction::from_obligation(&obligation, overrides.as_ref());
        let key = IdempotencyKey {
            obligation_id: id,
            anchor,
        };
        self.store_call(self.store.insert_realized(record.clone(), key))
            .await?;
        match self
            .store_call(self.store.advance_anchor(id, anchor, next))
            .await?
        {
            CasOutcome::Applied => {
                tracing::info!(obligation = %id, %anchor, %next, "occurrence completed");
                Ok(record)
            }
            CasOutcome::Conflict => Err(EngineError::Conflict {
                obligation_id: id,
                anchor,
            }),
        }
    }

    /// Same as [`complete`](Self::complete) but overrides are required.
    pub async fn edit_and_complete(
        &self,
        id: Uuid,
        overrides: CompletionOverrides,
    ) -> EngineResult<RealizedTransaction> {
        self.complete(id, Some(overrides)).await
    }

    /// Advances past the current occurrence without recording anything.
    pub async fn skip(&self, id: Uuid) -> EngineResult<NaiveDate> {
        let obligation = self.load_active(id).await?;
        let anchor = obligation.anchor_due_date;
        let next = compute_next_occurrence(anchor, &obligation.frequency)?;
        match self
            .store_call(self.store.advance_anchor(id, anchor, next))
            .await?
        {
            CasOutcome::Applied => {
                tracing::info!(obligation = %id, %anchor, %next, "occurrence skipped");
                Ok(next)
            }
            CasOutcome::Conflict => Err(EngineError::Conflict {
                obligation_id: id,
                anchor,
            }),
        }
    }

    /// Disables the obligation. Terminal: no further notifications, existing
    /// realized transactions untouched.
    pub async fn deactivate(&self, id: Uuid) -> EngineResult<()> {
        if self.store_call(self.store.get(id)).await?.is_none() {
            return Err(EngineError::ObligationNotFound(id));
        }
        self.store_call(self.store.set_active(id, false)).await?;
        tracing::info!(obligation = %id, "obligation deactivated");
        Ok(())
    }

    async fn load_active(&self, id: Uuid) -> EngineResult<RecurringObligation> {
        let obligation = self
            .store_call(self.store.get(id))
            .await?
            .ok_or(EngineError::ObligationNotFound(id))?;
        if !obligation.active {
            return Err(EngineError::Validation(
                "obligation is deactivated".into(),
            ));
        }
        Ok(obligation)
    }

    async fn store_call<T, F>(&self, call: F) -> EngineResult<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match timeout(self.config.store_timeout(), call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(EngineError::StoreUnavailable("store call timed out".into())),
        }
    }
}
