use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schedule::FrequencySpec;

/// Direction of money flow for a recurring obligation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ObligationKind {
    Income,
    Expense,
}

/// A user-flagged recurring income or expense entry.
///
/// `anchor_due_date` always denotes the next unresolved occurrence and is
/// monotonically non-decreasing over the obligation's lifetime. Obligations
/// are never deleted; they are disabled via `active = false` so realized
/// history stays intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringObligation {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: ObligationKind,
    pub amount: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub frequency: FrequencySpec,
    pub anchor_due_date: NaiveDate,
    pub active: bool,
}

impl RecurringObligation {
    pub fn new(
        owner_id: Uuid,
        kind: ObligationKind,
        amount: f64,
        description: impl Into<String>,
        frequency: FrequencySpec,
        anchor_due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind,
            amount,
            description: description.into(),
            category_id: None,
            frequency,
            anchor_due_date,
            active: true,
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Immutable ledger record created when an obligation occurrence is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealizedTransaction {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub kind: ObligationKind,
    pub amount: f64,
    pub description: String,
    pub resolved_date: NaiveDate,
}

impl RealizedTransaction {
    /// Snapshots the obligation at its current anchor, applying any overrides.
    pub fn from_obligation(
        obligation: &RecurringObligation,
        overrides: Option<&CompletionOverrides>,
    ) -> Self {
        let amount = overrides
            .and_then(|o| o.amount)
            .unwrap_or(obligation.amount);
        let description = overrides
            .and_then(|o| o.description.clone())
            .unwrap_or_else(|| obligation.description.clone());
        Self {
            id: Uuid::new_v4(),
            obligation_id: obligation.id,
            kind: obligation.kind,
            amount,
            description,
            resolved_date: obligation.anchor_due_date,
        }
    }
}

/// Optional value overrides applied when completing an occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Pending peer-to-peer request surfaced alongside recurring notifications.
/// Owned by an external collaborator; merged read-only into the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequestItem {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
}
