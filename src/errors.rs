use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Error type that captures scheduling and advancement failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Obligation not found: {0}")]
    ObligationNotFound(Uuid),
    #[error("Concurrent advancement conflict on obligation {obligation_id} at anchor {anchor}")]
    Conflict {
        obligation_id: Uuid,
        anchor: NaiveDate,
    },
    #[error("Obligation store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Recurrence catch-up exceeded {max_iterations} iterations from anchor {anchor}")]
    RunawayRecurrence {
        anchor: NaiveDate,
        max_iterations: u32,
    },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => EngineError::StoreUnavailable(message),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
