use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// How often a recurring obligation comes due.
///
/// Exhaustively matched by the calculator and eligibility rules so a new
/// frequency is a compile-time-forced change everywhere it is consumed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FrequencySpec {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    CustomDayOfMonth { day: u32 },
}

impl FrequencySpec {
    /// Rejects malformed specs, currently a custom day outside 1..=31.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            FrequencySpec::CustomDayOfMonth { day } if !(1..=31).contains(day) => Err(
                EngineError::Validation(format!("day of month must be 1..=31, got {day}")),
            ),
            _ => Ok(()),
        }
    }

    pub fn label(&self) -> String {
        match self {
            FrequencySpec::Daily => "Daily".into(),
            FrequencySpec::Weekly => "Weekly".into(),
            FrequencySpec::Monthly => "Monthly".into(),
            FrequencySpec::Yearly => "Yearly".into(),
            FrequencySpec::CustomDayOfMonth { day } => format!("Monthly on day {day}"),
        }
    }
}
