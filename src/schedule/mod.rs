//! Pure recurrence scheduling: frequency specs, next-occurrence arithmetic,
//! and notification-window eligibility. No I/O lives here.

pub mod calculator;
pub mod eligibility;
pub mod frequency;

pub use calculator::{catch_up_to_today, compute_next_occurrence};
pub use frequency::FrequencySpec;
