//! Decides whether a due date should surface as a notification and renders
//! the human label shown next to it.
//!
//! Daily obligations use an hour-level window before their due instant (the
//! start of the due day); everything else uses a day-level window. Overdue
//! anchors are never eligible here; they pass through catch-up first.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::frequency::FrequencySpec;
use crate::config::EngineConfig;

/// The instant an obligation comes due: the start of its due day.
pub fn due_instant(due_date: NaiveDate) -> NaiveDateTime {
    due_date.and_hms_opt(0, 0, 0).unwrap()
}

/// Signed minutes remaining until the due instant. Used for feed ordering.
pub fn minutes_until_due(due_date: NaiveDate, now: NaiveDateTime) -> i64 {
    (due_instant(due_date) - now).num_minutes()
}

/// Whether the due date falls inside the notification window, boundary
/// inclusive on both ends. Compared at minute resolution: due in exactly
/// `daily_lookahead_hours` is eligible, one minute past is not.
pub fn is_eligible(
    due_date: NaiveDate,
    now: NaiveDateTime,
    freq: &FrequencySpec,
    config: &EngineConfig,
) -> bool {
    match freq {
        FrequencySpec::Daily => {
            let until = due_instant(due_date) - now;
            until >= Duration::zero() && until <= Duration::hours(config.daily_lookahead_hours)
        }
        FrequencySpec::Weekly
        | FrequencySpec::Monthly
        | FrequencySpec::Yearly
        | FrequencySpec::CustomDayOfMonth { .. } => {
            let days = (due_date - now.date()).num_days();
            (0..=config.default_lookahead_days).contains(&days)
        }
    }
}

/// Human label for the time remaining: "Due now" / "N hours" for daily,
/// "Today" / "Tomorrow" / "N days" otherwise.
pub fn label(due_date: NaiveDate, now: NaiveDateTime, freq: &FrequencySpec) -> String {
    match freq {
        FrequencySpec::Daily => {
            let hours = (due_instant(due_date) - now).num_hours();
            if hours <= 0 {
                "Due now".into()
            } else {
                format!("{hours} hours")
            }
        }
        FrequencySpec::Weekly
        | FrequencySpec::Monthly
        | FrequencySpec::Yearly
        | FrequencySpec::CustomDayOfMonth { .. } => day_level_label(due_date, now),
    }
}

/// Day-granularity label, also used for pending peer requests which carry no
/// frequency of their own.
pub fn day_level_label(due_date: NaiveDate, now: NaiveDateTime) -> String {
    match (due_date - now.date()).num_days() {
        0 => "Today".into(),
        1 => "Tomorrow".into(),
        days => format!("{days} days"),
    }
}
