//! Single-step and catch-up recurrence arithmetic.
//!
//! All month and year stepping goes through one clamp-based routine: a target
//! month shorter than the source day clamps to its last day, and a Feb-29
//! anchor clamps to Feb-28 in non-leap target years. Every advance path in
//! the crate funnels through [`compute_next_occurrence`]; there is no second
//! divergent implementation.

use chrono::{Datelike, Duration, NaiveDate};

use super::frequency::FrequencySpec;
use crate::errors::{EngineError, EngineResult};

/// Computes the next occurrence strictly after `previous_due`.
pub fn compute_next_occurrence(
    previous_due: NaiveDate,
    freq: &FrequencySpec,
) -> EngineResult<NaiveDate> {
    freq.validate()?;
    let next = match freq {
        FrequencySpec::Daily => previous_due + Duration::days(1),
        FrequencySpec::Weekly => previous_due + Duration::days(7),
        FrequencySpec::Monthly => shift_month(previous_due, 1),
        FrequencySpec::Yearly => shift_year(previous_due, 1),
        FrequencySpec::CustomDayOfMonth { day } => {
            let (year, month) = next_month(previous_due.year(), previous_due.month());
            let clamped = (*day).min(days_in_month(year, month));
            NaiveDate::from_ymd_opt(year, month, clamped).unwrap()
        }
    };
    Ok(next)
}

/// Advances `anchor` until the first occurrence on or after `today`.
///
/// Returns `anchor` unchanged when it is already current or in the future;
/// catch-up never advances speculatively. Exceeding `max_iterations` raises
/// [`EngineError::RunawayRecurrence`] instead of looping unboundedly.
pub fn catch_up_to_today(
    anchor: NaiveDate,
    freq: &FrequencySpec,
    today: NaiveDate,
    max_iterations: u32,
) -> EngineResult<NaiveDate> {
    freq.validate()?;
    if anchor >= today {
        return Ok(anchor);
    }
    let mut current = anchor;
    for _ in 0..max_iterations {
        current = compute_next_occurrence(current, freq)?;
        if current >= today {
            return Ok(current);
        }
    }
    Err(EngineError::RunawayRecurrence {
        anchor,
        max_iterations,
    })
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    let mut day = date.day();
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    day = day.min(days_in_month(year, month as u32));
    NaiveDate::from_ymd_opt(year, month as u32, day).unwrap()
}

fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() + years;
    let mut day = date.day();
    let month = date.month();
    day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = next_month(year, month);
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap());
    let last_current = first_next - Duration::days(1);
    last_current.day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn daily_and_weekly_step_by_fixed_days() {
        assert_eq!(
            compute_next_occurrence(date(2024, 3, 10), &FrequencySpec::Daily).unwrap(),
            date(2024, 3, 11)
        );
        assert_eq!(
            compute_next_occurrence(date(2024, 3, 10), &FrequencySpec::Weekly).unwrap(),
            date(2024, 3, 17)
        );
    }

    #[test]
    fn monthly_clamps_to_shorter_target_month() {
        assert_eq!(
            compute_next_occurrence(date(2024, 1, 31), &FrequencySpec::Monthly).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            compute_next_occurrence(date(2023, 1, 31), &FrequencySpec::Monthly).unwrap(),
            date(2023, 2, 28)
        );
        assert_eq!(
            compute_next_occurrence(date(2024, 3, 31), &FrequencySpec::Monthly).unwrap(),
            date(2024, 4, 30)
        );
    }

    #[test]
    fn yearly_clamps_leap_day_anchor() {
        assert_eq!(
            compute_next_occurrence(date(2024, 2, 29), &FrequencySpec::Yearly).unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            compute_next_occurrence(date(2023, 6, 15), &FrequencySpec::Yearly).unwrap(),
            date(2024, 6, 15)
        );
    }

    #[test]
    fn custom_day_uses_min_of_day_and_month_length() {
        let freq = FrequencySpec::CustomDayOfMonth { day: 31 };
        assert_eq!(
            compute_next_occurrence(date(2024, 1, 15), &freq).unwrap(),
            date(2024, 2, 29)
        );
        let freq = FrequencySpec::CustomDayOfMonth { day: 5 };
        assert_eq!(
            compute_next_occurrence(date(2024, 1, 20), &freq).unwrap(),
            date(2024, 2, 5)
        );
    }

    #[test]
    fn custom_day_crosses_year_boundary() {
        let freq = FrequencySpec::CustomDayOfMonth { day: 10 };
        assert_eq!(
            compute_next_occurrence(date(2024, 12, 10), &freq).unwrap(),
            date(2025, 1, 10)
        );
    }

    #[test]
    fn next_occurrence_is_strictly_later_for_all_frequencies() {
        let start = date(2024, 1, 31);
        let frequencies = [
            FrequencySpec::Daily,
            FrequencySpec::Weekly,
            FrequencySpec::Monthly,
            FrequencySpec::Yearly,
            FrequencySpec::CustomDayOfMonth { day: 1 },
            FrequencySpec::CustomDayOfMonth { day: 31 },
        ];
        for freq in frequencies {
            let mut current = start;
            for _ in 0..48 {
                let next = compute_next_occurrence(current, &freq).unwrap();
                assert!(next > current, "{freq:?} did not advance past {current}");
                current = next;
            }
        }
    }

    #[test]
    fn invalid_custom_day_is_rejected() {
        let err = compute_next_occurrence(date(2024, 1, 1), &FrequencySpec::CustomDayOfMonth {
            day: 0,
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn catch_up_stops_at_first_date_on_or_after_today() {
        let caught = catch_up_to_today(
            date(2024, 1, 31),
            &FrequencySpec::Monthly,
            date(2024, 2, 25),
            1_000,
        )
        .unwrap();
        assert_eq!(caught, date(2024, 2, 29));
    }

    #[test]
    fn catch_up_leaves_current_or_future_anchor_untouched() {
        let today = date(2024, 5, 1);
        assert_eq!(
            catch_up_to_today(today, &FrequencySpec::Daily, today, 1_000).unwrap(),
            today
        );
        let future = date(2024, 6, 15);
        assert_eq!(
            catch_up_to_today(future, &FrequencySpec::Monthly, today, 1_000).unwrap(),
            future
        );
    }

    #[test]
    fn catch_up_is_idempotent() {
        let once = catch_up_to_today(
            date(2023, 11, 3),
            &FrequencySpec::Weekly,
            date(2024, 2, 25),
            1_000,
        )
        .unwrap();
        let twice = catch_up_to_today(once, &FrequencySpec::Weekly, date(2024, 2, 25), 1_000)
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn catch_up_past_iteration_cap_is_runaway() {
        let err = catch_up_to_today(
            date(2019, 1, 1),
            &FrequencySpec::Daily,
            date(2024, 1, 1),
            1_000,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::RunawayRecurrence { .. }));
    }
}
