//! Remaining digest opportunities per quota period.

use crate::model::dose::FrequencyPeriod;
use crate::selection::timings::DigestTimings;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

/// Counts the digests still to run in the period containing `now`.
///
/// Today's share is the timings strictly later than `now`; every later day
/// of the period contributes a full set of timings. This is the denominator
/// of quota pressure.
pub fn digests_remaining_in_period(
    now: NaiveDateTime,
    period: FrequencyPeriod,
    timings: &DigestTimings,
) -> u32 {
    let remaining_today = timings.remaining_after(now.time());
    let future_days = match period {
        FrequencyPeriod::Day => 0,
        FrequencyPeriod::Week => days_remaining_in_week(now.date()) - 1,
        FrequencyPeriod::Month => days_in_month(now.date()) - now.day(),
    };

    remaining_today.saturating_add(future_days.saturating_mul(timings.slots_per_day()))
}

/// Days left in the week including `date`; the week ends on Saturday.
///
/// Monday yields 6, Saturday 1 and Sunday 7.
pub fn days_remaining_in_week(date: NaiveDate) -> u32 {
    match date.weekday() {
        Weekday::Sun => 7,
        other => 6 - other.num_days_from_monday(),
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map_or(date.day(), |last| last.day())
}
