//! Recurrence engine: which calendar dates are occurrences of a habit.
//!
//! Every function here is pure. Occurrences are anchored on the habit's
//! start date:
//!
//! - daily: every date from the start date on
//! - weekly / biweekly: every 7 / 14 days from the start date
//! - monthly: the start date's day of month, clamped to the last day of
//!   shorter months (a 31st start falls on Feb 28, or Feb 29 in leap years).
//!   A start on the last day of its month tracks the month end, so Apr 30
//!   is followed by May 31.
//!
//! The custom cadence is accepted by storage but every function here rejects
//! it with [`RecurrenceError::UnsupportedRecurrence`].

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::RecurrenceError;
use crate::habit::RecurrenceRule;

/// Fixed period in days, or `None` for calendar-month cadences.
fn period_days(rule: RecurrenceRule) -> Result<Option<u64>, RecurrenceError> {
    match rule {
        RecurrenceRule::Daily => Ok(Some(1)),
        RecurrenceRule::Weekly => Ok(Some(7)),
        RecurrenceRule::Biweekly => Ok(Some(14)),
        RecurrenceRule::Monthly => Ok(None),
        RecurrenceRule::Custom => Err(RecurrenceError::UnsupportedRecurrence { rule }),
    }
}

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Day of month monthly occurrences aim for before clamping.
///
/// Starts on the last day of their month (28th or later) aim for 31, which
/// clamps to every month's last day. Other starts keep their own day.
fn monthly_anchor(start: NaiveDate) -> u32 {
    let day = start.day();
    if day >= 28 && day == last_day_of_month(start.year(), start.month()) {
        31
    } else {
        day
    }
}

/// The monthly occurrence inside `date`'s month for a given anchor day.
fn monthly_occurrence_in(date: NaiveDate, anchor_day: u32) -> NaiveDate {
    let day = anchor_day.min(last_day_of_month(date.year(), date.month()));
    date.with_day(day).unwrap_or(date)
}

fn days_since(start: NaiveDate, date: NaiveDate) -> u64 {
    date.signed_duration_since(start).num_days().unsigned_abs()
}

/// Is `candidate` an occurrence of a habit started on `start`?
///
/// Dates before `start` are never due.
pub fn is_due(
    rule: RecurrenceRule,
    start: NaiveDate,
    candidate: NaiveDate,
) -> Result<bool, RecurrenceError> {
    let period = period_days(rule)?;
    if candidate < start {
        return Ok(false);
    }
    Ok(match period {
        Some(days) => days_since(start, candidate) % days == 0,
        None => candidate == monthly_occurrence_in(candidate, monthly_anchor(start)),
    })
}

/// The occurrence expected immediately before `from`, assuming `from` is
/// itself an occurrence.
///
/// Monthly steps back one calendar month, clamping the day of month. The
/// result is always strictly earlier than `from`, except at the very start
/// of the representable calendar where it saturates at `NaiveDate::MIN`.
/// The start date is not consulted; callers stop the walk there.
pub fn expected_prior_occurrence(
    rule: RecurrenceRule,
    from: NaiveDate,
) -> Result<NaiveDate, RecurrenceError> {
    let prior = match period_days(rule)? {
        Some(days) => from.checked_sub_days(Days::new(days)),
        None => from.checked_sub_months(Months::new(1)),
    };
    Ok(prior.unwrap_or(NaiveDate::MIN))
}

/// Like [`expected_prior_occurrence`], but re-anchored on `start` so that a
/// monthly walk from a clamped month end returns to the anchor day.
///
/// With a Jan 31 start, stepping back from Mar 31 gives Feb 29 (2024), and
/// stepping back from Feb 29 gives Jan 31 rather than Jan 29.
pub fn previous_occurrence(
    rule: RecurrenceRule,
    start: NaiveDate,
    from: NaiveDate,
) -> Result<NaiveDate, RecurrenceError> {
    let prior = expected_prior_occurrence(rule, from)?;
    let prior = match rule {
        RecurrenceRule::Monthly => monthly_occurrence_in(prior, monthly_anchor(start)),
        _ => prior,
    };
    debug_assert!(prior < from || from == NaiveDate::MIN);
    Ok(prior)
}

/// The most recent occurrence at or before `date`, or `None` if `date`
/// precedes the start date.
pub fn latest_occurrence_on_or_before(
    rule: RecurrenceRule,
    start: NaiveDate,
    date: NaiveDate,
) -> Result<Option<NaiveDate>, RecurrenceError> {
    let period = period_days(rule)?;
    if date < start {
        return Ok(None);
    }
    let latest = match period {
        Some(days) => {
            let elapsed = days_since(start, date);
            start.checked_add_days(Days::new(elapsed - elapsed % days))
        }
        None => {
            let anchor = monthly_anchor(start);
            let this_month = monthly_occurrence_in(date, anchor);
            if this_month <= date {
                Some(this_month)
            } else {
                date.checked_sub_months(Months::new(1))
                    .map(|prev| monthly_occurrence_in(prev, anchor))
            }
        }
    };
    Ok(latest.filter(|d| *d >= start))
}

/// All occurrences in the inclusive window `[from, to]`, ascending.
pub fn occurrences_between(
    rule: RecurrenceRule,
    start: NaiveDate,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<NaiveDate>, RecurrenceError> {
    let floor = from.max(start);
    let mut dates = Vec::new();
    let mut cursor = latest_occurrence_on_or_before(rule, start, to)?;
    while let Some(date) = cursor.filter(|d| *d >= floor) {
        dates.push(date);
        let prior = previous_occurrence(rule, start, date)?;
        cursor = (prior < date).then_some(prior);
    }
    dates.reverse();
    Ok(dates)
}
