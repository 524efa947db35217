//! Value semantics: what happened on a day, and whether that day counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{CompletionEvent, Habit, ValueKind};

/// Everything logged for one habit on one calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTally {
    /// Number of completion events
    pub events: u32,
    /// Sum of event values, absent values counted as 0
    pub total: i64,
}

/// Group completions by calendar date and sum their values.
///
/// Input order does not matter.
pub fn aggregate_by_date<'a, I>(events: I) -> BTreeMap<NaiveDate, DayTally>
where
    I: IntoIterator<Item = &'a CompletionEvent>,
{
    let mut days: BTreeMap<NaiveDate, DayTally> = BTreeMap::new();
    for event in events {
        let tally = days.entry(event.date()).or_default();
        tally.events += 1;
        tally.total = tally.total.saturating_add(event.value.unwrap_or(0));
    }
    days
}

impl ValueKind {
    /// Target used for satisfaction checks.
    ///
    /// Unset or negative targets fall back to 1 for countable habits and 0
    /// for limit habits. Binary habits have no target.
    pub fn effective_target(self, target: Option<i64>) -> Option<i64> {
        let default = match self {
            ValueKind::Binary => return None,
            ValueKind::Countable => 1,
            ValueKind::Limit => 0,
        };
        match target {
            Some(t) if t >= 0 => Some(t),
            Some(t) => {
                tracing::warn!(kind = %self, target = t, default, "negative target, using default");
                Some(default)
            }
            None => Some(default),
        }
    }
}

/// Per-day success predicate derived from a habit's value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    /// At least one event
    Presence,
    /// Sum reaches the minimum
    AtLeast(i64),
    /// Sum stays strictly under the ceiling
    Below(i64),
}

impl Satisfaction {
    pub fn for_habit(habit: &Habit) -> Self {
        Self::new(habit.value_kind, habit.target)
    }

    pub fn new(kind: ValueKind, target: Option<i64>) -> Self {
        let target = kind.effective_target(target).unwrap_or_default();
        match kind {
            ValueKind::Binary => Satisfaction::Presence,
            ValueKind::Countable => Satisfaction::AtLeast(target),
            ValueKind::Limit => Satisfaction::Below(target),
        }
    }

    /// A date with nothing logged is checked as `DayTally::default()`.
    pub fn is_satisfied(self, tally: DayTally) -> bool {
        match self {
            Satisfaction::Presence => tally.events > 0,
            Satisfaction::AtLeast(min) => tally.total >= min,
            Satisfaction::Below(ceiling) => tally.total < ceiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitKey;
    use chrono::{DateTime, FixedOffset};

    fn event(at: &str, value: Option<i64>) -> CompletionEvent {
        CompletionEvent {
            habit: HabitKey::new("h"),
            occurred_at: DateTime::<FixedOffset>::parse_from_rfc3339(at).unwrap(),
            value,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn aggregates_multiple_events_per_day() {
        let events = vec![
            event("2024-01-02T09:00:00Z", Some(4)),
            event("2024-01-01T08:00:00Z", Some(3)),
            event("2024-01-02T21:00:00Z", None),
            event("2024-01-02T22:00:00Z", Some(5)),
        ];
        let days = aggregate_by_date(&events);

        assert_eq!(days.len(), 2);
        assert_eq!(days[&date(2024, 1, 1)], DayTally { events: 1, total: 3 });
        assert_eq!(days[&date(2024, 1, 2)], DayTally { events: 3, total: 9 });
        assert_eq!(days.keys().next(), Some(&date(2024, 1, 1)));
    }

    #[test]
    fn binary_ignores_values() {
        let s = Satisfaction::new(ValueKind::Binary, Some(10));
        assert!(s.is_satisfied(DayTally { events: 1, total: 0 }));
        assert!(!s.is_satisfied(DayTally::default()));
    }

    #[test]
    fn countable_requires_reaching_target() {
        let s = Satisfaction::new(ValueKind::Countable, Some(10));
        assert!(s.is_satisfied(DayTally { events: 2, total: 12 }));
        assert!(s.is_satisfied(DayTally { events: 1, total: 10 }));
        assert!(!s.is_satisfied(DayTally { events: 3, total: 8 }));
    }

    #[test]
    fn limit_is_satisfied_strictly_under_ceiling() {
        let s = Satisfaction::new(ValueKind::Limit, Some(5));
        assert!(s.is_satisfied(DayTally { events: 1, total: 3 }));
        assert!(s.is_satisfied(DayTally::default()));
        assert!(!s.is_satisfied(DayTally { events: 1, total: 5 }));
        assert!(!s.is_satisfied(DayTally { events: 2, total: 7 }));
    }

    #[test]
    fn missing_or_negative_targets_use_defaults() {
        assert_eq!(ValueKind::Countable.effective_target(None), Some(1));
        assert_eq!(ValueKind::Countable.effective_target(Some(-4)), Some(1));
        assert_eq!(ValueKind::Limit.effective_target(None), Some(0));
        assert_eq!(ValueKind::Limit.effective_target(Some(-1)), Some(0));
        assert_eq!(ValueKind::Binary.effective_target(Some(3)), None);

        // Default ceiling of 0 means nothing is ever under the limit.
        let s = Satisfaction::new(ValueKind::Limit, None);
        assert!(!s.is_satisfied(DayTally::default()));
    }
}
