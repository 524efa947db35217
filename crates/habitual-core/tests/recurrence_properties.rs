//! Property tests for the recurrence engine and streak walk.

use chrono::{Datelike, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use habitual_core::recurrence::{
    expected_prior_occurrence, is_due, last_day_of_month, latest_occurrence_on_or_before,
    previous_occurrence,
};
use habitual_core::{
    CompletionEvent, Habit, HabitKey, OwnerKey, RecurrenceError, RecurrenceRule,
    StreakCalculator, ValueKind,
};
use proptest::prelude::*;

const SUPPORTED: [RecurrenceRule; 4] = [
    RecurrenceRule::Daily,
    RecurrenceRule::Weekly,
    RecurrenceRule::Biweekly,
    RecurrenceRule::Monthly,
];

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    // 1990-01-01 plus up to ~60 years
    (0u64..22_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(1990, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn supported_rule() -> impl Strategy<Value = RecurrenceRule> {
    prop::sample::select(SUPPORTED.to_vec())
}

fn value_kind() -> impl Strategy<Value = ValueKind> {
    prop::sample::select(ValueKind::ALL.to_vec())
}

fn habit(rule: RecurrenceRule, kind: ValueKind, target: Option<i64>, start: NaiveDate) -> Habit {
    Habit {
        owner: OwnerKey::new("prop"),
        key: HabitKey::new("prop"),
        name: "prop".to_string(),
        recurrence_rule: rule,
        start_date: start,
        value_kind: kind,
        target,
        tracked: true,
        created_at: Utc::now(),
    }
}

fn completion_on(date: NaiveDate) -> CompletionEvent {
    CompletionEvent {
        habit: HabitKey::new("prop"),
        occurred_at: FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&date.and_hms_opt(8, 0, 0).unwrap())
            .unwrap(),
        value: None,
    }
}

proptest! {
    /// Property: the start date is always its own first occurrence
    #[test]
    fn start_date_is_an_occurrence(rule in supported_rule(), start in date_strategy()) {
        prop_assert_eq!(is_due(rule, start, start), Ok(true));
    }

    /// Property: weekly occurrences repeat every 7 days and nowhere in between
    #[test]
    fn weekly_periodicity(start in date_strategy(), n in 0u64..400, shift in 1u64..7) {
        let on = start.checked_add_days(Days::new(7 * n)).unwrap();
        let off = start.checked_add_days(Days::new(7 * n + shift)).unwrap();
        prop_assert_eq!(is_due(RecurrenceRule::Weekly, start, on), Ok(true));
        prop_assert_eq!(is_due(RecurrenceRule::Weekly, start, off), Ok(false));
    }

    /// Property: monthly occurrences fall once a month, on the start day
    /// (clamped) or on the month end for month-end starts
    #[test]
    fn monthly_occurrence_once_per_month(start in date_strategy(), months in 0u32..240) {
        let month_start = start
            .with_day(1)
            .unwrap()
            .checked_add_months(chrono::Months::new(months))
            .unwrap();
        let last = last_day_of_month(month_start.year(), month_start.month());
        let due: Vec<u32> = (1..=last)
            .filter(|d| {
                let candidate = month_start.with_day(*d).unwrap();
                is_due(RecurrenceRule::Monthly, start, candidate).unwrap()
            })
            .collect();
        let month_end_start = start.day() >= 28
            && start.day() == last_day_of_month(start.year(), start.month());
        let expected = if month_end_start { last } else { start.day().min(last) };
        prop_assert_eq!(due, vec![expected]);
    }

    /// Property: repeated prior occurrences strictly decrease
    #[test]
    fn prior_occurrences_strictly_decrease(rule in supported_rule(), from in date_strategy(), k in 1usize..60) {
        let mut cursor = from;
        for _ in 0..k {
            let prior = expected_prior_occurrence(rule, cursor).unwrap();
            prop_assert!(prior < cursor, "{} -> {} did not move back", cursor, prior);
            cursor = prior;
        }
    }

    /// Property: the anchored walk visits only occurrences, in decreasing order
    #[test]
    fn anchored_walk_stays_on_schedule(rule in supported_rule(), start in date_strategy(), span in 0u64..3_000) {
        let today = start.checked_add_days(Days::new(span)).unwrap();
        let mut cursor = latest_occurrence_on_or_before(rule, start, today).unwrap().unwrap();
        prop_assert!(cursor <= today);
        let mut steps = 0;
        while cursor > start {
            prop_assert_eq!(is_due(rule, start, cursor), Ok(true));
            let prior = previous_occurrence(rule, start, cursor).unwrap();
            prop_assert!(prior < cursor);
            cursor = prior;
            steps += 1;
            prop_assert!(steps <= span + 1);
        }
        prop_assert_eq!(cursor, start);
    }

    /// Property: no completions means no streak
    #[test]
    fn empty_completions_yield_zero(
        rule in supported_rule(),
        kind in value_kind(),
        target in prop::option::of(-5i64..50),
        start in date_strategy(),
        span in 0u64..1_000,
    ) {
        let today = start.checked_add_days(Days::new(span)).unwrap();
        let h = habit(rule, kind, target, start);
        prop_assert_eq!(StreakCalculator::new().compute_streak(&h, &[], today), Ok(0));
    }

    /// Property: a daily binary habit done every day since start has a streak of every day
    #[test]
    fn perfect_daily_record(start in date_strategy(), span in 0u64..200) {
        let today = start.checked_add_days(Days::new(span)).unwrap();
        let completions: Vec<_> = start.iter_days().take(span as usize + 1).map(completion_on).collect();
        let h = habit(RecurrenceRule::Daily, ValueKind::Binary, None, start);
        prop_assert_eq!(
            StreakCalculator::new().compute_streak(&h, &completions, today),
            Ok(span as u32 + 1)
        );
    }

    /// Property: custom recurrence never yields a number
    #[test]
    fn custom_always_fails(kind in value_kind(), start in date_strategy(), candidate in date_strategy()) {
        let err = RecurrenceError::UnsupportedRecurrence { rule: RecurrenceRule::Custom };
        prop_assert_eq!(is_due(RecurrenceRule::Custom, start, candidate), Err(err));
        let h = habit(RecurrenceRule::Custom, kind, None, start);
        prop_assert_eq!(StreakCalculator::new().compute_streak(&h, &[completion_on(candidate)], candidate), Err(err));
    }
}
