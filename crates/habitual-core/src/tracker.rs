//! Tracker service: the store, the clock, and the engine wired together.
//!
//! This is where tracking status matters. The engine answers "is this due"
//! for any habit; the tracker hides untracked habits from the today view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::habit::{Habit, HabitKey, OwnerKey};
use crate::recurrence;
use crate::storage::HabitStore;
use crate::streak::{self, StreakCalculator, StreakReport};

/// Outcome of evaluating one habit in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStatus {
    pub habit: Habit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakReport>,
    /// Set when this habit could not be evaluated. Other habits are unaffected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct HabitTracker<S, C> {
    store: S,
    clock: C,
    calculator: StreakCalculator,
}

impl<S: HabitStore, C: Clock> HabitTracker<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_calculator(store, clock, StreakCalculator::new())
    }

    pub fn with_calculator(store: S, clock: C, calculator: StreakCalculator) -> Self {
        Self {
            store,
            clock,
            calculator,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Streak report for one habit as of the clock's today.
    ///
    /// # Errors
    /// Propagates `HabitNotFound`, storage errors, and
    /// `UnsupportedRecurrence` unchanged.
    pub fn streak(&self, owner: &OwnerKey, key: &HabitKey) -> Result<StreakReport> {
        let habit = self.store.load_habit(owner, key)?;
        self.evaluate(&habit)
    }

    fn evaluate(&self, habit: &Habit) -> Result<StreakReport> {
        let completions = self.store.load_completions(&habit.owner, &habit.key)?;
        let report = self.calculator.report(habit, &completions, self.today())?;
        Ok(report)
    }

    /// Tracked habits with an occurrence today.
    ///
    /// Habits whose cadence cannot be evaluated are left out and logged.
    ///
    /// # Errors
    /// Returns storage errors from listing habits.
    pub fn due_today(&self, owner: &OwnerKey) -> Result<Vec<Habit>> {
        let today = self.today();
        let habits = self.store.list_habits(owner)?;

        Ok(habits
            .into_iter()
            .filter(|habit| habit.tracked)
            .filter(|habit| match streak::is_due_today(habit, today) {
                Ok(due) => due,
                Err(e) => {
                    tracing::warn!(habit = %habit.key, error = %e, "skipping habit in today view");
                    false
                }
            })
            .collect())
    }

    /// Evaluate every habit of an owner independently.
    ///
    /// # Errors
    /// Only a failure to list habits fails the batch; per-habit failures are
    /// reported in [`HabitStatus::error`].
    pub fn report(&self, owner: &OwnerKey, include_untracked: bool) -> Result<Vec<HabitStatus>> {
        let habits = self.store.list_habits(owner)?;

        Ok(habits
            .into_iter()
            .filter(|habit| include_untracked || habit.tracked)
            .map(|habit| match self.evaluate(&habit) {
                Ok(report) => HabitStatus {
                    habit,
                    streak: Some(report),
                    error: None,
                },
                Err(e) => {
                    tracing::debug!(habit = %habit.key, error = %e, "habit evaluation failed");
                    HabitStatus {
                        habit,
                        streak: None,
                        error: Some(e.to_string()),
                    }
                }
            })
            .collect())
    }

    /// Occurrence dates of one habit in an inclusive window.
    ///
    /// # Errors
    /// Propagates `HabitNotFound` and `UnsupportedRecurrence`.
    pub fn schedule(
        &self,
        owner: &OwnerKey,
        key: &HabitKey,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let habit = self.store.load_habit(owner, key)?;
        recurrence::occurrences_between(habit.recurrence_rule, habit.start_date, from, to)
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::RecurrenceError;
    use crate::habit::{RecurrenceRule, ValueKind};
    use crate::storage::{HabitDb, NewHabit};
    use chrono::{FixedOffset, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn owner() -> OwnerKey {
        OwnerKey::new("alice")
    }

    fn add(db: &HabitDb, key: &str, rule: RecurrenceRule, start: NaiveDate) {
        db.create_habit(NewHabit {
            owner: owner(),
            key: Some(HabitKey::new(key)),
            name: key.to_string(),
            recurrence_rule: rule,
            value_kind: ValueKind::Binary,
            target: None,
            start_date: start,
        })
        .unwrap();
    }

    fn complete(db: &HabitDb, key: &str, on: NaiveDate) {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .from_local_datetime(&on.and_hms_opt(9, 0, 0).unwrap())
            .unwrap();
        db.record_completion(&owner(), &HabitKey::new(key), at, None)
            .unwrap();
    }

    #[test]
    fn streak_uses_the_injected_clock() {
        let db = HabitDb::open_in_memory().unwrap();
        add(&db, "walk", RecurrenceRule::Daily, date(2024, 1, 1));
        for d in 2..=4 {
            complete(&db, "walk", date(2024, 1, d));
        }

        let tracker = HabitTracker::new(db, FixedClock::on(date(2024, 1, 4)));
        let report = tracker.streak(&owner(), &HabitKey::new("walk")).unwrap();
        assert_eq!(report.current_streak, 3);
        assert!(!report.pending_today);

        let later = HabitTracker::new(tracker.store, FixedClock::on(date(2024, 1, 7)));
        let report = later.streak(&owner(), &HabitKey::new("walk")).unwrap();
        assert_eq!(report.current_streak, 0);
    }

    #[test]
    fn due_today_skips_untracked_and_custom() {
        let db = HabitDb::open_in_memory().unwrap();
        add(&db, "daily", RecurrenceRule::Daily, date(2024, 1, 1));
        add(&db, "weekly-off", RecurrenceRule::Weekly, date(2024, 1, 2));
        add(&db, "custom", RecurrenceRule::Custom, date(2024, 1, 1));
        add(&db, "shelved", RecurrenceRule::Daily, date(2024, 1, 1));
        db.set_tracked(&owner(), &HabitKey::new("shelved"), false)
            .unwrap();

        let tracker = HabitTracker::new(db, FixedClock::on(date(2024, 1, 8)));
        let due: Vec<_> = tracker
            .due_today(&owner())
            .unwrap()
            .into_iter()
            .map(|h| h.key)
            .collect();
        assert_eq!(due, vec![HabitKey::new("daily")]);
    }

    #[test]
    fn report_isolates_failures() {
        let db = HabitDb::open_in_memory().unwrap();
        add(&db, "custom", RecurrenceRule::Custom, date(2024, 1, 1));
        add(&db, "walk", RecurrenceRule::Daily, date(2024, 1, 1));
        complete(&db, "walk", date(2024, 1, 5));

        let tracker = HabitTracker::new(db, FixedClock::on(date(2024, 1, 5)));
        let statuses = tracker.report(&owner(), false).unwrap();
        assert_eq!(statuses.len(), 2);

        let custom = statuses.iter().find(|s| s.habit.key.as_str() == "custom").unwrap();
        assert!(custom.streak.is_none());
        assert!(custom.error.as_deref().unwrap().contains("not supported"));

        let walk = statuses.iter().find(|s| s.habit.key.as_str() == "walk").unwrap();
        assert_eq!(walk.streak.as_ref().unwrap().current_streak, 1);
        assert!(walk.error.is_none());
    }

    #[test]
    fn custom_streak_propagates_unsupported() {
        let db = HabitDb::open_in_memory().unwrap();
        add(&db, "custom", RecurrenceRule::Custom, date(2024, 1, 1));
        let tracker = HabitTracker::new(db, FixedClock::on(date(2024, 1, 5)));

        let err = tracker.streak(&owner(), &HabitKey::new("custom")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Recurrence(RecurrenceError::UnsupportedRecurrence {
                rule: RecurrenceRule::Custom
            })
        ));
        assert!(matches!(
            tracker.streak(&owner(), &HabitKey::new("missing")),
            Err(CoreError::HabitNotFound { .. })
        ));
    }

    #[test]
    fn schedule_lists_occurrences() {
        let db = HabitDb::open_in_memory().unwrap();
        add(&db, "review", RecurrenceRule::Biweekly, date(2024, 1, 1));
        let tracker = HabitTracker::new(db, FixedClock::on(date(2024, 1, 5)));
        let dates = tracker
            .schedule(&owner(), &HabitKey::new("review"), date(2024, 1, 1), date(2024, 2, 1))
            .unwrap();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 15), date(2024, 1, 29)]);
    }
}
