//! Streak calculation.
//!
//! A streak counts consecutive satisfied occurrences, walking backward from
//! the most recent occurrence at or before `today` and stopping at the first
//! unsatisfied occurrence or at the habit's start date.
//!
//! An unsatisfied occurrence on `today` itself is pending, not missed: it
//! neither counts nor breaks the streak built on earlier occurrences. This
//! can be switched off with [`StreakConfig::pending_today_keeps_streak`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;
use crate::habit::{aggregate_by_date, CompletionEvent, DayTally, Habit, HabitKey, Satisfaction};
use crate::recurrence;

/// Configuration for streak walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Whether an unfinished occurrence today leaves earlier days counting.
    #[serde(default = "default_true")]
    pub pending_today_keeps_streak: bool,
}

fn default_true() -> bool {
    true
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            pending_today_keeps_streak: true,
        }
    }
}

/// Streak summary for one habit as of one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakReport {
    pub habit: HabitKey,
    pub as_of: NaiveDate,
    pub current_streak: u32,
    pub due_today: bool,
    /// Today is an occurrence and is not yet satisfied.
    pub pending_today: bool,
    /// Most recent date with any completion on or before `as_of`.
    pub last_completed: Option<NaiveDate>,
}

#[derive(Debug, Default)]
struct Walk {
    streak: u32,
    pending_today: bool,
}

/// Streak calculator over immutable habit and completion snapshots.
#[derive(Debug, Clone, Default)]
pub struct StreakCalculator {
    config: StreakConfig,
}

impl StreakCalculator {
    /// Create a new calculator with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    /// Current streak length for `habit` as of `today`.
    ///
    /// Completions may arrive in any order and may belong to dates outside
    /// the habit's schedule; only occurrence dates on or after the start
    /// date are considered.
    ///
    /// # Errors
    /// Returns [`RecurrenceError::UnsupportedRecurrence`] for custom habits,
    /// even when there are no completions.
    pub fn compute_streak(
        &self,
        habit: &Habit,
        completions: &[CompletionEvent],
        today: NaiveDate,
    ) -> Result<u32, RecurrenceError> {
        is_due_today(habit, today)?;
        if completions.is_empty() {
            return Ok(0);
        }
        let days = aggregate_by_date(completions);
        Ok(self.walk(habit, &days, today)?.streak)
    }

    /// Streak plus the surrounding "today" context.
    ///
    /// # Errors
    /// Returns [`RecurrenceError::UnsupportedRecurrence`] for custom habits.
    pub fn report(
        &self,
        habit: &Habit,
        completions: &[CompletionEvent],
        today: NaiveDate,
    ) -> Result<StreakReport, RecurrenceError> {
        let due_today = is_due_today(habit, today)?;
        let days = aggregate_by_date(completions);
        let walk = if days.is_empty() {
            Walk {
                streak: 0,
                pending_today: due_today,
            }
        } else {
            self.walk(habit, &days, today)?
        };
        let last_completed = days.range(..=today).next_back().map(|(date, _)| *date);

        Ok(StreakReport {
            habit: habit.key.clone(),
            as_of: today,
            current_streak: walk.streak,
            due_today,
            pending_today: due_today && walk.pending_today,
            last_completed,
        })
    }

    fn walk(
        &self,
        habit: &Habit,
        days: &BTreeMap<NaiveDate, DayTally>,
        today: NaiveDate,
    ) -> Result<Walk, RecurrenceError> {
        let rule = habit.recurrence_rule;
        let start = habit.start_date;
        let satisfaction = Satisfaction::for_habit(habit);

        let mut walk = Walk::default();
        let Some(mut cursor) = recurrence::latest_occurrence_on_or_before(rule, start, today)?
        else {
            return Ok(walk);
        };

        loop {
            let tally = days.get(&cursor).copied().unwrap_or_default();
            if satisfaction.is_satisfied(tally) {
                walk.streak += 1;
            } else if cursor == today {
                walk.pending_today = true;
                if !self.config.pending_today_keeps_streak {
                    break;
                }
            } else {
                break;
            }

            let prior = recurrence::previous_occurrence(rule, start, cursor)?;
            if prior >= cursor || prior < start {
                break;
            }
            cursor = prior;
        }

        tracing::debug!(
            habit = %habit.key,
            rule = %rule,
            %today,
            streak = walk.streak,
            stopped_at = %cursor,
            "streak walk finished"
        );
        Ok(walk)
    }
}

/// Whether `habit` has an occurrence on `today`. Tracking status is ignored.
///
/// # Errors
/// Returns [`RecurrenceError::UnsupportedRecurrence`] for custom habits.
pub fn is_due_today(habit: &Habit, today: NaiveDate) -> Result<bool, RecurrenceError> {
    recurrence::is_due(habit.recurrence_rule, habit.start_date, today)
}
