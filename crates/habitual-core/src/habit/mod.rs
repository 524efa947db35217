//! Habit and completion types.
//!
//! These are read-only snapshots handed to the engine by the storage layer.
//! The engine never creates, persists, or mutates them.

mod value;

pub use value::{aggregate_by_date, DayTally, Satisfaction};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque tenant/user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerKey(String);

/// Opaque habit identifier, unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitKey(String);

macro_rules! opaque_key {
    ($ty:ident) => {
        impl $ty {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(key: &str) -> Self {
                Self(key.to_string())
            }
        }
    };
}

opaque_key!(OwnerKey);
opaque_key!(HabitKey);

/// Recurrence cadence of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceRule {
    /// Every day from the start date
    Daily,
    /// Same weekday as the start date
    Weekly,
    /// Every other week, anchored on the start date
    Biweekly,
    /// Same day of month as the start date, clamped to month end
    Monthly,
    /// Stored but not computable
    Custom,
}

impl RecurrenceRule {
    pub const ALL: [RecurrenceRule; 5] = [
        RecurrenceRule::Daily,
        RecurrenceRule::Weekly,
        RecurrenceRule::Biweekly,
        RecurrenceRule::Monthly,
        RecurrenceRule::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceRule::Daily => "daily",
            RecurrenceRule::Weekly => "weekly",
            RecurrenceRule::Biweekly => "biweekly",
            RecurrenceRule::Monthly => "monthly",
            RecurrenceRule::Custom => "custom",
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceRule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecurrenceRule::ALL
            .into_iter()
            .find(|rule| rule.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "recurrence_rule".to_string(),
                message: format!("unknown recurrence '{s}'"),
            })
    }
}

/// How completion values decide whether a day counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Done or not done; values are ignored
    Binary,
    /// Daily sum must reach the target
    Countable,
    /// Daily sum must stay under the target
    Limit,
}

impl ValueKind {
    pub const ALL: [ValueKind; 3] = [ValueKind::Binary, ValueKind::Countable, ValueKind::Limit];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Binary => "binary",
            ValueKind::Countable => "countable",
            ValueKind::Limit => "limit",
        }
    }
}

impl Default for ValueKind {
    fn default() -> Self {
        ValueKind::Binary
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "value_kind".to_string(),
                message: format!("unknown value kind '{s}'"),
            })
    }
}

/// A recurring habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub owner: OwnerKey,
    pub key: HabitKey,
    pub name: String,
    pub recurrence_rule: RecurrenceRule,
    /// No occurrence exists before this date.
    pub start_date: NaiveDate,
    #[serde(default)]
    pub value_kind: ValueKind,
    /// Minimum daily sum (countable) or ceiling (limit).
    #[serde(default)]
    pub target: Option<i64>,
    /// Untracked habits are hidden from the due-today view. The engine ignores this flag.
    #[serde(default = "default_tracked")]
    pub tracked: bool,
    pub created_at: DateTime<Utc>,
}

fn default_tracked() -> bool {
    true
}

/// A single completion record for one habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub habit: HabitKey,
    /// Only the calendar date (in the recorded offset) matters to the engine.
    pub occurred_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub value: Option<i64>,
}

impl CompletionEvent {
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }
}
