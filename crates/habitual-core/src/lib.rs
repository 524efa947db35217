//! # Habitual Core Library
//!
//! This library provides the core logic for the Habitual habit tracker:
//! deciding which days a habit is due and how long its current streak is.
//! The CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Recurrence Engine**: pure calendar arithmetic for daily, weekly,
//!   biweekly, and monthly cadences
//! - **Streak Calculator**: walks occurrences backward from an injected
//!   "today", applying binary, countable, or limit value semantics
//! - **Storage**: SQLite-based habit and completion storage and TOML-based
//!   configuration
//! - **Tracker**: wires a store and a clock to the engine, evaluating habits
//!   independently in batches
//!
//! ## Key Components
//!
//! - [`StreakCalculator`]: streak computation over completion snapshots
//! - [`HabitDb`]: habit and completion persistence
//! - [`HabitTracker`]: today view and per-owner reports
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod habit;
pub mod recurrence;
pub mod storage;
pub mod streak;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, RecurrenceError, ValidationError};
pub use habit::{CompletionEvent, Habit, HabitKey, OwnerKey, RecurrenceRule, ValueKind};
pub use storage::{Config, HabitDb, HabitStore, NewHabit, Toggle};
pub use streak::{is_due_today, StreakCalculator, StreakConfig, StreakReport};
pub use tracker::{HabitStatus, HabitTracker};
