//! SQLite-based habit and completion storage.
//!
//! Provides persistent storage for:
//! - Habits, keyed by owner and habit key
//! - Completion events, optionally carrying a value
//! - Soft deletion through the `tracked` flag

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{data_dir, migrations, HabitStore};
use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::habit::{CompletionEvent, Habit, HabitKey, OwnerKey, RecurrenceRule, ValueKind};

/// Input for [`HabitDb::create_habit`].
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub owner: OwnerKey,
    /// Generated when absent.
    pub key: Option<HabitKey>,
    pub name: String,
    pub recurrence_rule: RecurrenceRule,
    pub value_kind: ValueKind,
    pub target: Option<i64>,
    pub start_date: NaiveDate,
}

/// Outcome of toggling a binary habit for a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Checked(CompletionEvent),
    Unchecked,
}

const HABIT_COLUMNS: &str =
    "owner, key, name, recurrence_rule, start_date, value_kind, target, tracked, created_at";

struct HabitRow {
    owner: String,
    key: String,
    name: String,
    recurrence_rule: String,
    start_date: String,
    value_kind: String,
    target: Option<i64>,
    tracked: bool,
    created_at: String,
}

impl HabitRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            owner: row.get(0)?,
            key: row.get(1)?,
            name: row.get(2)?,
            recurrence_rule: row.get(3)?,
            start_date: row.get(4)?,
            value_kind: row.get(5)?,
            target: row.get(6)?,
            tracked: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_habit(self) -> Result<Habit> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            table: "habits",
            message,
        };

        let recurrence_rule = self
            .recurrence_rule
            .parse::<RecurrenceRule>()
            .map_err(|e| corrupt(e.to_string()))?;
        let value_kind = self
            .value_kind
            .parse::<ValueKind>()
            .map_err(|e| corrupt(e.to_string()))?;
        let start_date = self
            .start_date
            .parse::<NaiveDate>()
            .map_err(|e| corrupt(format!("start_date '{}': {e}", self.start_date)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt(format!("created_at '{}': {e}", self.created_at)))?;

        Ok(Habit {
            owner: OwnerKey::new(self.owner),
            key: HabitKey::new(self.key),
            name: self.name,
            recurrence_rule,
            start_date,
            value_kind,
            target: self.target,
            tracked: self.tracked,
            created_at,
        })
    }
}

fn completion_from_parts(
    habit: &HabitKey,
    occurred_at: &str,
    value: Option<i64>,
) -> Result<CompletionEvent> {
    let occurred_at =
        DateTime::parse_from_rfc3339(occurred_at).map_err(|e| DatabaseError::CorruptRow {
            table: "completions",
            message: format!("occurred_at '{occurred_at}': {e}"),
        })?;
    Ok(CompletionEvent {
        habit: habit.clone(),
        occurred_at,
        value,
    })
}

/// SQLite database for habit storage.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Open the database at `<data_dir>/habitual.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("habitual.db"))
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn habit_exists(&self, owner: &OwnerKey, key: &HabitKey) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM habits WHERE owner = ?1 AND key = ?2",
                params![owner.as_str(), key.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Create a habit.
    ///
    /// # Errors
    /// Returns a validation error for an empty name, a negative target, or a
    /// key already used by this owner.
    pub fn create_habit(&self, new: NewHabit) -> Result<Habit> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".to_string(),
                message: "habit name must not be empty".to_string(),
            }
            .into());
        }
        if let Some(target) = new.target.filter(|t| *t < 0) {
            return Err(ValidationError::InvalidTarget { target }.into());
        }

        let key = new
            .key
            .unwrap_or_else(|| HabitKey::new(Uuid::new_v4().to_string()));
        if self.habit_exists(&new.owner, &key)? {
            return Err(ValidationError::InvalidValue {
                field: "key".to_string(),
                message: format!("habit '{key}' already exists"),
            }
            .into());
        }

        let habit = Habit {
            owner: new.owner,
            key,
            name: name.to_string(),
            recurrence_rule: new.recurrence_rule,
            start_date: new.start_date,
            value_kind: new.value_kind,
            target: new.target,
            tracked: true,
            created_at: Utc::now(),
        };

        self.conn.execute(
            &format!("INSERT INTO habits ({HABIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                habit.owner.as_str(),
                habit.key.as_str(),
                habit.name,
                habit.recurrence_rule.as_str(),
                habit.start_date.to_string(),
                habit.value_kind.as_str(),
                habit.target,
                habit.tracked,
                habit.created_at.to_rfc3339(),
            ],
        )?;

        tracing::info!(owner = %habit.owner, habit = %habit.key, rule = %habit.recurrence_rule, "habit created");
        Ok(habit)
    }

    /// Track or untrack a habit. Untracking is a soft delete: the habit and
    /// its completions stay in storage.
    ///
    /// # Errors
    /// Returns `CoreError::HabitNotFound` if the habit does not exist.
    pub fn set_tracked(&self, owner: &OwnerKey, key: &HabitKey, tracked: bool) -> Result<Habit> {
        let updated = self.conn.execute(
            "UPDATE habits SET tracked = ?3 WHERE owner = ?1 AND key = ?2",
            params![owner.as_str(), key.as_str(), tracked],
        )?;
        if updated == 0 {
            return Err(not_found(owner, key));
        }
        tracing::info!(%owner, habit = %key, tracked, "habit tracking changed");
        self.load_habit(owner, key)
    }

    /// Record a completion.
    ///
    /// # Errors
    /// Returns `CoreError::HabitNotFound` if the habit does not exist.
    pub fn record_completion(
        &self,
        owner: &OwnerKey,
        key: &HabitKey,
        occurred_at: DateTime<FixedOffset>,
        value: Option<i64>,
    ) -> Result<CompletionEvent> {
        if !self.habit_exists(owner, key)? {
            return Err(not_found(owner, key));
        }
        Self::insert_completion(&self.conn, owner, key, occurred_at, value)
    }

    fn insert_completion(
        conn: &Connection,
        owner: &OwnerKey,
        key: &HabitKey,
        occurred_at: DateTime<FixedOffset>,
        value: Option<i64>,
    ) -> Result<CompletionEvent> {
        conn.execute(
            "INSERT INTO completions (owner, habit_key, occurred_at, local_date, value)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                owner.as_str(),
                key.as_str(),
                occurred_at.to_rfc3339(),
                occurred_at.date_naive().to_string(),
                value,
            ],
        )?;
        tracing::info!(%owner, habit = %key, at = %occurred_at, ?value, "completion recorded");
        Ok(CompletionEvent {
            habit: key.clone(),
            occurred_at,
            value,
        })
    }

    /// Check or uncheck a binary habit for the calendar day of `at`.
    ///
    /// A day holds at most one completion: toggling a checked day removes
    /// its completion, toggling an unchecked day records one.
    ///
    /// # Errors
    /// Returns `CoreError::HabitNotFound` for unknown habits and a
    /// validation error for countable and limit habits.
    pub fn toggle_completion(
        &self,
        owner: &OwnerKey,
        key: &HabitKey,
        at: DateTime<FixedOffset>,
    ) -> Result<Toggle> {
        let habit = self.load_habit(owner, key)?;
        if habit.value_kind != ValueKind::Binary {
            return Err(ValidationError::UnsupportedOperation(format!(
                "toggle supports binary habits only; '{key}' is {}",
                habit.value_kind
            ))
            .into());
        }

        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM completions WHERE owner = ?1 AND habit_key = ?2 AND local_date = ?3",
            params![owner.as_str(), key.as_str(), at.date_naive().to_string()],
        )?;
        let outcome = if removed > 0 {
            tracing::info!(%owner, habit = %key, date = %at.date_naive(), "habit unchecked");
            Toggle::Unchecked
        } else {
            Toggle::Checked(Self::insert_completion(&tx, owner, key, at, None)?)
        };
        tx.commit()?;
        Ok(outcome)
    }

    /// Completions recorded on one local calendar date.
    pub fn completions_on(
        &self,
        owner: &OwnerKey,
        key: &HabitKey,
        date: NaiveDate,
    ) -> Result<Vec<CompletionEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT occurred_at, value FROM completions
             WHERE owner = ?1 AND habit_key = ?2 AND local_date = ?3
             ORDER BY occurred_at",
        )?;
        let rows = stmt.query_map(
            params![owner.as_str(), key.as_str(), date.to_string()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)),
        )?;

        let mut completions = Vec::new();
        for row in rows {
            let (occurred_at, value) = row?;
            completions.push(completion_from_parts(key, &occurred_at, value)?);
        }
        Ok(completions)
    }

    /// Completion history of one habit, oldest first.
    ///
    /// With `on`, only completions whose local date is `on` are returned.
    ///
    /// # Errors
    /// Returns `CoreError::HabitNotFound` if the habit does not exist.
    pub fn completion_history(
        &self,
        owner: &OwnerKey,
        key: &HabitKey,
        on: Option<NaiveDate>,
    ) -> Result<Vec<CompletionEvent>> {
        if !self.habit_exists(owner, key)? {
            return Err(not_found(owner, key));
        }
        let mut completions = match on {
            Some(date) => self.completions_on(owner, key, date)?,
            None => self.load_completions(owner, key)?,
        };
        completions.sort_by_key(|c| c.occurred_at);
        Ok(completions)
    }
}

fn not_found(owner: &OwnerKey, key: &HabitKey) -> CoreError {
    CoreError::HabitNotFound {
        owner: owner.clone(),
        habit: key.clone(),
    }
}

impl HabitStore for HabitDb {
    fn load_habit(&self, owner: &OwnerKey, habit: &HabitKey) -> Result<Habit> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE owner = ?1 AND key = ?2"),
                params![owner.as_str(), habit.as_str()],
                HabitRow::from_row,
            )
            .optional()?;
        row.ok_or_else(|| not_found(owner, habit))?.into_habit()
    }

    fn load_completions(
        &self,
        owner: &OwnerKey,
        habit: &HabitKey,
    ) -> Result<Vec<CompletionEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT occurred_at, value FROM completions
             WHERE owner = ?1 AND habit_key = ?2",
        )?;
        let rows = stmt.query_map(params![owner.as_str(), habit.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?))
        })?;

        let mut completions = Vec::new();
        for row in rows {
            let (occurred_at, value) = row?;
            completions.push(completion_from_parts(habit, &occurred_at, value)?);
        }
        Ok(completions)
    }

    fn list_habits(&self, owner: &OwnerKey) -> Result<Vec<Habit>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE owner = ?1 ORDER BY created_at, key"
        ))?;
        let rows = stmt.query_map(params![owner.as_str()], HabitRow::from_row)?;

        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?.into_habit()?);
        }
        Ok(habits)
    }
}
