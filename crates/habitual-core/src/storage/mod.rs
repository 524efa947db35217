mod config;
pub mod database;
pub mod migrations;

pub use config::{ClockConfig, Config, LogConfig, OwnerConfig};
pub use database::{HabitDb, NewHabit, Toggle};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::habit::{CompletionEvent, Habit, HabitKey, OwnerKey};

/// Read side of habit storage, as consumed by the tracker.
///
/// Completions may be returned in any order.
pub trait HabitStore {
    /// Load one habit.
    ///
    /// # Errors
    /// Returns `CoreError::HabitNotFound` if the owner has no such habit.
    fn load_habit(&self, owner: &OwnerKey, habit: &HabitKey) -> Result<Habit>;

    /// Load every completion recorded for one habit.
    fn load_completions(&self, owner: &OwnerKey, habit: &HabitKey)
        -> Result<Vec<CompletionEvent>>;

    /// Load all habits of an owner, tracked or not.
    fn list_habits(&self, owner: &OwnerKey) -> Result<Vec<Habit>>;
}

/// Returns the data directory.
///
/// `HABITUAL_HOME` wins when set. Otherwise `~/.config/habitual[-dev]/`,
/// with `HABITUAL_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITUAL_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::DataDir("home directory not found".to_string()))?
                .join(".config");

            let env = std::env::var("HABITUAL_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("habitual-dev")
            } else {
                base_dir.join("habitual")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
