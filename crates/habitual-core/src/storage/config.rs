//! TOML-based application configuration.
//!
//! Stores:
//! - The default owner key used when none is given
//! - The reference UTC offset that decides what "today" is
//! - Streak walking policy
//! - The default log level
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::habit::OwnerKey;
use crate::streak::StreakConfig;

const MAX_OFFSET_MINUTES: i32 = 18 * 60;
const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Owner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    #[serde(default = "default_owner")]
    pub default_owner: String,
}

/// Reference clock configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Minutes east of UTC used for "today" and for stamping completions.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub owner: OwnerConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_owner() -> String {
    "local".into()
}
fn default_log_level() -> String {
    "warn".into()
}

impl Default for OwnerConfig {
    fn default() -> Self {
        Self {
            default_owner: default_owner(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::Number(
                    value
                        .parse::<i64>()
                        .map_err(|e| invalid(format!("cannot parse '{value}' as integer: {e}")))?
                        .into(),
                ),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole section".to_string()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Location of the config file inside the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be resolved.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, holds invalid
    /// values, or the defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(ConfigError::InvalidValue {
                key: "clock.utc_offset_minutes".to_string(),
                message: format!(
                    "{} is outside -{MAX_OFFSET_MINUTES}..={MAX_OFFSET_MINUTES}",
                    self.clock.utc_offset_minutes
                ),
            });
        }
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "log.level".to_string(),
                message: format!("'{}' is not one of {}", self.log.level, LOG_LEVELS.join(", ")),
            });
        }
        if self.owner.default_owner.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "owner.default_owner".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value is invalid, or the
    /// config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn default_owner(&self) -> OwnerKey {
        OwnerKey::new(self.owner.default_owner.trim())
    }

    /// Reference offset for "today". Out-of-range values fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clock.utc_offset_minutes * 60).unwrap_or(Utc.fix())
    }
}
