//! CLI subcommands.

pub mod complete;
pub mod config;
pub mod habit;
pub mod streak;

use chrono::{DateTime, FixedOffset, NaiveDate};
use habitual_core::{Clock, Config, FixedClock, HabitDb, HabitTracker, OwnerKey, SystemClock};
use habitual_core::{StreakCalculator, ValidationError};
use serde::Serialize;

/// Shared state for one CLI invocation.
pub struct Context {
    pub config: Config,
    pub owner: OwnerKey,
    /// One reading of the clock, so every command sees the same "today".
    clock: FixedClock,
}

impl Context {
    pub fn new(
        config: Config,
        owner: Option<String>,
        today: Option<NaiveDate>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let owner = match owner {
            Some(o) if o.trim().is_empty() => {
                return Err(ValidationError::InvalidValue {
                    field: "owner".to_string(),
                    message: "owner key must not be empty".to_string(),
                }
                .into());
            }
            Some(o) => OwnerKey::new(o.trim()),
            None => config.default_owner(),
        };
        let offset = config.utc_offset();
        let clock = match today {
            Some(date) => FixedClock::on_with_offset(date, offset),
            None => FixedClock::at(SystemClock::new(offset).now()),
        };
        Ok(Self {
            config,
            owner,
            clock,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Noon on `date` in the reference offset.
    pub fn noon_on(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        FixedClock::on_with_offset(date, self.config.utc_offset()).now()
    }

    pub fn tracker(&self) -> Result<HabitTracker<HabitDb, FixedClock>, Box<dyn std::error::Error>> {
        let db = HabitDb::open()?;
        let calculator = StreakCalculator::with_config(self.config.streak);
        Ok(HabitTracker::with_calculator(db, self.clock, calculator))
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
