//! Habit management commands for CLI.

use chrono::{Days, NaiveDate};
use clap::Subcommand;
use habitual_core::{HabitKey, HabitStore, NewHabit, RecurrenceRule, ValueKind};

use super::{print_json, Context};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Create {
        /// Habit name
        name: String,
        /// Recurrence: daily, weekly, biweekly, monthly, or custom
        #[arg(long, default_value = "daily")]
        rule: RecurrenceRule,
        /// Value kind: binary, countable, or limit
        #[arg(long, default_value = "binary")]
        kind: ValueKind,
        /// Minimum daily sum (countable) or ceiling (limit)
        #[arg(long, allow_negative_numbers = true)]
        target: Option<i64>,
        /// First occurrence (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Habit key (generated when omitted)
        #[arg(long)]
        key: Option<String>,
    },
    /// List habits
    List {
        /// Include untracked habits
        #[arg(long)]
        all: bool,
    },
    /// Get habit details
    Get {
        /// Habit key
        key: String,
    },
    /// Stop tracking a habit (kept in storage)
    Untrack {
        /// Habit key
        key: String,
    },
    /// Resume tracking a habit
    Track {
        /// Habit key
        key: String,
    },
    /// List recorded completions, oldest first
    Completions {
        /// Habit key
        key: String,
        /// Only completions on this date
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// List occurrence dates
    Schedule {
        /// Habit key
        key: String,
        /// Window start (defaults to today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Window end (defaults to 30 days after the start)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

pub fn run(action: HabitAction, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let db = tracker.store();

    match action {
        HabitAction::Create {
            name,
            rule,
            kind,
            target,
            start,
            key,
        } => {
            let habit = db.create_habit(NewHabit {
                owner: ctx.owner.clone(),
                key: key.map(HabitKey::new),
                name,
                recurrence_rule: rule,
                value_kind: kind,
                target,
                start_date: start.unwrap_or_else(|| ctx.today()),
            })?;
            eprintln!("Habit created: {}", habit.key);
            print_json(&habit)?;
        }
        HabitAction::List { all } => {
            let habits: Vec<_> = db
                .list_habits(&ctx.owner)?
                .into_iter()
                .filter(|habit| all || habit.tracked)
                .collect();
            print_json(&habits)?;
        }
        HabitAction::Get { key } => {
            let habit = db.load_habit(&ctx.owner, &HabitKey::new(key))?;
            print_json(&habit)?;
        }
        HabitAction::Untrack { key } => {
            let habit = db.set_tracked(&ctx.owner, &HabitKey::new(key), false)?;
            eprintln!("Habit untracked: {}", habit.key);
            print_json(&habit)?;
        }
        HabitAction::Track { key } => {
            let habit = db.set_tracked(&ctx.owner, &HabitKey::new(key), true)?;
            eprintln!("Habit tracked: {}", habit.key);
            print_json(&habit)?;
        }
        HabitAction::Completions { key, on } => {
            let history = db.completion_history(&ctx.owner, &HabitKey::new(key), on)?;
            print_json(&history)?;
        }
        HabitAction::Schedule { key, from, to } => {
            let from = from.unwrap_or_else(|| ctx.today());
            let to = match to {
                Some(to) => to,
                None => from
                    .checked_add_days(Days::new(30))
                    .ok_or("window end out of range")?,
            };
            if to < from {
                return Err(format!("--to ({to}) is before --from ({from})").into());
            }
            let dates = tracker.schedule(&ctx.owner, &HabitKey::new(key), from, to)?;
            print_json(&dates)?;
        }
    }
    Ok(())
}
