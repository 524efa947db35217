//! Completion commands for CLI.

use chrono::NaiveDate;
use habitual_core::{HabitKey, Toggle};

use super::{print_json, Context};

/// Record a completion on `on` (noon in the reference offset) or now.
pub fn record(
    ctx: &Context,
    key: &str,
    value: Option<i64>,
    on: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let at = on.map_or_else(|| ctx.now(), |date| ctx.noon_on(date));
    let completion = tracker
        .store()
        .record_completion(&ctx.owner, &HabitKey::new(key), at, value)?;
    eprintln!("Completion recorded: {key} on {}", completion.date());
    print_json(&completion)
}

/// Check or uncheck a binary habit for today.
pub fn toggle(ctx: &Context, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = ctx.tracker()?;
    let outcome = tracker
        .store()
        .toggle_completion(&ctx.owner, &HabitKey::new(key), ctx.now())?;
    match outcome {
        Toggle::Checked(completion) => {
            eprintln!("Habit checked for {}", completion.date());
            print_json(&serde_json::json!({ "checked": true, "completion": completion }))
        }
        Toggle::Unchecked => {
            eprintln!("Habit unchecked for {}", ctx.today());
            print_json(&serde_json::json!({ "checked": false }))
        }
    }
}
