//! Streak and today-view commands for CLI.

use habitual_core::HabitKey;

use super::{print_json, Context};

pub fn streak(ctx: &Context, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let report = ctx.tracker()?.streak(&ctx.owner, &HabitKey::new(key))?;
    print_json(&report)
}

pub fn today(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let due = ctx.tracker()?.due_today(&ctx.owner)?;
    print_json(&due)
}

pub fn report(ctx: &Context, include_untracked: bool) -> Result<(), Box<dyn std::error::Error>> {
    let statuses = ctx.tracker()?.report(&ctx.owner, include_untracked)?;
    print_json(&statuses)
}
