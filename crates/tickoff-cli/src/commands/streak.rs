use clap::Subcommand;

use super::{CliResult, Context};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show the current streak
    Show,
    /// Record a completion without a todo
    Complete,
}

pub fn run(ctx: &Context, action: StreakAction) -> CliResult {
    let (user, tracker) = ctx.tracker()?;

    let view = match action {
        StreakAction::Show => tracker.status(&user)?,
        StreakAction::Complete => tracker.record_completion(&user)?,
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
