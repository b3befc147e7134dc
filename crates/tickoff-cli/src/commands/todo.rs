//! Todo commands for CLI.

use clap::Subcommand;
use tickoff_core::TodoPatch;

use super::{CliResult, Context};

#[derive(Subcommand)]
pub enum TodoAction {
    /// Create a new todo
    Add {
        /// Todo title
        title: String,
        /// Create it already completed
        #[arg(long)]
        done: bool,
    },
    /// List todos
    List,
    /// Mark a todo as completed
    Done {
        /// Todo ID
        id: String,
    },
    /// Mark a todo as not completed
    Undo {
        /// Todo ID
        id: String,
    },
    /// Change a todo's title
    Rename {
        /// Todo ID
        id: String,
        /// New title
        title: String,
    },
    /// Delete a todo
    Delete {
        /// Todo ID
        id: String,
    },
}

pub fn run(ctx: &Context, action: TodoAction) -> CliResult {
    let (user, tracker) = ctx.tracker()?;

    match action {
        TodoAction::Add { title, done } => {
            let update = tracker.create_todo(&user, &title, done)?;
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
        TodoAction::List => {
            let todos = tracker.list_todos(&user)?;
            println!("{}", serde_json::to_string_pretty(&todos)?);
        }
        TodoAction::Done { id } => {
            let update = tracker.update_todo(&user, &id, &TodoPatch::complete())?;
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
        TodoAction::Undo { id } => {
            let update = tracker.update_todo(&user, &id, &TodoPatch::reopen())?;
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
        TodoAction::Rename { id, title } => {
            let update = tracker.update_todo(&user, &id, &TodoPatch::rename(title))?;
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
        TodoAction::Delete { id } => {
            tracker.delete_todo(&user, &id)?;
            println!("{}", serde_json::json!({ "deleted": id }));
        }
    }
    Ok(())
}
