//! Task commands: add, edit, move, delete.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use taskdeck::client::BoardApi;
use taskdeck::models::{Tag, TaskPatch};
use taskdeck::session::SessionManager;

use super::{confirm, require_auth};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a task to a column (assigned to you by default)
    Add {
        /// Column id
        column: i64,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Ordering key; defaults to the end of the column
        #[arg(short, long)]
        position: Option<i64>,
    },
    /// Update fields of a task; omitted fields are untouched
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        position: Option<i64>,
        /// Assign to a member id
        #[arg(long, conflicts_with = "unassign")]
        assignee: Option<i64>,
        /// Clear the assignee
        #[arg(long)]
        unassign: bool,
        /// Replace the tag list (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
    },
    /// Move a task to another column (no renumbering happens)
    Move {
        id: i64,
        /// Target column id
        column: i64,
    },
    /// Delete a task
    Delete { id: i64 },
}

pub async fn cmd_task(
    session: &mut SessionManager,
    api: &dyn BoardApi,
    command: &TaskCommands,
    yes: bool,
) -> Result<()> {
    require_auth(session).await?;

    match command {
        TaskCommands::Add {
            column,
            title,
            description,
            position,
        } => {
            let task = api
                .create_task(*column, title, description.as_deref(), *position)
                .await?;
            println!(
                "{} task {} ({}) in column {}",
                style("Created").green(),
                task.title,
                task.id,
                task.column_id
            );
        }
        TaskCommands::Edit {
            id,
            title,
            description,
            position,
            assignee,
            unassign,
            tags,
        } => {
            let patch = TaskPatch {
                title: title.clone(),
                description: description.clone(),
                column_id: None,
                position: *position,
                assignee_id: if *unassign {
                    Some(None)
                } else {
                    assignee.map(Some)
                },
                tags: tags.as_ref().map(|names| {
                    names
                        .iter()
                        .map(|name| Tag { name: name.clone() })
                        .collect()
                }),
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update; pass at least one field flag.");
            }
            let task = api.update_task(*id, patch).await?;
            println!("{} task {} ({})", style("Updated").green(), task.id, task.title);
        }
        TaskCommands::Move { id, column } => {
            let task = api.update_task(*id, TaskPatch::move_to(*column)).await?;
            println!(
                "{} task {} to column {}",
                style("Moved").green(),
                task.id,
                task.column_id
            );
        }
        TaskCommands::Delete { id } => {
            if !confirm(&format!("Delete task {}?", id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            api.delete_task(*id).await?;
            println!("{} task {}", style("Deleted").green(), id);
        }
    }
    Ok(())
}
