//! Column commands: add, rename, delete.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use taskdeck::client::BoardApi;
use taskdeck::session::SessionManager;

use super::{confirm, require_auth};

#[derive(Subcommand)]
pub enum ColumnCommands {
    /// Add a column to a board
    Add {
        /// Board id
        board: i64,
        name: String,
        /// Ordering key; defaults to the board's current column count
        #[arg(short, long)]
        position: Option<i64>,
    },
    /// Rename a column
    Rename { id: i64, name: String },
    /// Delete a column and its tasks
    Delete { id: i64 },
}

pub async fn cmd_column(
    session: &mut SessionManager,
    api: &dyn BoardApi,
    command: &ColumnCommands,
    yes: bool,
) -> Result<()> {
    require_auth(session).await?;

    match command {
        ColumnCommands::Add {
            board,
            name,
            position,
        } => {
            let column = api.create_column(*board, name, *position).await?;
            println!(
                "{} column {} ({}) at position {}",
                style("Created").green(),
                column.name,
                column.id,
                column.position
            );
        }
        ColumnCommands::Rename { id, name } => {
            let column = api.rename_column(*id, name).await?;
            println!("{} column {} to {}", style("Renamed").green(), column.id, column.name);
        }
        ColumnCommands::Delete { id } => {
            if !confirm(&format!("Delete column {} and all its tasks?", id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            api.delete_column(*id).await?;
            println!("{} column {}", style("Deleted").green(), id);
        }
    }
    Ok(())
}
