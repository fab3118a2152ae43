//! Board commands: list, create, rename, delete, show.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use taskdeck::client::BoardApi;
use taskdeck::models::BoardDetail;
use taskdeck::session::SessionManager;

use super::{confirm, require_auth};

#[derive(Subcommand)]
pub enum BoardCommands {
    /// List all visible boards
    List,
    /// Create a board
    Create { name: String },
    /// Rename a board
    Rename { id: i64, name: String },
    /// Delete a board (its columns and tasks go with it)
    Delete { id: i64 },
    /// Show a board with its columns, tasks and members
    Show { id: i64 },
}

pub async fn cmd_board(
    session: &mut SessionManager,
    api: &dyn BoardApi,
    command: &BoardCommands,
    yes: bool,
) -> Result<()> {
    require_auth(session).await?;

    match command {
        BoardCommands::List => {
            let boards = api.list_boards().await?;
            if boards.is_empty() {
                println!("No boards. Create one with `taskdeck board create <name>`.");
            }
            for board in boards {
                println!("{:>6}  {}", style(board.id).dim(), board.name);
            }
        }
        BoardCommands::Create { name } => {
            let board = api.create_board(name).await?;
            println!("{} board {} ({})", style("Created").green(), board.name, board.id);
        }
        BoardCommands::Rename { id, name } => {
            let board = api.rename_board(*id, name).await?;
            println!("{} board {} to {}", style("Renamed").green(), board.id, board.name);
        }
        BoardCommands::Delete { id } => {
            if !confirm(&format!("Delete board {} and all its tasks?", id), yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            api.delete_board(*id).await?;
            println!("{} board {}", style("Deleted").green(), id);
        }
        BoardCommands::Show { id } => {
            let detail = api.board_detail(*id).await?;
            render_detail(&detail);
        }
    }
    Ok(())
}

/// Columns left-to-right by position; tasks within a column by
/// (position, id). The sort lives here; the backend never reorders.
fn render_detail(detail: &BoardDetail) {
    println!(
        "{} {}",
        style(&detail.board.name).bold().underlined(),
        style(format!("(board {})", detail.board.id)).dim()
    );

    let members: Vec<String> = detail
        .members
        .iter()
        .map(|m| format!("{} ({})", m.name, m.role))
        .collect();
    println!("members: {}", members.join(", "));

    for column in detail.columns_sorted() {
        println!();
        println!(
            "{} {}",
            style(&column.name).cyan().bold(),
            style(format!("[column {}]", column.id)).dim()
        );
        let tasks = detail.tasks_in_column(column.id);
        if tasks.is_empty() {
            println!("  {}", style("(empty)").dim());
        }
        for task in tasks {
            let assignee = task
                .assignee_id
                .and_then(|id| detail.member_by_id(id))
                .map(|m| format!(" @{}", m.name))
                .unwrap_or_default();
            let tags = if task.tags.is_empty() {
                String::new()
            } else {
                let names: Vec<&str> = task.tags.iter().map(|t| t.name.as_str()).collect();
                format!(" [{}]", names.join(", "))
            };
            println!(
                "  {:>6}  {}{}{}",
                style(task.id).dim(),
                task.title,
                style(tags).magenta(),
                style(assignee).dim()
            );
            if !task.description.is_empty() {
                println!("          {}", style(&task.description).dim());
            }
        }
    }
}
