//! Member commands: list, invite.

use anyhow::Result;
use clap::Subcommand;
use console::style;

use taskdeck::client::BoardApi;
use taskdeck::models::Role;
use taskdeck::session::SessionManager;

use super::require_auth;

#[derive(Subcommand)]
pub enum MemberCommands {
    /// List members of a board
    List {
        /// Board id
        board: i64,
    },
    /// Invite a member by email (duplicates are not rejected)
    Invite {
        /// Board id
        board: i64,
        email: String,
        /// owner or member
        #[arg(short, long, default_value = "member")]
        role: Role,
    },
}

pub async fn cmd_member(
    session: &mut SessionManager,
    api: &dyn BoardApi,
    command: &MemberCommands,
) -> Result<()> {
    require_auth(session).await?;

    match command {
        MemberCommands::List { board } => {
            let members = api.list_members(*board).await?;
            for member in members {
                println!(
                    "{:>6}  {} <{}>  {}",
                    style(member.id).dim(),
                    member.name,
                    member.email,
                    style(member.role).cyan()
                );
            }
        }
        MemberCommands::Invite { board, email, role } => {
            api.invite_member(*board, email, *role).await?;
            println!(
                "{} {} to board {} as {}",
                style("Invited").green(),
                email,
                board,
                role
            );
        }
    }
    Ok(())
}
