//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant family:
//!
//! | Module   | Commands handled                       |
//! |----------|-----------------------------------------|
//! | `auth`   | `Login`, `Register`, `Logout`, `Whoami` |
//! | `probe`  | `Ping`, `Selftest`                      |
//! | `board`  | `Board`                                 |
//! | `column` | `Column`                                |
//! | `task`   | `Task`                                  |
//! | `member` | `Member`                                |

pub mod auth;
pub mod board;
pub mod column;
pub mod member;
pub mod probe;
pub mod task;

use anyhow::Result;
use taskdeck::session::{AuthState, SessionManager};

/// Resolve the persisted session and refuse protected commands without one.
pub async fn require_auth(session: &mut SessionManager) -> Result<()> {
    match session.initialize().await? {
        AuthState::LoggedIn(_) => Ok(()),
        _ => anyhow::bail!("Not logged in. Run `taskdeck login --email <email>` first."),
    }
}

/// Shared confirmation gate for destructive commands.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
