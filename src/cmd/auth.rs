//! Session commands: `login`, `register`, `logout`, `whoami`.

use anyhow::Result;
use console::style;

use taskdeck::session::{AuthState, SessionManager};

fn read_password(password: Option<&str>) -> Result<String> {
    match password {
        Some(p) => Ok(p.to_string()),
        None => Ok(dialoguer::Password::new()
            .with_prompt("Password")
            .interact()?),
    }
}

pub async fn cmd_login(
    session: &mut SessionManager,
    email: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = read_password(password)?;
    let user = session.login(email, &password).await?;
    println!(
        "{} {} <{}> ({})",
        style("Logged in as").green(),
        style(&user.name).bold(),
        user.email,
        user.role
    );
    Ok(())
}

pub async fn cmd_register(
    session: &mut SessionManager,
    name: Option<&str>,
    email: &str,
    password: Option<&str>,
) -> Result<()> {
    let password = read_password(password)?;
    let user = session
        .register(name.unwrap_or_default(), email, &password)
        .await?;
    println!(
        "{} {} <{}>",
        style("Registered and logged in as").green(),
        style(&user.name).bold(),
        user.email
    );
    Ok(())
}

pub fn cmd_logout(session: &mut SessionManager) -> Result<()> {
    session.logout()?;
    println!("{}", style("Logged out.").green());
    Ok(())
}

pub async fn cmd_whoami(session: &mut SessionManager) -> Result<()> {
    match session.initialize().await? {
        AuthState::LoggedIn(user) => {
            println!(
                "{} <{}>  id={}  role={}",
                style(&user.name).bold(),
                user.email,
                user.id,
                user.role
            );
            Ok(())
        }
        _ => anyhow::bail!("Not logged in."),
    }
}
