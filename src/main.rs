use anyhow::Result;
use clap::{Parser, Subcommand};

use taskdeck::client;
use taskdeck::config::ApiConfig;
use taskdeck::session::SessionManager;
use taskdeck::store::CredentialStore;

mod cmd;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(version, about = "Kanban board client (remote or simulated backend)")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip confirmation prompts on destructive commands
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and persist a session token
    Login {
        #[arg(short, long)]
        email: String,
        /// Password; prompted when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account (auto-logs in)
    Register {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Clear the persisted session
    Logout,
    /// Show the profile behind the current session
    Whoami,
    /// Probe the configured backend
    Ping,
    /// Run the built-in configuration and backend checks
    Selftest,
    /// Manage boards
    Board {
        #[command(subcommand)]
        command: cmd::board::BoardCommands,
    },
    /// Manage columns of a board
    Column {
        #[command(subcommand)]
        command: cmd::column::ColumnCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: cmd::task::TaskCommands,
    },
    /// Manage board members
    Member {
        #[command(subcommand)]
        command: cmd::member::MemberCommands,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "taskdeck=debug" } else { "taskdeck=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = ApiConfig::from_env()?;
    config.ensure_data_dir()?;
    let store = std::sync::Arc::new(CredentialStore::open(config.store_path())?);
    let api = client::connect(&config, store.clone())?;
    let mut session = SessionManager::new(api.clone(), store);

    let outcome = match &cli.command {
        Commands::Login { email, password } => {
            cmd::auth::cmd_login(&mut session, email, password.as_deref()).await
        }
        Commands::Register {
            name,
            email,
            password,
        } => cmd::auth::cmd_register(&mut session, name.as_deref(), email, password.as_deref()).await,
        Commands::Logout => cmd::auth::cmd_logout(&mut session),
        Commands::Whoami => cmd::auth::cmd_whoami(&mut session).await,
        Commands::Ping => cmd::probe::cmd_ping(&config, api.as_ref()).await,
        Commands::Selftest => cmd::probe::cmd_selftest(&config, api.as_ref()).await,
        Commands::Board { command } => {
            cmd::board::cmd_board(&mut session, api.as_ref(), command, cli.yes).await
        }
        Commands::Column { command } => {
            cmd::column::cmd_column(&mut session, api.as_ref(), command, cli.yes).await
        }
        Commands::Task { command } => {
            cmd::task::cmd_task(&mut session, api.as_ref(), command, cli.yes).await
        }
        Commands::Member { command } => {
            cmd::member::cmd_member(&mut session, api.as_ref(), command).await
        }
    };

    if let Err(e) = outcome {
        eprintln!("{} {}", console::style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
