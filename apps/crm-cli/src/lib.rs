//! # Relay CRM Command-Line Client
//!
//! Drives the three stores from a terminal, the way the mobile screens do.
//!
//! ## Module Organization
//! ```text
//! crm_cli/
//! ├── lib.rs            ◄─── You are here (argument parsing & run)
//! ├── state/
//! │   ├── mod.rs        ◄─── AppState: config, session, stores
//! │   └── session.rs    ◄─── SQLite or in-memory session storage
//! ├── commands/
//! │   ├── mod.rs        ◄─── Output type, table rendering
//! │   ├── auth.rs       ◄─── login, register, logout, whoami, refresh
//! │   ├── customers.rs  ◄─── customers list/show/add/edit/delete
//! │   ├── leads.rs      ◄─── leads list/customer/show/add/edit/delete
//! │   ├── dashboard.rs  ◄─── pipeline summary
//! │   └── config.rs     ◄─── effective configuration
//! └── error.rs          ◄─── CliError for commands
//! ```
//!
//! ## Examples
//! ```text
//! crm login --email admin@example.com --password password123
//! crm customers list --search tech
//! crm leads list --status converted --json
//! crm dashboard --local
//! crm --backend http logout
//! ```

pub mod commands;
pub mod error;
pub mod state;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crm_core::RegisterData;
use crm_transport::{BackendKind, ClientConfig};

use commands::customers::CustomerCommand;
use commands::leads::LeadCommand;
use commands::Output;
use error::CliResult;
use state::AppState;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "crm", version, about = "Relay CRM command-line client")]
pub struct Cli {
    /// Config file (defaults to client.toml in the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Overrides the configured backend: mock or http
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Swap the session token for a fresh one
    Refresh,
    /// Customer list and form
    Customers {
        #[command(subcommand)]
        command: CustomerCommand,
    },
    /// Lead pipeline and form
    Leads {
        #[command(subcommand)]
        command: LeadCommand,
    },
    /// Pipeline summary
    Dashboard {
        /// Aggregate the fetched leads instead of asking the backend
        #[arg(long)]
        local: bool,
    },
    /// Show the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

// =============================================================================
// Run
// =============================================================================

/// Parses arguments, runs one command and prints its output.
///
/// ## Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  1. Initialize Logging ─── stderr, RUST_LOG or the default filter      │
/// │                                                                         │
/// │  2. Load Config ────────── client.toml → CRM_* env → --backend         │
/// │                                                                         │
/// │  3. Connect ────────────── session storage, backend, store actors,     │
/// │                            restore the saved sign-in                   │
/// │                                                                         │
/// │  4. Execute ────────────── one store operation                         │
/// │                                                                         │
/// │  5. Shut Down ──────────── stop actors, close the session database     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let as_json = cli.json;
    match execute(cli).await {
        Ok(output) => {
            println!("{}", output.render(as_json)?);
            Ok(())
        }
        Err(err) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&err)?);
            }
            Err(err.into())
        }
    }
}

/// Runs `cli` against a freshly connected [`AppState`].
pub async fn execute(cli: Cli) -> CliResult<Output> {
    let mut config = ClientConfig::load(cli.config.clone())?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    if let Command::Config { save } = cli.command {
        return commands::config::show(&config, save, cli.config);
    }

    info!(backend = %config.backend, "Starting Relay CRM client");
    let state = AppState::connect(config).await?;
    let result = dispatch(&state, cli.command).await;
    state.shutdown().await?;
    result
}

/// Routes one parsed command to its handler.
pub async fn dispatch(state: &AppState, command: Command) -> CliResult<Output> {
    match command {
        Command::Login { email, password } => commands::auth::login(state, email, password).await,
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let data = RegisterData {
                name,
                email,
                password,
                confirm_password,
            };
            commands::auth::register(state, data).await
        }
        Command::Logout => commands::auth::logout(state).await,
        Command::Whoami => commands::auth::whoami(state),
        Command::Refresh => commands::auth::refresh(state).await,
        Command::Customers { command } => commands::customers::execute(state, command).await,
        Command::Leads { command } => commands::leads::execute(state, command).await,
        Command::Dashboard { local } => commands::dashboard::execute(state, local).await,
        Command::Config { save } => commands::config::show(&state.config, save, None),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=crm_store=trace` - Trace the store actors only
/// - Default: INFO, DEBUG for the crm crates
///
/// Logs go to stderr so stdout stays parseable with `--json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,crm=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
