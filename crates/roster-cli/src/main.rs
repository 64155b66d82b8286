//! Roster CLI - user management client
//!
//! A command-line interface for logging in to a user-management API and
//! listing, viewing, adding, updating and deleting its users.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about = "User management CLI", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format: table (default) or json
    #[arg(long, global = true, default_value = "table")]
    format: output::OutputFormat,

    /// Suppress progress messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// API base URL (or set ROSTER_API_ENDPOINT env var)
    #[arg(long, env = "ROSTER_API_ENDPOINT", global = true)]
    api_url: Option<String>,

    /// Override session file path (or set ROSTER_SESSION_PATH env var)
    #[arg(long, env = "ROSTER_SESSION_PATH", global = true)]
    session_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login(commands::auth::LoginArgs),

    /// Create a new account
    Register(commands::auth::RegisterArgs),

    /// Remove the stored session token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage users
    Users {
        #[command(subcommand)]
        action: commands::users::UsersAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    // Create context for commands
    let ctx = commands::Context {
        api_url: cli.api_url,
        session_path: cli.session_file,
        format: cli.format,
        quiet: cli.quiet,
    };

    // Execute command
    match cli.command {
        Commands::Login(args) => commands::auth::login(&ctx, args).await,
        Commands::Register(args) => commands::auth::register(&ctx, args).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await,
        Commands::Users { action } => commands::users::execute(&ctx, action).await,
        Commands::Config { action } => commands::config::execute(&ctx, action).await,
    }
}
