//! Taakl CLI
//!
//! Admin tools for a Taakl sync server store file.
//!
//! # Commands
//!
//! - `account create` - Register an account and print its first token
//! - `account token` - Issue a fresh token for an existing account
//! - `inspect` - Display per-account record counts
//! - `export` - Write an account's full-tree snapshot to a file
//! - `import` - Import a full-tree snapshot file into an account

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Taakl sync server admin tools.
#[derive(Parser)]
#[command(name = "taakl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(global = true, short, long, default_value = "taakl.json")]
    store: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management
    #[command(subcommand)]
    Account(AccountCommands),

    /// Display per-account record counts
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write an account's full-tree snapshot to a file
    Export {
        /// Account username
        username: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Import a full-tree snapshot file into an account
    Import {
        /// Account username
        username: String,

        /// Input file
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Register an account and print its first token
    Create {
        /// Login name
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Contact address
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Issue a fresh token for an existing account
    Token {
        /// Login name
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Account(AccountCommands::Create {
            username,
            password,
            email,
        }) => {
            commands::account::create(&cli.store, &username, &password, email)?;
        }
        Commands::Account(AccountCommands::Token { username, password }) => {
            commands::account::token(&cli.store, &username, &password)?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&cli.store, &format)?;
        }
        Commands::Export { username, out } => {
            commands::transfer::export(&cli.store, &username, &out)?;
        }
        Commands::Import { username, input } => {
            commands::transfer::import(&cli.store, &username, &input)?;
        }
    }

    Ok(())
}
