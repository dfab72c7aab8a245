//! Greenhouse CLI - Order mirror database tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending order mirror migrations
//! gh-cli migrate run
//!
//! # List the migrations bundled with this binary
//! gh-cli migrate list
//! ```
//!
//! # Commands
//!
//! - `migrate run` - Apply migrations to the mirror database
//! - `migrate list` - Show bundled migrations without connecting

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gh-cli")]
#[command(author, version, about = "Greenhouse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Order mirror database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply pending migrations
    Run {
        /// Database URL (defaults to `STOREFRONT_DATABASE_URL`, then `DATABASE_URL`)
        #[arg(long)]
        database_url: Option<String>,
    },
    /// List bundled migrations
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { action } => match action {
            MigrateAction::Run { database_url } => {
                commands::migrate::run(database_url).await?;
            }
            MigrateAction::List => commands::migrate::list(),
        },
    }
    Ok(())
}
