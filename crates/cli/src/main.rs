//! Concierge CLI - Terminal simulator and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run a full session against a simulated terminal
//! concierge simulate --fixture fixtures/club-gold.yaml
//!
//! # List the registered segments and their discount policies
//! concierge strategies
//!
//! # Run a customer search against the fixture's profiles
//! concierge search "jane@ex" --fixture fixtures/club-gold.yaml
//! ```
//!
//! # Commands
//!
//! - `simulate` - Drive Startup through Close on a simulated terminal
//! - `strategies` - Show the discount strategy registry
//! - `search` - Query the fixture's profile store

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LOG_FILTER: &str = "concierge_extension=info,concierge_cli=info";

#[derive(Parser)]
#[command(name = "concierge")]
#[command(author, version, about = "Point-of-sale concierge tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session against a simulated terminal
    Simulate {
        /// YAML fixture with the terminal order, profiles and form input
        #[arg(short, long)]
        fixture: PathBuf,
    },
    /// List the discount strategy registry
    Strategies,
    /// Search the fixture's profiles
    Search {
        /// Search query (email, name or phone prefix)
        query: String,

        /// YAML fixture holding the profiles
        #[arg(short, long)]
        fixture: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Simulate { fixture } => commands::simulate::run(&fixture).await?,
        Commands::Strategies => commands::strategies::list()?,
        Commands::Search { query, fixture } => commands::search::run(&query, &fixture).await?,
    }
    Ok(())
}
