//! Lunar System CLI - session migrations and catalog inspection.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table used as visitors' durable storage
//! lunar-cli migrate
//!
//! # Print the remote catalog grouped by category
//! lunar-cli catalog
//!
//! # Only products matching a search, as JSON
//! lunar-cli catalog --query netflix --json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run the session store migration
//! - `catalog` - Fetch and print the product catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lunar-cli")]
#[command(author, version, about = "Lunar System CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the session store migration
    Migrate,
    /// Fetch the catalog from the entity store and print it
    Catalog {
        /// Only products whose name, brand or description contains this text
        #[arg(short, long, default_value = "")]
        query: String,

        /// Only products in this category (e.g. `streaming`)
        #[arg(short, long, default_value = "")]
        category: String,

        /// Print the raw product list as JSON
        #[arg(long)]
        json: bool,
    },
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
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Catalog {
            query,
            category,
            json,
        } => commands::catalog::print(&query, &category, json).await?,
    }
    Ok(())
}
