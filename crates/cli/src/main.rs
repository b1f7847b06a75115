//! Pharma Direct CLI - diagnostics and configuration tools.
//!
//! # Usage
//!
//! ```bash
//! # Run the pharmacy permissions probe in a seeded sandbox
//! pharma-cli probe
//!
//! # Same, with the page pointing at another pharmacy's listings
//! pharma-cli probe --mismatched-owner
//!
//! # Probe as a customer account instead of a pharmacy
//! pharma-cli probe --role user
//!
//! # Validate deployment environment variables
//! pharma-cli config check
//! ```
//!
//! # Commands
//!
//! - `probe` - Run the pharmacy permissions probe
//! - `config check` - Validate deployment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pharma-cli")]
#[command(author, version, about = "Pharma Direct CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pharmacy permissions probe in a seeded in-memory sandbox
    Probe {
        /// Role to register the probing account with
        #[arg(short, long, default_value = "pharmacy")]
        role: String,

        /// How many products to seed for the probing account
        #[arg(short = 'n', long, default_value_t = 2)]
        products: usize,

        /// Point the page at a rival pharmacy's listings to demonstrate
        /// a permission denial
        #[arg(long)]
        mismatched_owner: bool,

        /// Pharmacy ID the probe should treat as supplied by the page
        #[arg(long, conflicts_with = "mismatched_owner")]
        pharmacy_id: Option<String>,
    },
    /// Deployment configuration tools
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate environment configuration without connecting anywhere
    Check,
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
        Commands::Probe {
            role,
            products,
            mismatched_owner,
            pharmacy_id,
        } => {
            commands::probe::run(&role, products, mismatched_owner, pharmacy_id).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Check => commands::config::check()?,
        },
    }
    Ok(())
}
