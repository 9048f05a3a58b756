//! Zedonk CLI - export Shopify orders as Zedonk CSV from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Export two orders to stdout
//! zedonk-cli export --ids 1001,1002
//!
//! # Export with pricing columns to a file, reading orders over REST
//! zedonk-cli export --ids 5512345678901 --pricing --api rest -o order.csv
//! ```
//!
//! # Commands
//!
//! - `export` - Fetch orders and write CSV
//!
//! Shopify credentials come from the same environment variables as the
//! exporter service (`SHOPIFY_STORE`, `SHOPIFY_ACCESS_TOKEN`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use zedonk_exporter::ApiMode;

mod commands;

#[derive(Parser)]
#[command(name = "zedonk-cli")]
#[command(author, version, about = "Zedonk CSV export tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export orders as Zedonk CSV
    Export {
        /// Comma-separated order ids (numeric or gid://shopify/Order/N)
        #[arg(short, long)]
        ids: String,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Add currency, unit price and amount per unit columns
        #[arg(long, env = "EXPORT_INCLUDE_PRICING")]
        pricing: bool,

        /// Admin API to read from (`graphql` or `rest`)
        #[arg(long, env = "SHOPIFY_API_MODE")]
        api: Option<ApiMode>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zedonk_cli=info,zedonk_exporter=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Export {
            ids,
            output,
            pricing,
            api,
        } => {
            let options = commands::export::ExportOptions {
                ids,
                output,
                pricing,
                api,
            };
            commands::export::run(options).await?;
        }
    }
    Ok(())
}
