//! FormQA CLI - Command-line interface
//!
//! Convert form spreadsheets, upload them to the hosted store, and ask
//! questions about them from the terminal.

mod cli;
mod commands;
mod config_loader;
mod errors;
mod interactive;
mod output;
mod output_types;
mod progress;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Pick up credentials from a local .env before reading configuration
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(async { commands::execute(cli).await });

    if let Err(e) = result {
        errors::from_anyhow(e).display();
        std::process::exit(1);
    }

    Ok(())
}
