//! Command implementations

mod ask;
mod config;
mod convert;
mod upload;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use formqa_core::config::CliConfigOverrides;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();
    let overrides = CliConfigOverrides {
        backend: cli.backend.map(Into::into),
        ..Default::default()
    };

    match cli.command {
        Commands::Convert(args) => convert::execute(args, &output),
        Commands::Upload(args) => upload::execute(args, &output, config_path, overrides).await,
        Commands::Ask(args) => ask::execute(args, &output, config_path, overrides).await,
        Commands::Config => config::execute(&output, config_path, overrides),
    }
}
