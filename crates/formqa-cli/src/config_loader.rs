//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use formqa_core::config::{CliConfigOverrides, LayeredConfig, Settings};
use std::path::Path;

/// Load layered configuration: defaults, then the config file, then the
/// environment
///
/// An explicit `--config` path must exist; otherwise `formqa.toml` in the
/// current directory is used when present.
pub fn load_config(config_path: Option<&Path>) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();

    let config = match config_path {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir()?;
            config.load_default_file(&cwd).context("Failed to load formqa.toml")?
        }
    };

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(config_path)?;
    config.update_from_cli(overrides);
    Ok(config)
}

/// Load, override and validate in one step
pub fn resolve_settings(
    config_path: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<Settings> {
    let config = load_config_with_overrides(config_path, overrides)?;
    Ok(config.resolve()?)
}
