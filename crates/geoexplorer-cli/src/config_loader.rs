//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use geoexplorer_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Config file picked up from the working directory when --config is absent
pub const DEFAULT_CONFIG_FILE: &str = "geoexplorer.toml";

/// Defaults, then the config file, then the environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_file(cli.config.as_deref()) {
        tracing::debug!("Loading configuration from {}", path.display());
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        api_url: cli.api_url.clone(),
        request_timeout_secs: cli.timeout,
        ..Default::default()
    });

    Ok(config)
}

fn config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}
