//! Command implementations

mod color;
mod config;
mod datasets;
mod filters;
mod input;
mod summarize;
mod watch;
mod working_sets;

use crate::cli::{Cli, Commands};
use crate::config_loader;
use crate::output::Output;
use anyhow::{Context, Result};
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_gateway::RestGateway;
use geoexplorer_state::{AppStore, StoreOptions};

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = Output::new(cli.json);
    let config = config_loader::load_config(&cli)?;

    match cli.command {
        Commands::Summarize(args) => summarize::execute(args, &config, &output).await,
        Commands::ColorScale(args) => color::execute(args, &config, &output).await,
        Commands::Schemes => color::schemes(&output),
        Commands::Datasets(command) => datasets::execute(command, &config, &output).await,
        Commands::WorkingSets(command) => working_sets::execute(command, &config, &output).await,
        Commands::Filters(command) => filters::execute(command, &config, &output).await,
        Commands::Watch(args) => watch::execute(args, &config, &output).await,
        Commands::Config => config::execute(&config, &output),
    }
}

fn connect(config: &LayeredConfig) -> Result<RestGateway> {
    RestGateway::from_config(config)
        .with_context(|| format!("Failed to set up a client for {}", config.api_url.value))
}

fn open_store(config: &LayeredConfig) -> Result<AppStore<RestGateway>> {
    Ok(AppStore::new(connect(config)?, StoreOptions::from_config(config)))
}
