//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod run;
mod show;
mod synth;
mod validate;

use anyhow::{Context, Result};
use clap::Subcommand;
use convoy_core::domain::config::PipelineConfig;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Execute a full pipeline run
    Run,
    /// Synthesize the deployment bundle without fetching source
    Synth,
    /// Resolve and display the finalized pipeline configuration
    Config,
    /// Validate configuration and pipeline wiring without running
    Validate,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// Result indicating success or failure
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run => run::handle_run(config).await,
        Commands::Synth => synth::handle_synth(config).await,
        Commands::Config => show::handle_config(config).await,
        Commands::Validate => validate::handle_validate(config).await,
    }
}

/// Resolve the finalized pipeline configuration for a command
///
/// Environment defaults merged with the remote parameter store, per the
/// resolver's per-key fallback rules.
pub async fn resolve_config(config: &Config) -> Result<PipelineConfig> {
    let store = std::sync::Arc::new(convoy_client::ParameterStoreClient::new(
        &config.param_store_url,
    ));
    let defaults = convoy_engine::resolver::LocalDefaults::from_env();

    convoy_engine::resolver::ConfigResolver::new(store)
        .resolve(&defaults)
        .await
        .context("Failed to resolve pipeline configuration")
}
