//! Validate command handler
//!
//! Resolves the configuration and assembles the pipeline without running
//! it. Catches a missing Git credential and inconsistent stage wiring
//! before any run is attempted.

use anyhow::Result;
use colored::*;
use convoy_engine::builder::{PipelineSettings, build_pipeline};
use convoy_engine::provision::DryRunProvisioner;
use std::sync::Arc;

use super::resolve_config;
use crate::config::Config;

/// Handle the validate command
pub async fn handle_validate(config: &Config) -> Result<()> {
    let pipeline_config = resolve_config(config).await?;
    println!("{}", "✓ Configuration valid".green());

    let store = Arc::new(convoy_client::ParameterStoreClient::new(
        &config.param_store_url,
    ));
    let provisioner = Arc::new(DryRunProvisioner::new(config.out_dir.clone()));

    let settings = PipelineSettings {
        git_host_url: config.git_host_url.clone(),
        registry_host: config.registry_host.clone(),
        registry_username: config.registry_username.clone(),
        registry_password: config.registry_password.clone(),
        units: config.units.clone(),
    };

    let pipeline = build_pipeline(&pipeline_config, store, provisioner, settings).await?;

    println!("{}", "✓ Pipeline wiring valid".green());
    println!("  Name:   {}", pipeline.name().bold());
    println!("  Stages: {}", pipeline.stage_names().join(", ").dimmed());

    Ok(())
}
