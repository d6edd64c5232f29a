//! Run command handler
//!
//! Executes a full pipeline run: source fetch, synthesis, image build,
//! and deployment. Provisioning plans are written to the output directory
//! for the infrastructure layer to converge.

use anyhow::{Context, Result, bail};
use colored::*;
use convoy_core::domain::run::RunState;
use convoy_engine::builder::{PipelineSettings, build_pipeline};
use convoy_engine::container::check_podman_available;
use convoy_engine::provision::DryRunProvisioner;
use convoy_engine::stage::RunContext;
use std::sync::Arc;

use super::resolve_config;
use crate::config::Config;

/// Handle the run command
pub async fn handle_run(config: &Config) -> Result<()> {
    check_podman_available()?;

    let pipeline_config = resolve_config(config).await?;

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

    tokio::fs::create_dir_all(&config.workspace)
        .await
        .context("Failed to create workspace directory")?;

    let mut ctx = RunContext::new(pipeline_config, config.workspace.clone());
    let execution_id = ctx.metadata.execution_id;

    println!(
        "{} {} ({})",
        "▸".cyan(),
        pipeline.name().bold(),
        execution_id.to_string().dimmed()
    );

    match pipeline.run(&mut ctx).await {
        Ok(()) => {
            println!("{}", "✓ Pipeline run complete!".green().bold());
            if let Some(image) = ctx.image() {
                println!("  Image:    {}", image.to_string().cyan());
            }
            if let Some(commit) = &ctx.metadata.commit_id {
                println!("  Revision: {}", commit.dimmed());
            }
            println!("  Plans:    {}", config.out_dir.display().to_string().dimmed());
            Ok(())
        }
        Err(e) => {
            if let RunState::Failed { stage, reason } = ctx.state() {
                println!(
                    "{}",
                    format!("✗ Pipeline failed at stage '{stage}': {reason}")
                        .red()
                        .bold()
                );
            }
            bail!("pipeline run failed: {e}")
        }
    }
}
