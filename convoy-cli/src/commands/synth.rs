//! Synth command handler
//!
//! Renders the deployment bundle from the finalized configuration without
//! contacting the Git host or registry. The revision falls back to "local"
//! since no source stage runs.

use anyhow::{Context, Result};
use colored::*;
use convoy_core::domain::assembly::CloudAssembly;
use convoy_core::domain::run::RunMetadata;
use convoy_engine::stage::LOCAL_REVISION_TAG;

use super::resolve_config;
use crate::config::Config;

/// Handle the synth command
pub async fn handle_synth(config: &Config) -> Result<()> {
    let pipeline_config = resolve_config(config).await?;
    let metadata = RunMetadata::new();

    let assembly = CloudAssembly::render(
        &pipeline_config,
        LOCAL_REVISION_TAG,
        &metadata.execution_id.to_string(),
        &config.units,
    );

    let json = serde_json::to_vec_pretty(&assembly).context("Failed to serialize bundle")?;

    tokio::fs::create_dir_all(&config.out_dir)
        .await
        .context("Failed to create output directory")?;
    let path = config.out_dir.join("assembly.json");
    tokio::fs::write(&path, &json)
        .await
        .with_context(|| format!("Failed to write bundle to {}", path.display()))?;

    println!("{}", "✓ Deployment bundle synthesized!".green().bold());
    println!("  Bundle: {}", path.display().to_string().cyan());
    println!(
        "  Units:  {}",
        config
            .units
            .iter()
            .map(|u| u.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
            .dimmed()
    );

    Ok(())
}
