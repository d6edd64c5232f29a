//! Config command handler
//!
//! Resolves and displays the finalized pipeline configuration, including
//! the names derived from it.

use anyhow::Result;
use colored::*;

use super::resolve_config;
use crate::config::Config;

/// Handle the config command
pub async fn handle_config(config: &Config) -> Result<()> {
    let resolved = resolve_config(config).await?;

    println!("{}", "Pipeline Configuration:".bold());
    println!("  Prefix:         {}", resolved.prefix.cyan());
    println!("  Stage:          {}", resolved.stage_name.cyan());
    println!("  Account:        {}", resolved.account_id);
    println!("  Region:         {}", resolved.region);
    println!(
        "  Repository:     {}/{} @ {}",
        resolved.repo_owner,
        resolved.repo_name.bold(),
        resolved.branch
    );
    println!("  Credential ref: {}", resolved.credential_ref.dimmed());

    println!("\n{}", "Derived Names:".bold());
    println!("  Pipeline:      {}", resolved.pipeline_name());
    println!("  Registry repo: {}", resolved.registry_repo_name());

    Ok(())
}
