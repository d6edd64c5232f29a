//! Convoy CLI
//!
//! Command-line interface for the Convoy delivery pipeline.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use convoy_core::domain::deploy::DeploymentUnit;
use convoy_core::domain::secret::Secret;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "convoy")]
#[command(about = "Convoy delivery pipeline CLI", long_about = None)]
struct Cli {
    /// Remote parameter store URL
    #[arg(
        long,
        env = "PARAM_STORE_URL",
        default_value = "http://localhost:8090"
    )]
    param_store_url: String,

    /// Git hosting provider API URL
    #[arg(long, env = "GIT_HOST_URL", default_value = "https://api.github.com")]
    git_host_url: String,

    /// Container registry host
    #[arg(long, env = "REGISTRY_HOST", default_value = "localhost:5000")]
    registry_host: String,

    /// Registry username of the dedicated build identity
    #[arg(long, env = "REGISTRY_USERNAME", default_value = "convoy-builder")]
    registry_username: String,

    /// Registry password of the dedicated build identity
    #[arg(long, env = "REGISTRY_PASSWORD", default_value = "")]
    registry_password: String,

    /// Scratch directory for run artifacts
    #[arg(long, env = "CONVOY_WORKSPACE", default_value = ".convoy/workspace")]
    workspace: PathBuf,

    /// Output directory for bundles and provisioning plans
    #[arg(long, env = "CONVOY_OUT_DIR", default_value = ".convoy/out")]
    out_dir: PathBuf,

    /// Deployment units to target (comma-separated)
    #[arg(long = "unit", env = "DEPLOY_UNITS", value_delimiter = ',', default_value = "app")]
    units: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convoy=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config {
        param_store_url: cli.param_store_url,
        git_host_url: cli.git_host_url,
        registry_host: cli.registry_host,
        registry_username: cli.registry_username,
        registry_password: Secret::new(cli.registry_password),
        workspace: cli.workspace,
        out_dir: cli.out_dir,
        units: cli.units.into_iter().map(DeploymentUnit::new).collect(),
    };

    handle_command(cli.command, &config).await
}
