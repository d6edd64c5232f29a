//! Configuration module
//!
//! Carries the endpoint and target settings shared by all commands. The
//! pipeline configuration itself (prefix, stage, repository) comes from
//! the environment and the remote parameter store, not from here.

use convoy_core::domain::deploy::DeploymentUnit;
use convoy_core::domain::secret::Secret;
use std::path::PathBuf;

/// CLI configuration
#[derive(Clone)]
pub struct Config {
    /// URL of the remote parameter store
    pub param_store_url: String,
    /// Base URL of the Git hosting provider API
    pub git_host_url: String,
    /// Hostname of the container registry
    pub registry_host: String,
    /// Registry credentials for the dedicated build identity
    pub registry_username: String,
    pub registry_password: Secret,
    /// Scratch directory runs work under
    pub workspace: PathBuf,
    /// Directory synthesized bundles and provisioning plans are written to
    pub out_dir: PathBuf,
    /// Deployment units the pipeline targets
    pub units: Vec<DeploymentUnit>,
}
