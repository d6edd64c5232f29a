//! Pipeline assembly
//!
//! Wires the concrete collaborators into the standard four-stage pipeline:
//! source fetch, synthesis, image build, deployment. The Git credential is
//! resolved from the parameter store here, at pipeline-definition time, so
//! a missing or rejected credential surfaces before any stage runs.

use convoy_client::GitHostClient;
use convoy_core::domain::config::PipelineConfig;
use convoy_core::domain::deploy::DeploymentUnit;
use convoy_core::domain::secret::Secret;
use convoy_core::error::PipelineError;
use std::sync::Arc;
use tracing::{debug, info};

use crate::container::PodmanBuilder;
use crate::orchestrator::Pipeline;
use crate::provision::Provisioner;
use crate::remote::ParameterStore;
use crate::stage::PipelineStage;
use crate::stages::{BuildStage, DeployStage, SourceStage, SynthStage};

/// Endpoint and target settings that are not part of the pipeline
/// configuration itself
pub struct PipelineSettings {
    /// Base URL of the Git hosting provider API
    pub git_host_url: String,
    /// Hostname of the container registry
    pub registry_host: String,
    /// Registry credentials for the dedicated build identity
    pub registry_username: String,
    pub registry_password: Secret,
    /// Deployment units this pipeline targets
    pub units: Vec<DeploymentUnit>,
}

/// Builds the standard pipeline for a finalized configuration
///
/// # Arguments
/// * `config` - Resolved and validated pipeline configuration
/// * `store` - Parameter store holding the Git credential
/// * `provisioner` - Provisioner the deploy stage hands plans to
/// * `settings` - Endpoints, registry identity and deploy targets
///
/// # Returns
/// A validated pipeline, or an error when the Git credential cannot be
/// resolved or the stage graph is inconsistent.
pub async fn build_pipeline(
    config: &PipelineConfig,
    store: Arc<dyn ParameterStore>,
    provisioner: Arc<dyn Provisioner>,
    settings: PipelineSettings,
) -> Result<Pipeline, PipelineError> {
    debug!(key = %config.credential_ref, "Resolving Git credential");

    let credential = store
        .get(&config.prefix, &config.stage_name, &config.credential_ref)
        .await
        .map_err(|e| PipelineError::SourceFetch(format!("credential lookup failed: {e}")))?
        .ok_or_else(|| {
            PipelineError::SourceFetch(format!(
                "credential '{}' not found in parameter store",
                config.credential_ref
            ))
        })?;

    let git = Arc::new(GitHostClient::new(
        settings.git_host_url,
        Secret::new(credential),
    ));
    let builder = Arc::new(PodmanBuilder::new(
        settings.registry_username,
        settings.registry_password,
    ));

    let stages: Vec<Box<dyn PipelineStage>> = vec![
        Box::new(SourceStage::new(git)),
        Box::new(SynthStage::new(settings.units.clone())),
        Box::new(BuildStage::new(settings.registry_host, builder)),
        Box::new(DeployStage::new(settings.units, provisioner)),
    ];

    let pipeline = Pipeline::new(config.pipeline_name(), stages)?;
    info!(pipeline = %pipeline.name(), "Pipeline assembled");

    Ok(pipeline)
}
