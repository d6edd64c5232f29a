//! Pipeline configuration
//!
//! The finalized configuration every component receives. Constructed once
//! by the resolver at process start and never mutated afterwards; no
//! component reads the environment on its own.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Finalized pipeline configuration
///
/// Fields are either supplied from local defaults or overlaid from the
/// remote parameter store. Every field must be non-empty before the
/// orchestrator runs; [`PipelineConfig::validate`] enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Naming prefix for every resource the pipeline creates
    pub prefix: String,
    /// Deployment stage name (e.g. "dev", "prod")
    pub stage_name: String,
    /// Cloud account the pipeline deploys into
    pub account_id: String,
    /// Cloud region the pipeline deploys into
    pub region: String,
    /// Git repository name (case sensitive)
    pub repo_name: String,
    /// Git repository owner
    pub repo_owner: String,
    /// Branch the pipeline tracks
    pub branch: String,
    /// Parameter-store key naming the Git credential, not the secret itself
    pub credential_ref: String,
}

impl PipelineConfig {
    /// Validates that every mandatory field is non-empty
    ///
    /// An empty field after resolution means the pipeline cannot be
    /// defined; this is a configuration error, not a silent continuation.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (field, value) in self.fields() {
            if value.is_empty() {
                return Err(PipelineError::Configuration {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Field name/value pairs in declaration order
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("prefix", &self.prefix),
            ("stage_name", &self.stage_name),
            ("account_id", &self.account_id),
            ("region", &self.region),
            ("repo_name", &self.repo_name),
            ("repo_owner", &self.repo_owner),
            ("branch", &self.branch),
            ("credential_ref", &self.credential_ref),
        ]
    }

    /// Name of the pipeline built from this configuration
    pub fn pipeline_name(&self) -> String {
        format!("{}-{}-pipeline", self.prefix, self.stage_name)
    }

    /// Registry repository name scoped to this pipeline
    ///
    /// Lowercased because registry repository names must be.
    pub fn registry_repo_name(&self) -> String {
        format!("{}-{}-repo", self.prefix, self.stage_name).to_lowercase()
    }
}
