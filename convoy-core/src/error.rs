//! Pipeline error taxonomy
//!
//! Every variant is terminal for a run (or for the pipeline definition
//! itself). Remote-lookup failures are deliberately absent: the resolver
//! recovers from those per key and they never surface as a run error.

use thiserror::Error;

/// Errors that halt a pipeline run or prevent its definition
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Mandatory configuration field empty after resolution
    #[error("configuration error: mandatory field '{field}' is empty after resolution")]
    Configuration {
        /// Name of the offending field
        field: String,
    },

    /// Stage graph rejected at construction time, or an illegal state
    /// transition was attempted
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    /// Source retrieval failed (authentication, missing repo or branch)
    #[error("source fetch failed: {0}")]
    SourceFetch(String),

    /// Deployment bundle synthesis failed; no partial bundle is published
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// Image build or push failed; no partial image carries the revision tag
    #[error("image build failed: {0}")]
    ImageBuild(String),

    /// Cloud resource convergence failed for one deployment unit
    #[error("provisioning failed for unit '{unit}': {reason}")]
    Provisioning { unit: String, reason: String },
}
