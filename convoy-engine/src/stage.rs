//! Stage trait and run context
//!
//! A stage is a named unit of work with declared input and output
//! artifacts. The run context is the mutable state threaded through one
//! pipeline run: finalized configuration, run metadata, the workspace, and
//! every artifact produced so far.

use async_trait::async_trait;
use convoy_core::domain::artifact::{Artifact, ImageReference};
use convoy_core::domain::config::PipelineConfig;
use convoy_core::domain::run::{RunMetadata, RunState};
use convoy_core::error::PipelineError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Revision tag used when no source revision is available (local runs)
pub const LOCAL_REVISION_TAG: &str = "local";

/// Mutable state of a single pipeline run
pub struct RunContext {
    pub config: PipelineConfig,
    pub metadata: RunMetadata,
    /// Scratch directory this run's artifacts live under
    pub workspace: PathBuf,
    state: RunState,
    artifacts: HashMap<String, Artifact>,
    image: Option<ImageReference>,
}

impl RunContext {
    pub fn new(config: PipelineConfig, workspace: PathBuf) -> Self {
        Self {
            config,
            metadata: RunMetadata::new(),
            workspace,
            state: RunState::NotStarted,
            artifacts: HashMap::new(),
            image: None,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Advances the run state, enforcing the strictly-forward rule
    pub fn advance(&mut self, next: RunState) -> Result<(), PipelineError> {
        self.state.advance(next)
    }

    /// Moves the run into the absorbing failure state
    pub fn fail(&mut self, stage: &str, reason: String) {
        // Failed is reachable from any non-terminal state; if the run is
        // somehow already terminal there is nothing left to record.
        let _ = self.state.advance(RunState::Failed {
            stage: stage.to_string(),
            reason,
        });
    }

    /// Records an artifact produced by a stage
    pub fn put_artifact(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.name.clone(), artifact);
    }

    /// Looks up an input artifact
    pub fn artifact(&self, name: &str) -> Result<&Artifact, PipelineError> {
        self.artifacts.get(name).ok_or_else(|| {
            PipelineError::InvalidPipeline(format!("artifact '{name}' has not been produced"))
        })
    }

    pub fn has_artifact(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }

    /// Records the image built in this run; exactly one per run
    pub fn set_image(&mut self, image: ImageReference) {
        self.image = Some(image);
    }

    /// The image built in this run, if the build stage has completed
    pub fn image(&self) -> Option<&ImageReference> {
        self.image.as_ref()
    }

    /// Tag for the image build: the source revision, or "local" when no
    /// revision identifier is available
    pub fn revision_tag(&self) -> String {
        self.metadata
            .commit_id
            .clone()
            .unwrap_or_else(|| LOCAL_REVISION_TAG.to_string())
    }
}

/// A named unit of pipeline work with declared artifact edges
///
/// Stages execute in pipeline-declaration order; the orchestrator verifies
/// at construction time that the declared order is dependency-consistent.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Artifacts that must exist before this stage can begin
    fn inputs(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Artifacts this stage produces
    fn outputs(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Run state entered once this stage completes
    fn completed_state(&self) -> RunState;

    async fn execute(&self, ctx: &mut RunContext) -> Result<(), PipelineError>;
}
