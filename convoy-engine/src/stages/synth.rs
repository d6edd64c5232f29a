//! Synthesis stage
//!
//! Consumes the source snapshot and produces the deployment bundle: the
//! resolved configuration passed through as named build variables plus the
//! deploy targets of the run. Synthesis is deterministic for identical
//! (source, config, commit) inputs, and no partial bundle is published on
//! failure: the artifact is recorded only after the file is fully
//! written.

use async_trait::async_trait;
use convoy_core::domain::artifact::{ASSEMBLY_OUTPUT, Artifact, SOURCE_OUTPUT};
use convoy_core::domain::assembly::CloudAssembly;
use convoy_core::domain::deploy::DeploymentUnit;
use convoy_core::domain::run::RunState;
use convoy_core::error::PipelineError;
use tracing::{debug, info};

use crate::stage::{PipelineStage, RunContext};

pub struct SynthStage {
    units: Vec<DeploymentUnit>,
}

impl SynthStage {
    pub fn new(units: Vec<DeploymentUnit>) -> Self {
        Self { units }
    }
}

#[async_trait]
impl PipelineStage for SynthStage {
    fn name(&self) -> &'static str {
        "Synth"
    }

    fn inputs(&self) -> Vec<&'static str> {
        vec![SOURCE_OUTPUT]
    }

    fn outputs(&self) -> Vec<&'static str> {
        vec![ASSEMBLY_OUTPUT]
    }

    fn completed_state(&self) -> RunState {
        RunState::Synthesized
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
        let source = ctx.artifact(SOURCE_OUTPUT)?;
        debug!(source = %source.location.display(), "Synthesizing from source snapshot");

        let revision = ctx.metadata.commit_id.clone().ok_or_else(|| {
            PipelineError::Synthesis("source revision missing from run metadata".to_string())
        })?;

        let assembly = CloudAssembly::render(
            &ctx.config,
            &revision,
            &ctx.metadata.execution_id.to_string(),
            &self.units,
        );

        let json = serde_json::to_vec_pretty(&assembly)
            .map_err(|e| PipelineError::Synthesis(format!("failed to serialize assembly: {e}")))?;

        let dir = ctx.workspace.join("assembly");
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::Synthesis(format!("failed to create assembly dir: {e}")))?;

        let location = dir.join("assembly.json");
        tokio::fs::write(&location, &json)
            .await
            .map_err(|e| PipelineError::Synthesis(format!("failed to write assembly: {e}")))?;

        info!(
            location = %location.display(),
            units = self.units.len(),
            "Deployment bundle synthesized"
        );

        ctx.put_artifact(Artifact {
            name: ASSEMBLY_OUTPUT.to_string(),
            location,
            produced_by: self.name().to_string(),
        });

        Ok(())
    }
}
