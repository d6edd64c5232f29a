//! Deployment stage
//!
//! Renders a provisioning plan per deployment unit and hands each to the
//! provisioner. Every unit in the run receives the single image reference
//! built earlier, so version skew across units is impossible by
//! construction. Units provision sequentially; the first failure is
//! terminal for the run, already-provisioned units are left in place, and
//! later units are not attempted.

use async_trait::async_trait;
use convoy_core::domain::artifact::ASSEMBLY_OUTPUT;
use convoy_core::domain::deploy::{DeploymentUnit, ProvisioningPlan};
use convoy_core::domain::run::RunState;
use convoy_core::error::PipelineError;
use std::sync::Arc;
use tracing::info;

use crate::provision::Provisioner;
use crate::stage::{PipelineStage, RunContext};

pub struct DeployStage {
    units: Vec<DeploymentUnit>,
    provisioner: Arc<dyn Provisioner>,
}

impl DeployStage {
    pub fn new(units: Vec<DeploymentUnit>, provisioner: Arc<dyn Provisioner>) -> Self {
        Self { units, provisioner }
    }
}

#[async_trait]
impl PipelineStage for DeployStage {
    fn name(&self) -> &'static str {
        "Deploy"
    }

    fn inputs(&self) -> Vec<&'static str> {
        vec![ASSEMBLY_OUTPUT]
    }

    fn completed_state(&self) -> RunState {
        RunState::Deploying
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
        let assembly = ctx.artifact(ASSEMBLY_OUTPUT)?;
        info!(assembly = %assembly.location.display(), "Deploying synthesized bundle");

        let image = ctx.image().cloned().ok_or_else(|| {
            PipelineError::InvalidPipeline("no image has been built in this run".to_string())
        })?;

        for unit in &self.units {
            let plan = ProvisioningPlan::render(&ctx.config, unit, &image);
            info!(unit = %unit.name, image = %image, "Provisioning deployment unit");

            self.provisioner
                .apply(&plan)
                .await
                .map_err(|e| PipelineError::Provisioning {
                    unit: unit.name.clone(),
                    reason: format!("{e:#}"),
                })?;
        }

        Ok(())
    }
}
