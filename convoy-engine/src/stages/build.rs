//! Image build stage
//!
//! Builds a container image from the source snapshot and publishes it to
//! the pipeline's registry repository, tagged with the source revision
//! ("local" when no revision is available). The image reference is
//! recorded in the run context only after a fully successful push, so a
//! partially built image never carries the revision tag.

use async_trait::async_trait;
use convoy_core::domain::artifact::{ImageReference, SOURCE_OUTPUT};
use convoy_core::domain::run::RunState;
use convoy_core::error::PipelineError;
use std::sync::Arc;
use tracing::info;

use crate::container::ImageBuilder;
use crate::stage::{PipelineStage, RunContext};

pub struct BuildStage {
    registry_host: String,
    builder: Arc<dyn ImageBuilder>,
}

impl BuildStage {
    pub fn new(registry_host: impl Into<String>, builder: Arc<dyn ImageBuilder>) -> Self {
        Self {
            registry_host: registry_host.into(),
            builder,
        }
    }
}

#[async_trait]
impl PipelineStage for BuildStage {
    fn name(&self) -> &'static str {
        "AppBuild"
    }

    fn inputs(&self) -> Vec<&'static str> {
        vec![SOURCE_OUTPUT]
    }

    fn completed_state(&self) -> RunState {
        RunState::ImageBuilt
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
        let source = ctx.artifact(SOURCE_OUTPUT)?.clone();

        let registry_uri = format!("{}/{}", self.registry_host, ctx.config.registry_repo_name());
        let image = ImageReference::new(registry_uri, ctx.revision_tag());

        let as_build_error = |e: anyhow::Error| PipelineError::ImageBuild(format!("{e:#}"));

        self.builder
            .login(&self.registry_host)
            .await
            .map_err(as_build_error)?;
        self.builder
            .build(&source.location, &image)
            .await
            .map_err(as_build_error)?;
        self.builder.push(&image).await.map_err(as_build_error)?;

        info!(image = %image, "Image pushed");
        ctx.set_image(image);

        Ok(())
    }
}
