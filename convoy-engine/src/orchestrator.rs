//! Pipeline orchestrator
//!
//! Owns an ordered list of stages and drives a run through them strictly
//! sequentially. The stage graph is validated once at construction time:
//! every declared input must be produced by an earlier stage, and no two
//! stages may produce the same artifact. A stage failure moves the run
//! into the absorbing failed state and ends the run; there is no retry
//! and no partial re-entry.

use convoy_core::domain::run::RunState;
use convoy_core::error::PipelineError;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{error, info};

use crate::stage::{PipelineStage, RunContext};

pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn PipelineStage>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Pipeline {
    /// Builds a pipeline, validating the stage graph
    ///
    /// # Arguments
    /// * `name` - Pipeline name used in logs
    /// * `stages` - Stages in execution order
    ///
    /// # Returns
    /// The pipeline, or `InvalidPipeline` when an input has no upstream
    /// producer or two stages declare the same output.
    pub fn new(
        name: impl Into<String>,
        stages: Vec<Box<dyn PipelineStage>>,
    ) -> Result<Self, PipelineError> {
        let mut produced: HashSet<&str> = HashSet::new();

        for stage in &stages {
            for input in stage.inputs() {
                if !produced.contains(input) {
                    return Err(PipelineError::InvalidPipeline(format!(
                        "stage '{}' requires artifact '{}' which no earlier stage produces",
                        stage.name(),
                        input
                    )));
                }
            }
            for output in stage.outputs() {
                if !produced.insert(output) {
                    return Err(PipelineError::InvalidPipeline(format!(
                        "artifact '{}' has more than one producer (stage '{}')",
                        output,
                        stage.name()
                    )));
                }
            }
        }

        Ok(Self {
            name: name.into(),
            stages,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Executes the pipeline against a fresh run context
    ///
    /// Stages run in order; each successful stage advances the run state.
    /// The first failure records the failing stage and reason on the
    /// context and is returned to the caller.
    pub async fn run(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
        info!(
            pipeline = %self.name,
            execution_id = %ctx.metadata.execution_id,
            stages = self.stages.len(),
            "Starting pipeline run"
        );

        for stage in &self.stages {
            // Construction already proved an upstream producer exists, but
            // the producer may itself have been skipped or misbehaved.
            for input in stage.inputs() {
                if !ctx.has_artifact(input) {
                    let reason = format!("input artifact '{input}' was never produced");
                    ctx.fail(stage.name(), reason.clone());
                    return Err(PipelineError::InvalidPipeline(reason));
                }
            }

            info!(stage = %stage.name(), "Stage starting");
            let started = Instant::now();

            match stage.execute(ctx).await {
                Ok(()) => {
                    ctx.advance(stage.completed_state())?;
                    info!(
                        stage = %stage.name(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        state = ?ctx.state(),
                        "Stage completed"
                    );
                }
                Err(e) => {
                    error!(stage = %stage.name(), error = %e, "Stage failed");
                    ctx.fail(stage.name(), e.to_string());
                    return Err(e);
                }
            }
        }

        ctx.advance(RunState::Complete)?;
        info!(
            pipeline = %self.name,
            execution_id = %ctx.metadata.execution_id,
            "Pipeline run complete"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use convoy_core::domain::artifact::{ASSEMBLY_OUTPUT, Artifact, SOURCE_OUTPUT};
    use convoy_core::domain::config::PipelineConfig;
    use std::path::PathBuf;

    struct StubStage {
        name: &'static str,
        inputs: Vec<&'static str>,
        outputs: Vec<&'static str>,
        state: RunState,
        fail_with: Option<&'static str>,
    }

    impl StubStage {
        fn new(
            name: &'static str,
            inputs: Vec<&'static str>,
            outputs: Vec<&'static str>,
            state: RunState,
        ) -> Box<Self> {
            Box::new(Self {
                name,
                inputs,
                outputs,
                state,
                fail_with: None,
            })
        }

        fn failing(name: &'static str, state: RunState, reason: &'static str) -> Box<Self> {
            Box::new(Self {
                name,
                inputs: Vec::new(),
                outputs: Vec::new(),
                state,
                fail_with: Some(reason),
            })
        }
    }

    #[async_trait]
    impl PipelineStage for StubStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn inputs(&self) -> Vec<&'static str> {
            self.inputs.clone()
        }

        fn outputs(&self) -> Vec<&'static str> {
            self.outputs.clone()
        }

        fn completed_state(&self) -> RunState {
            self.state.clone()
        }

        async fn execute(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
            if let Some(reason) = self.fail_with {
                return Err(PipelineError::SourceFetch(reason.to_string()));
            }
            for output in &self.outputs {
                ctx.put_artifact(Artifact {
                    name: output.to_string(),
                    location: ctx.workspace.join(output),
                    produced_by: self.name.to_string(),
                });
            }
            Ok(())
        }
    }

    fn context() -> RunContext {
        let config = PipelineConfig {
            prefix: "Acme".to_string(),
            stage_name: "dev".to_string(),
            account_id: "000000000000".to_string(),
            region: "ap-southeast-1".to_string(),
            repo_name: "svc".to_string(),
            repo_owner: "org".to_string(),
            branch: "main".to_string(),
            credential_ref: "GIT_TOKEN_KEY".to_string(),
        };
        RunContext::new(config, PathBuf::from("/tmp/convoy-test"))
    }

    fn linear_stages() -> Vec<Box<dyn PipelineStage>> {
        vec![
            StubStage::new("Source", vec![], vec![SOURCE_OUTPUT], RunState::SourceFetched),
            StubStage::new(
                "Synth",
                vec![SOURCE_OUTPUT],
                vec![ASSEMBLY_OUTPUT],
                RunState::Synthesized,
            ),
            StubStage::new("AppBuild", vec![SOURCE_OUTPUT], vec![], RunState::ImageBuilt),
            StubStage::new("Deploy", vec![ASSEMBLY_OUTPUT], vec![], RunState::Deploying),
        ]
    }

    #[tokio::test]
    async fn test_full_run_reaches_complete() {
        let pipeline = Pipeline::new("acme-dev-pipeline", linear_stages()).unwrap();
        let mut ctx = context();

        pipeline.run(&mut ctx).await.unwrap();

        assert_eq!(*ctx.state(), RunState::Complete);
        assert!(ctx.has_artifact(SOURCE_OUTPUT));
        assert!(ctx.has_artifact(ASSEMBLY_OUTPUT));
    }

    #[tokio::test]
    async fn test_rejects_input_without_producer() {
        let stages: Vec<Box<dyn PipelineStage>> = vec![StubStage::new(
            "Synth",
            vec![SOURCE_OUTPUT],
            vec![ASSEMBLY_OUTPUT],
            RunState::Synthesized,
        )];

        let err = Pipeline::new("bad", stages).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPipeline(_)));
    }

    #[tokio::test]
    async fn test_rejects_duplicate_producer() {
        let stages: Vec<Box<dyn PipelineStage>> = vec![
            StubStage::new("Source", vec![], vec![SOURCE_OUTPUT], RunState::SourceFetched),
            StubStage::new("SourceAgain", vec![], vec![SOURCE_OUTPUT], RunState::Synthesized),
        ];

        let err = Pipeline::new("bad", stages).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPipeline(_)));
    }

    // End-to-end over the real stages, with the remote collaborators faked.
    mod full_run {
        use super::*;
        use crate::container::ImageBuilder;
        use crate::provision::Provisioner;
        use crate::remote::GitHost;
        use crate::stages::{BuildStage, DeployStage, SourceStage, SynthStage};
        use convoy_client::ClientError;
        use convoy_core::domain::artifact::ImageReference;
        use convoy_core::domain::deploy::{DeploymentUnit, ProvisioningPlan};
        use std::path::Path;
        use std::sync::{Arc, Mutex};

        struct FakeGit;

        #[async_trait]
        impl GitHost for FakeGit {
            async fn head_revision(
                &self,
                _owner: &str,
                _repo: &str,
                _branch: &str,
            ) -> Result<String, ClientError> {
                Ok("abc123".to_string())
            }

            async fn download_snapshot(
                &self,
                _owner: &str,
                repo: &str,
                revision: &str,
                dest_dir: &Path,
            ) -> Result<PathBuf, ClientError> {
                let dest = dest_dir.join(format!("{repo}-{revision}"));
                tokio::fs::create_dir_all(&dest).await?;
                tokio::fs::write(dest.join("Dockerfile"), b"FROM scratch\n").await?;
                Ok(dest)
            }
        }

        struct FakeBuilder;

        #[async_trait]
        impl ImageBuilder for FakeBuilder {
            async fn login(&self, _registry_host: &str) -> anyhow::Result<()> {
                Ok(())
            }

            async fn build(
                &self,
                _context_dir: &Path,
                _image: &ImageReference,
            ) -> anyhow::Result<()> {
                Ok(())
            }

            async fn push(&self, _image: &ImageReference) -> anyhow::Result<()> {
                Ok(())
            }
        }

        #[derive(Default)]
        struct RecordingProvisioner {
            applied: Mutex<Vec<ProvisioningPlan>>,
        }

        #[async_trait]
        impl Provisioner for RecordingProvisioner {
            async fn apply(&self, plan: &ProvisioningPlan) -> anyhow::Result<()> {
                self.applied.lock().unwrap().push(plan.clone());
                Ok(())
            }
        }

        #[tokio::test]
        async fn test_every_deployed_unit_uses_the_built_revision() {
            let workspace = tempfile::tempdir().unwrap();
            let units = vec![
                DeploymentUnit::new("ap-southeast-1"),
                DeploymentUnit::new("eu-west-1"),
            ];
            let provisioner = Arc::new(RecordingProvisioner::default());

            let stages: Vec<Box<dyn PipelineStage>> = vec![
                Box::new(SourceStage::new(Arc::new(FakeGit))),
                Box::new(SynthStage::new(units.clone())),
                Box::new(BuildStage::new("localhost:5000", Arc::new(FakeBuilder))),
                Box::new(DeployStage::new(units, provisioner.clone())),
            ];
            let pipeline = Pipeline::new("Acme-dev-pipeline", stages).unwrap();
            let mut ctx = RunContext::new(
                super::context().config.clone(),
                workspace.path().to_path_buf(),
            );

            pipeline.run(&mut ctx).await.unwrap();

            assert_eq!(*ctx.state(), RunState::Complete);
            // The source artifact is the build context directory, not an archive
            assert!(ctx.artifact(SOURCE_OUTPUT).unwrap().location.is_dir());
            let image = ctx.image().unwrap().clone();
            assert_eq!(image.tag, "abc123");

            let applied = provisioner.applied.lock().unwrap();
            assert_eq!(applied.len(), 2);
            for plan in applied.iter() {
                assert_eq!(plan.service.image, image);
            }
        }
    }

    #[tokio::test]
    async fn test_failure_is_absorbing_and_halts_the_run() {
        let stages: Vec<Box<dyn PipelineStage>> = vec![
            StubStage::new("Source", vec![], vec![SOURCE_OUTPUT], RunState::SourceFetched),
            StubStage::failing("Synth", RunState::Synthesized, "no revision"),
            StubStage::new("AppBuild", vec![SOURCE_OUTPUT], vec![], RunState::ImageBuilt),
        ];
        let pipeline = Pipeline::new("acme-dev-pipeline", stages).unwrap();
        let mut ctx = context();

        let err = pipeline.run(&mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::SourceFetch(_)));
        assert!(
            matches!(ctx.state(), RunState::Failed { stage, reason }
                if stage == "Synth" && reason == "no revision")
        );
        // AppBuild never ran
        assert!(ctx.image().is_none());
    }
}
