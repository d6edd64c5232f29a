//! Source stage
//!
//! Fetches a snapshot of the tracked branch from the Git hosting provider.
//! Trigger mode is polling: the head revision is resolved at run time and
//! recorded as the run's commit id. Authentication failures and missing
//! repos or branches are terminal for the run; retries are an
//! operator-level re-trigger, not a concern of this stage.

use async_trait::async_trait;
use convoy_core::domain::artifact::{Artifact, SOURCE_OUTPUT};
use convoy_core::domain::run::RunState;
use convoy_core::error::PipelineError;
use std::sync::Arc;
use tracing::info;

use crate::remote::GitHost;
use crate::stage::{PipelineStage, RunContext};

pub struct SourceStage {
    git: Arc<dyn GitHost>,
}

impl SourceStage {
    pub fn new(git: Arc<dyn GitHost>) -> Self {
        Self { git }
    }
}

#[async_trait]
impl PipelineStage for SourceStage {
    fn name(&self) -> &'static str {
        "Source"
    }

    fn outputs(&self) -> Vec<&'static str> {
        vec![SOURCE_OUTPUT]
    }

    fn completed_state(&self) -> RunState {
        RunState::SourceFetched
    }

    async fn execute(&self, ctx: &mut RunContext) -> Result<(), PipelineError> {
        let owner = ctx.config.repo_owner.clone();
        let repo = ctx.config.repo_name.clone();
        let branch = ctx.config.branch.clone();

        let revision = self
            .git
            .head_revision(&owner, &repo, &branch)
            .await
            .map_err(|e| PipelineError::SourceFetch(e.to_string()))?;

        info!(revision = %revision, branch = %branch, "Resolved head revision");

        let dest = ctx.workspace.join("source");
        let location = self
            .git
            .download_snapshot(&owner, &repo, &revision, &dest)
            .await
            .map_err(|e| PipelineError::SourceFetch(e.to_string()))?;

        ctx.metadata.commit_id = Some(revision);
        ctx.put_artifact(Artifact {
            name: SOURCE_OUTPUT.to_string(),
            location,
            produced_by: self.name().to_string(),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_client::ClientError;
    use convoy_core::domain::config::PipelineConfig;
    use std::path::{Path, PathBuf};

    struct FakeGit {
        revision: Option<String>,
    }

    #[async_trait]
    impl GitHost for FakeGit {
        async fn head_revision(
            &self,
            _owner: &str,
            _repo: &str,
            branch: &str,
        ) -> Result<String, ClientError> {
            self.revision
                .clone()
                .ok_or_else(|| ClientError::AuthFailed(format!("credential rejected for {branch}")))
        }

        async fn download_snapshot(
            &self,
            _owner: &str,
            repo: &str,
            revision: &str,
            dest_dir: &Path,
        ) -> Result<PathBuf, ClientError> {
            Ok(dest_dir.join(format!("{repo}-{revision}")))
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

    #[tokio::test]
    async fn test_records_revision_and_artifact() {
        let stage = SourceStage::new(Arc::new(FakeGit {
            revision: Some("abc123".to_string()),
        }));
        let mut ctx = context();

        stage.execute(&mut ctx).await.unwrap();

        assert_eq!(ctx.metadata.commit_id.as_deref(), Some("abc123"));
        let artifact = ctx.artifact(SOURCE_OUTPUT).unwrap();
        assert_eq!(artifact.produced_by, "Source");
    }

    #[tokio::test]
    async fn test_auth_failure_is_terminal() {
        let stage = SourceStage::new(Arc::new(FakeGit { revision: None }));
        let mut ctx = context();

        let err = stage.execute(&mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::SourceFetch(_)));
        assert!(!ctx.has_artifact(SOURCE_OUTPUT));
    }
}
