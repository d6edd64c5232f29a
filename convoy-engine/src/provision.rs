//! Provisioner seam
//!
//! Actual cloud resource convergence is an external collaborator; the
//! engine renders plans and hands them over. The dry-run provisioner
//! writes each rendered plan to the output directory so a run can be
//! inspected without touching any infrastructure.

use anyhow::{Context, Result};
use async_trait::async_trait;
use convoy_core::domain::deploy::ProvisioningPlan;
use std::path::PathBuf;
use tracing::info;

/// Applies a rendered provisioning plan for one deployment unit
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn apply(&self, plan: &ProvisioningPlan) -> Result<()>;
}

/// Provisioner that writes plans to disk instead of converging resources
pub struct DryRunProvisioner {
    out_dir: PathBuf,
}

impl DryRunProvisioner {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

#[async_trait]
impl Provisioner for DryRunProvisioner {
    async fn apply(&self, plan: &ProvisioningPlan) -> Result<()> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .context("Failed to create output directory")?;

        let path = self.out_dir.join(format!("{}.plan.json", plan.unit));
        let json =
            serde_json::to_vec_pretty(plan).context("Failed to serialize provisioning plan")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write plan for unit '{}'", plan.unit))?;

        info!(unit = %plan.unit, path = %path.display(), "Provisioning plan written (dry run)");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_core::domain::artifact::ImageReference;
    use convoy_core::domain::config::PipelineConfig;
    use convoy_core::domain::deploy::DeploymentUnit;

    #[tokio::test]
    async fn test_dry_run_writes_plan() {
        let dir = tempfile::tempdir().unwrap();
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
        let image = ImageReference::new("localhost:5000/acme-dev-repo", "abc123");
        let plan = ProvisioningPlan::render(&config, &DeploymentUnit::new("app"), &image);

        let provisioner = DryRunProvisioner::new(dir.path().to_path_buf());
        provisioner.apply(&plan).await.unwrap();

        let written = std::fs::read_to_string(dir.path().join("app.plan.json")).unwrap();
        let parsed: ProvisioningPlan = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, plan);
    }
}
