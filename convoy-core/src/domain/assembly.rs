//! Synthesized deployment bundle
//!
//! The "cloud assembly": resolved configuration values passed through as
//! named build variables, never hard-coded, plus the deploy targets of the
//! run. Synthesis is a deterministic function of (config, revision,
//! execution id, units); the `BTreeMap` keeps variable ordering stable so
//! identical inputs serialize identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::config::PipelineConfig;
use crate::domain::deploy::DeploymentUnit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudAssembly {
    /// Named build-time variables the bundle was synthesized with
    pub build_vars: BTreeMap<String, String>,
    /// Source revision the bundle describes
    pub revision: String,
    /// Pipeline execution this bundle belongs to
    pub execution_id: String,
    /// Deploy targets, in declaration order
    pub units: Vec<DeploymentUnit>,
}

impl CloudAssembly {
    pub fn render(
        config: &PipelineConfig,
        revision: &str,
        execution_id: &str,
        units: &[DeploymentUnit],
    ) -> Self {
        let mut build_vars = BTreeMap::new();
        build_vars.insert("PREFIX".to_string(), config.prefix.clone());
        build_vars.insert("STAGE".to_string(), config.stage_name.clone());
        build_vars.insert("ACCOUNT_ID".to_string(), config.account_id.clone());
        build_vars.insert("REGION".to_string(), config.region.clone());
        build_vars.insert("REPO".to_string(), config.repo_name.clone());
        build_vars.insert("OWNER".to_string(), config.repo_owner.clone());
        build_vars.insert("BRANCH".to_string(), config.branch.clone());
        build_vars.insert("commitId".to_string(), revision.to_string());
        build_vars.insert("execId".to_string(), execution_id.to_string());

        Self {
            build_vars,
            revision: revision.to_string(),
            execution_id: execution_id.to_string(),
            units: units.to_vec(),
        }
    }
}
