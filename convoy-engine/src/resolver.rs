//! Configuration resolver
//!
//! Merges environment-supplied defaults with values read from the remote
//! parameter store. Remote resolution is per-key: a failing lookup (absent
//! key or transport error) falls back to that key's local default without
//! affecting any other key. Lookups use the *local* prefix and stage as
//! the namespace; the namespace itself is never remote-resolved.

use convoy_core::domain::config::PipelineConfig;
use convoy_core::error::PipelineError;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::remote::ParameterStore;

/// Remote parameter keys, one per configuration field
pub const CONFIG_KEYS: [&str; 8] = [
    "PREFIX",
    "STAGE",
    "ACCOUNT_ID",
    "REGION",
    "REPO",
    "OWNER",
    "BRANCH",
    "CREDENTIAL_REF",
];

/// Local configuration defaults read from the process environment
///
/// Expected environment variables (defaults apply only outside managed
/// execution):
/// - PREFIX (default: "local")
/// - STAGE (default: "dev")
/// - RUN_IN_REMOTE_PIPELINE (default: true)
/// - ACCOUNT_ID (default: "000000000000")
/// - REGION (default: "ap-southeast-1")
/// - REPO (default: "sample-service", case sensitive)
/// - OWNER (default: "convoy")
/// - BRANCH (default: "main")
/// - CREDENTIAL_REF (default: "GIT_TOKEN_KEY")
#[derive(Debug, Clone)]
pub struct LocalDefaults {
    pub config: PipelineConfig,
    /// Whether to overlay values from the remote parameter store
    pub resolve_from_remote: bool,
}

impl LocalDefaults {
    /// Creates defaults from environment variables
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        let resolve_from_remote = std::env::var("RUN_IN_REMOTE_PIPELINE")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        Self {
            config: PipelineConfig {
                prefix: var("PREFIX", "local"),
                stage_name: var("STAGE", "dev"),
                account_id: var("ACCOUNT_ID", "000000000000"),
                region: var("REGION", "ap-southeast-1"),
                repo_name: var("REPO", "sample-service"),
                repo_owner: var("OWNER", "convoy"),
                branch: var("BRANCH", "main"),
                credential_ref: var("CREDENTIAL_REF", "GIT_TOKEN_KEY"),
            },
            resolve_from_remote,
        }
    }
}

/// Resolves the finalized pipeline configuration
pub struct ConfigResolver {
    store: Arc<dyn ParameterStore>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn ParameterStore>) -> Self {
        Self { store }
    }

    /// Produces the finalized configuration
    ///
    /// With remote resolution disabled the result equals the local defaults
    /// exactly. With it enabled, each key is looked up at
    /// `/{prefix}/{stage}/{KEY}`; a missing key or transport failure keeps
    /// that key's local default and leaves every other key untouched.
    ///
    /// # Errors
    /// [`PipelineError::Configuration`] when a mandatory field is still
    /// empty after resolution.
    pub async fn resolve(&self, defaults: &LocalDefaults) -> Result<PipelineConfig, PipelineError> {
        let mut config = defaults.config.clone();

        if defaults.resolve_from_remote {
            // Lookup namespace comes from the local defaults even when
            // PREFIX or STAGE are themselves overridden remotely.
            let ns_prefix = defaults.config.prefix.clone();
            let ns_stage = defaults.config.stage_name.clone();

            for key in CONFIG_KEYS {
                match self.store.get(&ns_prefix, &ns_stage, key).await {
                    Ok(Some(value)) => {
                        debug!(key, "Remote parameter overrides local default");
                        Self::apply(&mut config, key, value);
                    }
                    Ok(None) => {
                        debug!(key, "Remote parameter absent, keeping local default");
                    }
                    Err(e) => {
                        warn!(key, error = %e, "Remote parameter lookup failed, keeping local default");
                    }
                }
            }
        }

        config.validate()?;

        info!(
            prefix = %config.prefix,
            stage = %config.stage_name,
            repo = %config.repo_name,
            branch = %config.branch,
            "Pipeline configuration resolved"
        );

        Ok(config)
    }

    fn apply(config: &mut PipelineConfig, key: &str, value: String) {
        match key {
            "PREFIX" => config.prefix = value,
            "STAGE" => config.stage_name = value,
            "ACCOUNT_ID" => config.account_id = value,
            "REGION" => config.region = value,
            "REPO" => config.repo_name = value,
            "OWNER" => config.repo_owner = value,
            "BRANCH" => config.branch = value,
            "CREDENTIAL_REF" => config.credential_ref = value,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use convoy_client::ClientError;
    use std::collections::{HashMap, HashSet};

    /// In-memory parameter store: values keyed by full path, with a set of
    /// key names whose lookups fail.
    #[derive(Default)]
    struct FakeStore {
        values: HashMap<String, String>,
        failing: HashSet<String>,
    }

    impl FakeStore {
        fn with(mut self, prefix: &str, stage: &str, name: &str, value: &str) -> Self {
            self.values
                .insert(format!("/{prefix}/{stage}/{name}"), value.to_string());
            self
        }

        fn failing_on(mut self, name: &str) -> Self {
            self.failing.insert(name.to_string());
            self
        }
    }

    #[async_trait]
    impl ParameterStore for FakeStore {
        async fn get(
            &self,
            prefix: &str,
            stage: &str,
            name: &str,
        ) -> Result<Option<String>, ClientError> {
            if self.failing.contains(name) {
                return Err(ClientError::api_error(500, "store unreachable"));
            }
            Ok(self.values.get(&format!("/{prefix}/{stage}/{name}")).cloned())
        }
    }

    fn defaults(remote: bool) -> LocalDefaults {
        LocalDefaults {
            config: PipelineConfig {
                prefix: "Acme".to_string(),
                stage_name: "dev".to_string(),
                account_id: "000000000000".to_string(),
                region: "ap-southeast-1".to_string(),
                repo_name: "svc".to_string(),
                repo_owner: "org".to_string(),
                branch: "main".to_string(),
                credential_ref: "GIT_TOKEN_KEY".to_string(),
            },
            resolve_from_remote: remote,
        }
    }

    #[tokio::test]
    async fn test_disabled_remote_resolution_is_identity() {
        let store = FakeStore::default().with("Acme", "dev", "PREFIX", "ShouldNotApply");
        let resolver = ConfigResolver::new(Arc::new(store));

        let config = resolver.resolve(&defaults(false)).await.unwrap();

        assert_eq!(config, defaults(false).config);
    }

    #[tokio::test]
    async fn test_absent_key_falls_back_per_key() {
        // PREFIX present remotely, STAGE absent
        let store = FakeStore::default().with("Acme", "dev", "PREFIX", "Acme2");
        let resolver = ConfigResolver::new(Arc::new(store));

        let config = resolver.resolve(&defaults(true)).await.unwrap();

        assert_eq!(config.prefix, "Acme2");
        assert_eq!(config.stage_name, "dev");
    }

    #[tokio::test]
    async fn test_failing_key_does_not_affect_others() {
        let store = FakeStore::default()
            .with("Acme", "dev", "REGION", "eu-west-1")
            .with("Acme", "dev", "BRANCH", "release")
            .failing_on("ACCOUNT_ID");
        let resolver = ConfigResolver::new(Arc::new(store));

        let config = resolver.resolve(&defaults(true)).await.unwrap();

        // The failing key keeps its local default
        assert_eq!(config.account_id, "000000000000");
        // Every other key is unaffected by the failure
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.branch, "release");
        assert_eq!(config.repo_name, "svc");
    }

    #[tokio::test]
    async fn test_lookup_namespace_stays_local() {
        // STAGE is stored under the local namespace /Acme/dev even though
        // PREFIX (listed first) overrides to Acme2 mid-resolution.
        let store = FakeStore::default()
            .with("Acme", "dev", "PREFIX", "Acme2")
            .with("Acme", "dev", "STAGE", "prod")
            .with("Acme2", "dev", "STAGE", "wrong-namespace");
        let resolver = ConfigResolver::new(Arc::new(store));

        let config = resolver.resolve(&defaults(true)).await.unwrap();

        assert_eq!(config.prefix, "Acme2");
        assert_eq!(config.stage_name, "prod");
    }

    #[tokio::test]
    async fn test_empty_field_after_resolution_is_fatal() {
        let mut local = defaults(false);
        local.config.branch = String::new();
        let resolver = ConfigResolver::new(Arc::new(FakeStore::default()));

        let err = resolver.resolve(&local).await.unwrap_err();

        assert!(matches!(err, PipelineError::Configuration { .. }));
    }
}
