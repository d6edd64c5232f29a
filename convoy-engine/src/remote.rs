//! Seams for the remote collaborators
//!
//! The resolver and the source stage depend on these traits rather than on
//! the concrete HTTP clients, so pipeline runs can be tested against
//! in-memory fakes.

use async_trait::async_trait;
use convoy_client::{ClientError, GitHostClient, ParameterStoreClient};
use std::path::{Path, PathBuf};

/// Read interface of the remote parameter store
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Reads `/{prefix}/{stage}/{name}`; absence is `Ok(None)`
    async fn get(
        &self,
        prefix: &str,
        stage: &str,
        name: &str,
    ) -> Result<Option<String>, ClientError>;
}

#[async_trait]
impl ParameterStore for ParameterStoreClient {
    async fn get(
        &self,
        prefix: &str,
        stage: &str,
        name: &str,
    ) -> Result<Option<String>, ClientError> {
        self.get_parameter(prefix, stage, name).await
    }
}

/// Read interface of the Git hosting provider
#[async_trait]
pub trait GitHost: Send + Sync {
    /// Resolves the current head revision of a branch
    async fn head_revision(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, ClientError>;

    /// Materializes a snapshot at a revision under `dest_dir`, returning
    /// the snapshot directory
    async fn download_snapshot(
        &self,
        owner: &str,
        repo: &str,
        revision: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ClientError>;
}

#[async_trait]
impl GitHost for GitHostClient {
    async fn head_revision(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String, ClientError> {
        GitHostClient::head_revision(self, owner, repo, branch).await
    }

    async fn download_snapshot(
        &self,
        owner: &str,
        repo: &str,
        revision: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        GitHostClient::download_snapshot(self, owner, repo, revision, dest_dir).await
    }
}
