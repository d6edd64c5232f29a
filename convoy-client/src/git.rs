//! Git hosting provider client
//!
//! Resolves the head revision of a branch and downloads source snapshots.
//! The credential is injected as a [`Secret`] at construction time and
//! only ever leaves this client as an Authorization header; it is never
//! logged and never written into artifact content.

use convoy_core::domain::secret::Secret;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ClientError, Result};

#[derive(Debug, Deserialize)]
struct BranchInfo {
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

/// HTTP client for the Git hosting provider API
#[derive(Debug, Clone)]
pub struct GitHostClient {
    /// Base URL of the provider API (e.g. "https://api.github.com")
    base_url: String,
    credential: Secret,
    client: Client,
}

impl GitHostClient {
    /// Create a new Git host client
    pub fn new(base_url: impl Into<String>, credential: Secret) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
            client: Client::new(),
        }
    }

    /// Get the base URL of the provider
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn check_status(&self, status: StatusCode, what: &str) -> Result<()> {
        match status {
            s if s.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::AuthFailed(
                format!("credential rejected by {}", self.base_url),
            )),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(what.to_string())),
            s => Err(ClientError::api_error(
                s.as_u16(),
                format!("unexpected response for {what}"),
            )),
        }
    }

    /// Resolves the current head revision of a branch
    ///
    /// This is the polling trigger: the pipeline asks for the latest
    /// commit rather than being pushed to by the provider.
    pub async fn head_revision(&self, owner: &str, repo: &str, branch: &str) -> Result<String> {
        let url = format!("{}/repos/{owner}/{repo}/branches/{branch}", self.base_url);

        debug!(owner, repo, branch, "Resolving head revision");

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.credential.expose())
            .send()
            .await?;

        self.check_status(response.status(), &format!("{owner}/{repo}@{branch}"))?;

        let info: BranchInfo = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse branch response: {e}")))?;

        Ok(info.commit.sha)
    }

    /// Downloads a snapshot of the repository at a revision
    ///
    /// Fetches the snapshot tarball, extracts it into a directory under
    /// `dest_dir`, and returns that directory. Later stages use the result
    /// as a container build context, which must be a directory, never the
    /// raw archive.
    pub async fn download_snapshot(
        &self,
        owner: &str,
        repo: &str,
        revision: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let url = format!("{}/repos/{owner}/{repo}/tarball/{revision}", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.credential.expose())
            .send()
            .await?;

        self.check_status(response.status(), &format!("{owner}/{repo}@{revision}"))?;

        let bytes = response.bytes().await?;

        let dest = dest_dir.join(format!("{repo}-{revision}"));
        tokio::fs::create_dir_all(&dest).await?;
        extract_snapshot(&bytes, &dest)?;

        info!(
            revision,
            bytes = bytes.len(),
            dest = %dest.display(),
            "Source snapshot downloaded and extracted"
        );

        Ok(dest)
    }
}

/// Unpacks a gzipped snapshot tarball into `dest`
///
/// Provider tarballs wrap everything in a single `{repo}-{revision}/` top
/// directory; that component is stripped so `dest` holds the repository
/// content directly.
fn extract_snapshot(bytes: &[u8], dest: &Path) -> Result<()> {
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?;

        let stripped: PathBuf = path.components().skip(1).collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(stripped);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        entry.unpack(&target)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GitHostClient::new("https://api.github.com/", Secret::new("token"));
        assert_eq!(client.base_url(), "https://api.github.com");
    }

    #[test]
    fn test_debug_does_not_leak_credential() {
        let client = GitHostClient::new("https://api.github.com", Secret::new("hunter2"));
        assert!(!format!("{client:?}").contains("hunter2"));
    }

    #[test]
    fn test_extract_snapshot_yields_build_context_directory() {
        use flate2::Compression;
        use flate2::write::GzEncoder;

        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, content) in [
            ("svc-abc123/Dockerfile", "FROM scratch\n"),
            ("svc-abc123/src/main.rs", "fn main() {}\n"),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, content.as_bytes())
                .unwrap();
        }
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("svc-abc123");
        std::fs::create_dir_all(&dest).unwrap();

        extract_snapshot(&bytes, &dest).unwrap();

        // The result is a directory usable as a container build context,
        // with the tarball's wrapping top directory stripped.
        assert!(dest.is_dir());
        assert_eq!(
            std::fs::read_to_string(dest.join("Dockerfile")).unwrap(),
            "FROM scratch\n"
        );
        assert_eq!(
            std::fs::read_to_string(dest.join("src/main.rs")).unwrap(),
            "fn main() {}\n"
        );
    }

    #[test]
    fn test_status_mapping() {
        let client = GitHostClient::new("https://api.github.com", Secret::new("t"));

        assert!(
            client
                .check_status(StatusCode::UNAUTHORIZED, "org/svc@main")
                .unwrap_err()
                .is_auth_error()
        );
        assert!(
            client
                .check_status(StatusCode::NOT_FOUND, "org/svc@main")
                .unwrap_err()
                .is_not_found()
        );
        assert!(client.check_status(StatusCode::OK, "org/svc@main").is_ok());
    }
}
