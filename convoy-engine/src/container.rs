//! Podman image build helper
//!
//! The image build stage shells out to podman for its
//! login / build / push sequence. Output from every invocation is logged
//! at debug level; a non-zero exit fails the invocation with the captured
//! stderr.

use anyhow::{Context, Result};
use async_trait::async_trait;
use convoy_core::domain::artifact::ImageReference;
use convoy_core::domain::secret::Secret;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Checks that podman is installed and working
pub fn check_podman_available() -> Result<()> {
    let output = Command::new("podman")
        .arg("--version")
        .output()
        .context("Failed to execute 'podman --version'. Is podman installed?")?;

    if !output.status.success() {
        anyhow::bail!("Podman is not working correctly");
    }

    let version = String::from_utf8_lossy(&output.stdout);
    info!("Podman is available: {}", version.trim());

    Ok(())
}

/// Build tool seam for the image build stage
///
/// The stage drives this as: login, build, push. Each step failing is
/// terminal for the stage.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Authenticates against the target registry
    async fn login(&self, registry_host: &str) -> Result<()>;

    /// Builds and tags an image from a build context directory
    async fn build(&self, context_dir: &Path, image: &ImageReference) -> Result<()>;

    /// Pushes a tagged image; only a fully pushed image carries the tag
    async fn push(&self, image: &ImageReference) -> Result<()>;
}

/// Podman-backed image builder
///
/// Carries the dedicated build identity: credentials scoped to exactly one
/// target registry, nothing broader.
pub struct PodmanBuilder {
    username: String,
    password: Secret,
}

impl PodmanBuilder {
    pub fn new(username: impl Into<String>, password: Secret) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    fn run(command: Command, action: &str) -> Result<()> {
        Self::run_with_input(command, None, action)
    }

    /// Runs a podman command, optionally feeding `input` to its stdin
    ///
    /// Secrets go through stdin so they never appear in the process table.
    fn run_with_input(mut command: Command, input: Option<&str>, action: &str) -> Result<()> {
        command
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to execute podman {action}"))?;

        if let Some(input) = input {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| anyhow::anyhow!("podman {action} stdin unavailable"))?;
            stdin
                .write_all(input.as_bytes())
                .with_context(|| format!("Failed to write podman {action} input"))?;
            // Dropping the handle closes the pipe so the child sees EOF
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to execute podman {action}"))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stdout.trim().is_empty() {
            debug!("podman {} stdout: {}", action, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("podman {} stderr: {}", action, stderr.trim());
        }

        if !output.status.success() {
            anyhow::bail!(
                "podman {} failed: exit_code={}, stderr='{}'",
                action,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }
}

#[async_trait]
impl ImageBuilder for PodmanBuilder {
    async fn login(&self, registry_host: &str) -> Result<()> {
        info!(registry = %registry_host, "Authenticating to registry");

        let mut command = Command::new("podman");
        command
            .arg("login")
            .arg("--username")
            .arg(&self.username)
            .arg("--password-stdin")
            .arg(registry_host);

        Self::run_with_input(command, Some(self.password.expose()), "login")
    }

    async fn build(&self, context_dir: &Path, image: &ImageReference) -> Result<()> {
        info!(image = %image, context = %context_dir.display(), "Building image");

        let mut command = Command::new("podman");
        command
            .arg("build")
            .arg("-t")
            .arg(image.to_string())
            .arg(context_dir);

        Self::run(command, "build")
    }

    async fn push(&self, image: &ImageReference) -> Result<()> {
        info!(image = %image, "Pushing image");

        let mut command = Command::new("podman");
        command.arg("push").arg(image.to_string());

        Self::run(command, "push")
    }
}
