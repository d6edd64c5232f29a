//! Remote parameter store client
//!
//! Reads string parameters keyed by hierarchical path
//! `/{prefix}/{stage}/{NAME}`. Absence is a typed outcome (`Ok(None)`),
//! not an error terminating the program: the configuration resolver falls
//! back to local defaults per key.

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Response payload for a parameter read
#[derive(Debug, Deserialize)]
struct ParameterValue {
    value: String,
}

/// HTTP client for the remote parameter store
#[derive(Debug, Clone)]
pub struct ParameterStoreClient {
    /// Base URL of the store (e.g. "http://localhost:8081")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ParameterStoreClient {
    /// Create a new parameter store client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client with a custom HTTP client (timeouts, proxies, TLS)
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the store
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the hierarchical key path for a parameter
    pub fn key_path(prefix: &str, stage: &str, name: &str) -> String {
        format!("/{prefix}/{stage}/{name}")
    }

    /// Reads a parameter
    ///
    /// # Returns
    /// `Ok(Some(value))` when the key exists, `Ok(None)` when the store
    /// reports it does not.
    pub async fn get_parameter(
        &self,
        prefix: &str,
        stage: &str,
        name: &str,
    ) -> Result<Option<String>> {
        let path = Self::key_path(prefix, stage, name);
        let url = format!("{}/parameters{}", self.base_url, path);

        debug!(key = %path, "Reading remote parameter");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let payload: ParameterValue = response.json().await.map_err(|e| {
            ClientError::ParseError(format!("Failed to parse parameter response: {e}"))
        })?;

        Ok(Some(payload.value))
    }
}
