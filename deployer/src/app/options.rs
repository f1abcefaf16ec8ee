//! Application configuration options

use std::time::Duration;

use url::Url;

use crate::errors::DeployerError;
use crate::storage::settings::Settings;
use crate::utils::BackoffOptions;

/// Resolved runtime options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Engine base URL, without a trailing slash
    pub engine_endpoint: String,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Convergence polling backoff
    pub backoff: BackoffOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            engine_endpoint: "http://localhost:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            backoff: BackoffOptions::default(),
        }
    }
}

impl AppOptions {
    /// Build options from settings, validating the endpoint
    pub fn from_settings(settings: &Settings) -> Result<Self, DeployerError> {
        if settings.convergence.max_attempts == 0 {
            return Err(DeployerError::ConfigError(
                "convergence.max_attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            engine_endpoint: validate_endpoint(&settings.engine.endpoint)?,
            request_timeout: Duration::from_secs(settings.engine.request_timeout_secs),
            backoff: BackoffOptions {
                unit: Duration::from_millis(settings.convergence.backoff_unit_ms),
                max_attempts: settings.convergence.max_attempts,
            },
        })
    }
}

/// Check that `endpoint` is an http(s) URL and strip trailing slashes
pub fn validate_endpoint(endpoint: &str) -> Result<String, DeployerError> {
    let url = Url::parse(endpoint)
        .map_err(|e| DeployerError::ConfigError(format!("invalid engine endpoint {endpoint}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(endpoint.trim_end_matches('/').to_string()),
        scheme => Err(DeployerError::ConfigError(format!(
            "unsupported engine endpoint scheme: {scheme}"
        ))),
    }
}
