//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::DeployerError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Environment variable overriding the engine endpoint
pub const ENGINE_ENDPOINT_ENV: &str = "MDL_ENGINE_ENDPOINT";

/// Deployer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Also write logs to a daily rolling file in this directory
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Engine configuration
    #[serde(default)]
    pub engine: EngineSettings,

    /// Convergence polling configuration
    #[serde(default)]
    pub convergence: ConvergenceSettings,
}

impl Settings {
    /// Read settings from a JSON file, falling back to defaults when the file
    /// does not exist
    pub async fn load(file: &File) -> Result<Self, DeployerError> {
        if !file.exists().await {
            return Ok(Self::default());
        }
        file.read_json().await
    }

    /// Apply the endpoint environment override
    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(ENGINE_ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.engine.endpoint = endpoint;
            }
        }
    }
}

/// Engine API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Base URL of the engine
    #[serde(default = "default_engine_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_engine_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            endpoint: default_engine_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Convergence polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceSettings {
    /// Status checks before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit in milliseconds; attempt `n` waits `n` units
    #[serde(default = "default_backoff_unit")]
    pub backoff_unit_ms: u64,
}

fn default_max_attempts() -> u32 {
    6
}

fn default_backoff_unit() -> u64 {
    1000
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit(),
        }
    }
}
