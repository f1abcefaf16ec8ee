//! Error types for the MDL deployer

use thiserror::Error;

/// Main error type for the deployer binary and its configuration layer
#[derive(Error, Debug)]
pub enum DeployerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Engine error: {0}")]
    EngineError(#[from] TransportError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid manifest: {0}")]
    ManifestError(String),
}

/// Failure talking to the engine over HTTP
///
/// Always terminal for the operation that produced it; callers decide whether
/// to try again.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection refused, timeout, or an undecodable response body
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The engine answered with a non-success status
    #[error("engine responded {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl TransportError {
    /// True when the engine was reached and answered with an error status
    pub fn is_rejection(&self) -> bool {
        matches!(self, TransportError::Status { .. })
    }
}
