//! Deploy result mapping
//!
//! Pure translation of every way a deploy attempt can end into the two-field
//! shape callers branch on.

use serde::{Deserialize, Serialize};

use crate::deploy::error::{DeployError, LastSeen};
use crate::deploy::poller::Convergence;

/// Caller-facing deploy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeployStatus {
    Success,
    Failed,
}

/// Result of one deploy call: `{"status": "SUCCESS"|"FAILED", "error"?: string}`
///
/// Only constructed through [`DeployResult::success`] and
/// [`DeployResult::failed`], so a success never carries an error and a failure
/// always does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployResult {
    status: DeployStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DeployResult {
    pub fn success() -> Self {
        Self {
            status: DeployStatus::Success,
            error: None,
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: DeployStatus::Failed,
            error: Some(detail.into()),
        }
    }

    pub fn status(&self) -> DeployStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.status == DeployStatus::Success
    }
}

/// Successful ways a deploy can end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Engine already served the version; nothing was submitted
    AlreadyDeployed,

    /// Submitted and observed READY on the version
    Converged { attempts: u32 },
}

/// Turn a polling run into an outcome or a deploy error for `hash`
pub fn from_convergence(hash: &str, convergence: Convergence) -> Result<DeployOutcome, DeployError> {
    match convergence {
        Convergence::Converged { attempts } => Ok(DeployOutcome::Converged { attempts }),
        Convergence::TimedOut {
            attempts,
            last_seen,
        } => Err(DeployError::ConvergenceTimeout {
            hash: hash.to_string(),
            attempts,
            last_seen: LastSeen(last_seen),
        }),
        Convergence::Unreachable { attempt, error } => Err(DeployError::PollingUnreachable {
            hash: hash.to_string(),
            attempt,
            source: error,
        }),
        Convergence::Cancelled { attempts } => Err(DeployError::Cancelled {
            hash: hash.to_string(),
            attempts,
        }),
    }
}

/// Map the end of a deploy attempt to the caller-facing result
pub fn map_result(result: &Result<DeployOutcome, DeployError>) -> DeployResult {
    match result {
        Ok(_) => DeployResult::success(),
        Err(err) => DeployResult::failed(err.to_string()),
    }
}
