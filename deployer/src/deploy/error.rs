//! Deployment error taxonomy

use engine_api::EngineStatus;

use crate::errors::TransportError;

/// Step of the deploy sequence an engine call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    StatusCheck,
    Submission,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::StatusCheck => "checking deployed version",
            Stage::Submission => "submitting manifest",
        };
        f.write_str(s)
    }
}

/// Errors that end a deploy attempt
///
/// Each variant carries the version hash so the rendered message can be
/// correlated with engine logs.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Engine unreachable or returned garbage
    #[error("deployment hash:{hash}: engine unreachable while {stage}: {source}")]
    Transport {
        hash: String,
        stage: Stage,
        #[source]
        source: TransportError,
    },

    /// Status query failed part way through convergence polling
    #[error(
        "deployment hash:{hash}: engine unreachable on status check {attempt} while waiting for convergence: {source}"
    )]
    PollingUnreachable {
        hash: String,
        attempt: u32,
        #[source]
        source: TransportError,
    },

    /// Engine answered the deploy call with an error status
    #[error("deployment hash:{hash}: engine rejected the manifest: {source}")]
    SubmissionRejected {
        hash: String,
        #[source]
        source: TransportError,
    },

    /// Poll attempts exhausted without READY on the requested version
    #[error(
        "deployment hash:{hash}: timed out after {attempts} status checks, engine reports {last_seen}"
    )]
    ConvergenceTimeout {
        hash: String,
        attempts: u32,
        last_seen: LastSeen,
    },

    /// Shutdown requested while waiting for convergence
    #[error("deployment hash:{hash}: cancelled after {attempts} status checks")]
    Cancelled { hash: String, attempts: u32 },
}

impl DeployError {
    /// Classify a failed deploy submission
    pub fn from_submission(hash: &str, source: TransportError) -> Self {
        if source.is_rejection() {
            DeployError::SubmissionRejected {
                hash: hash.to_string(),
                source,
            }
        } else {
            DeployError::Transport {
                hash: hash.to_string(),
                stage: Stage::Submission,
                source,
            }
        }
    }
}

/// Last engine status observed before giving up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastSeen(pub Option<EngineStatus>);

impl std::fmt::Display for LastSeen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(status) => match &status.version {
                Some(version) => write!(
                    f,
                    "{} at version {} (version mismatch or not ready)",
                    status.system_status, version
                ),
                None => write!(f, "{} with no version deployed", status.system_status),
            },
            None => f.write_str("nothing"),
        }
    }
}
