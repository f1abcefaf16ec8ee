//! Deploy events
//!
//! Observable interface for a deploy attempt. The orchestrator never logs on
//! its own; it emits events into the sink it was constructed with.

use std::time::Duration;

use engine_api::SystemStatus;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Event emitted during a deploy attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// Deploy call started
    Started { deploy_id: Uuid, version: String },

    /// Engine already serves the requested version
    AlreadyDeployed {
        deploy_id: Uuid,
        version: String,
        system_status: SystemStatus,
    },

    /// Manifest accepted by the deploy endpoint
    Submitted { deploy_id: Uuid, version: String },

    /// One status query during convergence polling
    PollAttempt {
        deploy_id: Uuid,
        attempt: u32,
        system_status: SystemStatus,
        remote_version: Option<String>,
    },

    /// Status query failed during convergence polling; polling stops
    PollFailed {
        deploy_id: Uuid,
        attempt: u32,
        error: String,
    },

    /// Waiting before the next status query
    Backoff {
        deploy_id: Uuid,
        attempt: u32,
        delay: Duration,
    },

    /// Engine is READY on the requested version
    Converged {
        deploy_id: Uuid,
        version: String,
        attempts: u32,
    },

    /// Deploy attempt failed
    Failed {
        deploy_id: Uuid,
        version: String,
        error: String,
    },
}

/// Trait for receiving deploy events
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}

/// Event sink that forwards events to `tracing`
pub struct TracingEventSink;

impl DeployEventSink for TracingEventSink {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::Started { deploy_id, version } => {
                debug!(%deploy_id, %version, "Deploy started");
            }
            DeployEvent::AlreadyDeployed {
                deploy_id,
                version,
                system_status,
            } => {
                info!(%deploy_id, %version, %system_status, "Version already deployed, skipping");
            }
            DeployEvent::Submitted { deploy_id, version } => {
                debug!(%deploy_id, %version, "Manifest submitted");
            }
            DeployEvent::PollAttempt {
                deploy_id,
                attempt,
                system_status,
                remote_version,
            } => {
                debug!(%deploy_id, attempt, %system_status, ?remote_version, "Polled engine status");
            }
            DeployEvent::PollFailed {
                deploy_id,
                attempt,
                error,
            } => {
                warn!(%deploy_id, attempt, %error, "Engine status query failed");
            }
            DeployEvent::Backoff {
                deploy_id,
                attempt,
                delay,
            } => {
                debug!(%deploy_id, attempt, ?delay, "Engine not ready, backing off");
            }
            DeployEvent::Converged {
                deploy_id,
                version,
                attempts,
            } => {
                info!(%deploy_id, %version, attempts, "Deploy succeeded");
            }
            DeployEvent::Failed {
                deploy_id,
                version,
                error,
            } => {
                warn!(%deploy_id, %version, %error, "Deploy failed");
            }
        }
    }
}
