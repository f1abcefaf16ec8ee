//! API models

use serde::{Deserialize, Serialize};

/// Body of `POST /v1/mdl/deploy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployPayload {
    /// The MDL manifest, passed through untouched
    pub manifest: serde_json::Value,

    /// Version hash the engine should adopt
    pub version: String,
}

/// Lifecycle phase reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemStatus {
    /// Engine is serving the reported version
    Ready,

    /// Engine is still applying a deployment
    Prepare,

    /// Any phase this client does not know about
    #[default]
    #[serde(other)]
    Unknown,
}

impl SystemStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SystemStatus::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Ready => "READY",
            SystemStatus::Prepare => "PREPARE",
            SystemStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `GET /v1/mdl/status`
///
/// An engine that has never been deployed to reports `"version": null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    #[serde(default)]
    pub system_status: SystemStatus,

    #[serde(default)]
    pub version: Option<String>,
}

impl EngineStatus {
    /// True when the engine reports `version`, whatever its phase
    pub fn is_serving(&self, version: &str) -> bool {
        self.version.as_deref() == Some(version)
    }

    /// True when the engine is READY and serving `version`
    pub fn has_converged_on(&self, version: &str) -> bool {
        self.system_status.is_ready() && self.is_serving(version)
    }
}
