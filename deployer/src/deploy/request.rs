//! Deploy request

use engine_api::DeployPayload;

/// A manifest plus the version hash it should be deployed as
///
/// Immutable once created: the hash checked for idempotency, the one submitted
/// and the one awaited during polling all come from the same field.
#[derive(Debug, Clone, PartialEq)]
pub struct DeployRequest {
    manifest: serde_json::Value,
    version_hash: String,
}

impl DeployRequest {
    /// Create a request with a caller-supplied version hash
    pub fn new(manifest: serde_json::Value, version_hash: impl Into<String>) -> Self {
        Self {
            manifest,
            version_hash: version_hash.into(),
        }
    }

    /// Create a request whose version hash is the SHA-256 of the manifest
    pub fn hashed(manifest: serde_json::Value) -> Self {
        let version_hash = crate::utils::manifest_hash(&manifest);
        Self::new(manifest, version_hash)
    }

    pub fn manifest(&self) -> &serde_json::Value {
        &self.manifest
    }

    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }

    /// Wire body for the deploy endpoint
    pub fn payload(&self) -> DeployPayload {
        DeployPayload {
            manifest: self.manifest.clone(),
            version: self.version_hash.clone(),
        }
    }
}
