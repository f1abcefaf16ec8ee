//! Utility functions

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

/// Version information for the deployer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Injected sleep, so polling can be driven without real timers
pub type SleepFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

/// Sleep backed by the tokio timer
pub fn tokio_sleep() -> SleepFn {
    Arc::new(|duration| tokio::time::sleep(duration).boxed())
}

/// Linear backoff options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffOptions {
    /// Delay after the first attempt; attempt `n` waits `n` units
    pub unit: Duration,

    /// Number of attempts before giving up
    pub max_attempts: u32,
}

impl Default for BackoffOptions {
    fn default() -> Self {
        Self {
            unit: Duration::from_secs(1),
            max_attempts: 6,
        }
    }
}

impl BackoffOptions {
    /// Sum of every delay if all attempts are used
    pub fn worst_case_wait(&self) -> Duration {
        (1..=self.max_attempts)
            .map(|attempt| calc_linear_backoff(self, attempt))
            .sum()
    }
}

/// Calculate the delay after a 1-indexed attempt
pub fn calc_linear_backoff(options: &BackoffOptions, attempt: u32) -> Duration {
    options.unit.saturating_mul(attempt)
}

/// Version hash of a manifest: SHA-256 of its compact JSON form
pub fn manifest_hash(manifest: &serde_json::Value) -> String {
    // Serializing a Value cannot fail: all keys are strings.
    let bytes = serde_json::to_vec(manifest).unwrap_or_default();
    sha256_hash(&bytes)
}

/// Calculate SHA256 hash of data
pub fn sha256_hash(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Hex encoding utilities
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(data: impl AsRef<[u8]>) -> String {
        let data = data.as_ref();
        let mut result = String::with_capacity(data.len() * 2);
        for byte in data {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}
