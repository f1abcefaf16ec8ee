//! Engine API models
//!
//! Request and response shapes for the MDL engine HTTP surface.

pub mod models;

pub use models::{DeployPayload, EngineStatus, SystemStatus};

/// Path of the deploy endpoint, relative to the engine base URL
pub const DEPLOY_PATH: &str = "/v1/mdl/deploy";

/// Path of the status endpoint, relative to the engine base URL
pub const STATUS_PATH: &str = "/v1/mdl/status";
