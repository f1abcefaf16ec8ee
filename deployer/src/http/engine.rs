//! Engine API client

use async_trait::async_trait;
use engine_api::{DeployPayload, EngineStatus, DEPLOY_PATH, STATUS_PATH};

use crate::errors::TransportError;
use crate::http::client::HttpClient;

/// Engine operations used by the deployer, as a trait for testability
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Read the engine's current phase and applied version. Never retries.
    async fn get_status(&self) -> Result<EngineStatus, TransportError>;

    /// Submit a manifest for deployment. The response body is ignored.
    async fn submit_deploy(&self, payload: &DeployPayload) -> Result<(), TransportError>;
}

#[async_trait]
impl EngineClient for HttpClient {
    async fn get_status(&self) -> Result<EngineStatus, TransportError> {
        self.get(STATUS_PATH).await
    }

    async fn submit_deploy(&self, payload: &DeployPayload) -> Result<(), TransportError> {
        self.post(DEPLOY_PATH, payload).await
    }
}
