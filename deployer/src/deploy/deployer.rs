//! Deploy orchestrator
//!
//! Checks the engine's current version, submits the manifest when it differs,
//! then waits for the engine to converge. Every failure ends up as a FAILED
//! [`DeployResult`]; nothing is returned as an `Err`.

use std::sync::Arc;

use engine_api::EngineStatus;
use uuid::Uuid;

use crate::deploy::error::{DeployError, Stage};
use crate::deploy::events::{DeployEvent, DeployEventSink};
use crate::deploy::poller::{ConvergencePoller, ShutdownSignal};
use crate::deploy::request::DeployRequest;
use crate::deploy::result::{from_convergence, map_result, DeployOutcome, DeployResult};
use crate::errors::TransportError;
use crate::http::engine::EngineClient;
use crate::utils::{tokio_sleep, BackoffOptions, SleepFn};

/// Deploys manifests to one engine
pub struct Deployer {
    engine: Arc<dyn EngineClient>,
    backoff: BackoffOptions,
    sleep_fn: SleepFn,
    sink: Arc<dyn DeployEventSink>,
}

impl Deployer {
    /// Create a deployer with the default backoff (6 attempts, 1s unit) and
    /// tokio timers
    pub fn new(engine: Arc<dyn EngineClient>, sink: Arc<dyn DeployEventSink>) -> Self {
        Self {
            engine,
            backoff: BackoffOptions::default(),
            sleep_fn: tokio_sleep(),
            sink,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffOptions) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_sleep_fn(mut self, sleep_fn: SleepFn) -> Self {
        self.sleep_fn = sleep_fn;
        self
    }

    /// Read the engine status once
    pub async fn get_status(&self) -> Result<EngineStatus, TransportError> {
        self.engine.get_status().await
    }

    /// Deploy `manifest` as `version_hash`
    pub async fn deploy_manifest(
        &self,
        manifest: serde_json::Value,
        version_hash: impl Into<String>,
    ) -> DeployResult {
        self.deploy(&DeployRequest::new(manifest, version_hash)).await
    }

    /// Deploy a request, running polling to completion
    pub async fn deploy(&self, request: &DeployRequest) -> DeployResult {
        self.deploy_until(request, Box::pin(std::future::pending::<()>()))
            .await
    }

    /// Deploy a request, giving up on polling once `shutdown` resolves
    pub async fn deploy_until(
        &self,
        request: &DeployRequest,
        mut shutdown: ShutdownSignal,
    ) -> DeployResult {
        let deploy_id = Uuid::new_v4();
        let version = request.version_hash().to_string();
        self.sink.on_event(DeployEvent::Started {
            deploy_id,
            version: version.clone(),
        });

        let result = self.try_deploy(deploy_id, request, &mut shutdown).await;

        match &result {
            Ok(DeployOutcome::Converged { attempts }) => {
                self.sink.on_event(DeployEvent::Converged {
                    deploy_id,
                    version,
                    attempts: *attempts,
                });
            }
            Ok(DeployOutcome::AlreadyDeployed) => {}
            Err(err) => {
                self.sink.on_event(DeployEvent::Failed {
                    deploy_id,
                    version,
                    error: err.to_string(),
                });
            }
        }

        map_result(&result)
    }

    async fn try_deploy(
        &self,
        deploy_id: Uuid,
        request: &DeployRequest,
        shutdown: &mut ShutdownSignal,
    ) -> Result<DeployOutcome, DeployError> {
        let hash = request.version_hash();

        let current = self
            .engine
            .get_status()
            .await
            .map_err(|source| DeployError::Transport {
                hash: hash.to_string(),
                stage: Stage::StatusCheck,
                source,
            })?;

        // A matching version counts as deployed even while the engine is
        // still in PREPARE.
        if current.is_serving(hash) {
            self.sink.on_event(DeployEvent::AlreadyDeployed {
                deploy_id,
                version: hash.to_string(),
                system_status: current.system_status,
            });
            return Ok(DeployOutcome::AlreadyDeployed);
        }

        self.engine
            .submit_deploy(&request.payload())
            .await
            .map_err(|source| DeployError::from_submission(hash, source))?;
        self.sink.on_event(DeployEvent::Submitted {
            deploy_id,
            version: hash.to_string(),
        });

        let poller = ConvergencePoller::new(
            self.engine.as_ref(),
            &self.backoff,
            &self.sleep_fn,
            self.sink.as_ref(),
        );
        let convergence = poller.await_convergence(deploy_id, hash, shutdown).await;
        from_convergence(hash, convergence)
    }
}
