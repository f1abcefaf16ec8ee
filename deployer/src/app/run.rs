//! Command entry points

use std::future::Future;
use std::sync::Arc;

use engine_api::EngineStatus;
use tracing::info;

use crate::app::options::AppOptions;
use crate::deploy::{DeployEventSink, DeployRequest, DeployResult, Deployer, NoopEventSink};
use crate::errors::DeployerError;
use crate::filesys::file::File;
use crate::http::client::HttpClient;

/// Build a deployer talking to the configured engine
pub fn build_deployer(
    options: &AppOptions,
    sink: Arc<dyn DeployEventSink>,
) -> Result<Deployer, DeployerError> {
    let client = HttpClient::with_timeout(&options.engine_endpoint, options.request_timeout)?;
    Ok(Deployer::new(Arc::new(client), sink).with_backoff(options.backoff.clone()))
}

/// Query the engine status once
pub async fn run_status(options: &AppOptions) -> Result<EngineStatus, DeployerError> {
    let deployer = build_deployer(options, Arc::new(NoopEventSink))?;
    info!("Querying engine status at {}", options.engine_endpoint);
    let status = deployer.get_status().await?;
    Ok(status)
}

/// Load a manifest file into a deploy request
///
/// The manifest must be a JSON object. Without an explicit hash the version is
/// the SHA-256 of the manifest.
pub async fn load_request(
    manifest_file: &File,
    hash: Option<String>,
) -> Result<DeployRequest, DeployerError> {
    let manifest: serde_json::Value = manifest_file.read_json().await?;
    if !manifest.is_object() {
        return Err(DeployerError::ManifestError(format!(
            "{} is not a JSON object",
            manifest_file.path().display()
        )));
    }

    let request = match hash {
        Some(hash) if !hash.trim().is_empty() => DeployRequest::new(manifest, hash.trim()),
        Some(_) => {
            return Err(DeployerError::ManifestError(
                "version hash must not be empty".to_string(),
            ))
        }
        None => DeployRequest::hashed(manifest),
    };
    Ok(request)
}

/// Deploy a manifest file and wait for the engine to serve it
pub async fn run_deploy(
    options: &AppOptions,
    sink: Arc<dyn DeployEventSink>,
    manifest_file: &File,
    hash: Option<String>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<DeployResult, DeployerError> {
    let request = load_request(manifest_file, hash).await?;
    let deployer = build_deployer(options, sink)?;

    info!(
        "Deploying {} as version {} to {} (up to {} status checks, {:?} worst-case wait)",
        manifest_file.path().display(),
        request.version_hash(),
        options.engine_endpoint,
        options.backoff.max_attempts,
        options.backoff.worst_case_wait(),
    );

    Ok(deployer
        .deploy_until(&request, Box::pin(shutdown_signal))
        .await)
}
