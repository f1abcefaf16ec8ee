//! Engine HTTP client tests
//!
//! A small axum server on an ephemeral port stands in for the engine.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::future::FutureExt;
use engine_api::{DeployPayload, EngineStatus, SystemStatus, DEPLOY_PATH, STATUS_PATH};
use mdl_deployer::deploy::{Deployer, NoopEventSink};
use mdl_deployer::errors::TransportError;
use mdl_deployer::http::client::HttpClient;
use mdl_deployer::http::engine::EngineClient;
use mdl_deployer::utils::SleepFn;
use tokio::net::TcpListener;

/// Engine stand-in: adopts every submitted version immediately
struct FakeEngine {
    status: Mutex<EngineStatus>,
    received: Mutex<Vec<serde_json::Value>>,
    status_calls: Mutex<u32>,
    status_error: Option<StatusCode>,
    deploy_error: Option<StatusCode>,
    deploy_delay: Option<Duration>,
    garbage_status: bool,
}

impl FakeEngine {
    fn with_status(system_status: SystemStatus, version: Option<&str>) -> Self {
        Self {
            status: Mutex::new(EngineStatus {
                system_status,
                version: version.map(str::to_string),
            }),
            received: Mutex::new(Vec::new()),
            status_calls: Mutex::new(0),
            status_error: None,
            deploy_error: None,
            deploy_delay: None,
            garbage_status: false,
        }
    }

    fn serving(version: &str) -> Self {
        Self::with_status(SystemStatus::Ready, Some(version))
    }

    /// Engine that has never had a manifest deployed
    fn fresh() -> Self {
        Self::with_status(SystemStatus::Prepare, None)
    }

    fn status_calls(&self) -> u32 {
        *self.status_calls.lock().unwrap()
    }
}

/// Sleep that returns at once and records the requested durations
fn recording_sleep() -> (SleepFn, Arc<Mutex<Vec<Duration>>>) {
    let slept = Arc::new(Mutex::new(Vec::new()));
    let recorder = slept.clone();
    let sleep_fn: SleepFn = Arc::new(move |duration| {
        recorder.lock().unwrap().push(duration);
        async {}.boxed()
    });
    (sleep_fn, slept)
}

async fn status_handler(State(engine): State<Arc<FakeEngine>>) -> Response {
    *engine.status_calls.lock().unwrap() += 1;
    if let Some(code) = engine.status_error {
        return (code, "engine down").into_response();
    }
    if engine.garbage_status {
        return "definitely not json".into_response();
    }
    let status = engine.status.lock().unwrap().clone();
    Json(status).into_response()
}

async fn deploy_handler(
    State(engine): State<Arc<FakeEngine>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    engine.received.lock().unwrap().push(body.clone());
    if let Some(delay) = engine.deploy_delay {
        tokio::time::sleep(delay).await;
    }
    if let Some(code) = engine.deploy_error {
        return (code, "manifest rejected").into_response();
    }
    let payload: DeployPayload = serde_json::from_value(body).unwrap();
    *engine.status.lock().unwrap() = EngineStatus {
        system_status: SystemStatus::Ready,
        version: Some(payload.version),
    };
    StatusCode::ACCEPTED.into_response()
}

async fn spawn_engine(engine: Arc<FakeEngine>) -> String {
    let app = Router::new()
        .route(STATUS_PATH, get(status_handler))
        .route(DEPLOY_PATH, post(deploy_handler))
        .with_state(engine);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_get_status_decodes_engine_response() {
    let engine = Arc::new(FakeEngine::serving("h1"));
    let base_url = spawn_engine(engine).await;
    let client = HttpClient::new(&base_url).unwrap();

    let status = client.get_status().await.unwrap();

    assert_eq!(status.system_status, SystemStatus::Ready);
    assert_eq!(status.version.as_deref(), Some("h1"));
}

#[tokio::test]
async fn test_get_status_accepts_null_version() {
    let engine = Arc::new(FakeEngine::fresh());
    let base_url = spawn_engine(engine).await;

    let raw: serde_json::Value = reqwest::get(format!("{base_url}{STATUS_PATH}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        raw,
        serde_json::json!({"systemStatus": "PREPARE", "version": null})
    );

    let status = HttpClient::new(&base_url).unwrap().get_status().await.unwrap();
    assert_eq!(status.system_status, SystemStatus::Prepare);
    assert_eq!(status.version, None);
}

#[tokio::test]
async fn test_submit_sends_manifest_and_version() {
    let engine = Arc::new(FakeEngine::serving("h1"));
    let base_url = spawn_engine(engine.clone()).await;
    let client = HttpClient::new(&base_url).unwrap();

    let payload = DeployPayload {
        manifest: serde_json::json!({"catalog": "db", "schema": "public"}),
        version: "h2".to_string(),
    };
    client.submit_deploy(&payload).await.unwrap();

    let received = engine.received.lock().unwrap();
    assert_eq!(
        received[0],
        serde_json::json!({
            "manifest": {"catalog": "db", "schema": "public"},
            "version": "h2"
        })
    );
}

#[tokio::test]
async fn test_status_error_code_is_transport_error() {
    let mut engine = FakeEngine::serving("h1");
    engine.status_error = Some(StatusCode::SERVICE_UNAVAILABLE);
    let base_url = spawn_engine(Arc::new(engine)).await;
    let client = HttpClient::new(&base_url).unwrap();

    let err = client.get_status().await.unwrap_err();

    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "engine down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_status_is_transport_error() {
    let mut engine = FakeEngine::serving("h1");
    engine.garbage_status = true;
    let base_url = spawn_engine(Arc::new(engine)).await;
    let client = HttpClient::new(&base_url).unwrap();

    let err = client.get_status().await.unwrap_err();

    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn test_unreachable_engine_is_transport_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.get_status().await.unwrap_err();

    assert!(matches!(err, TransportError::Request(_)));
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn test_deploy_end_to_end() {
    let engine = Arc::new(FakeEngine::serving("h1"));
    let base_url = spawn_engine(engine.clone()).await;
    let client = HttpClient::new(&base_url).unwrap();
    let deployer = Deployer::new(Arc::new(client), Arc::new(NoopEventSink));

    let result = deployer
        .deploy_manifest(serde_json::json!({"models": ["orders"]}), "h2")
        .await;
    assert!(result.is_success(), "deploy failed: {:?}", result.error());
    assert_eq!(engine.received.lock().unwrap().len(), 1);

    // Same hash again: nothing new is submitted.
    let result = deployer
        .deploy_manifest(serde_json::json!({"models": ["orders"]}), "h2")
        .await;
    assert!(result.is_success());
    assert_eq!(engine.received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deploy_rejected_by_engine() {
    let mut engine = FakeEngine::serving("h1");
    engine.deploy_error = Some(StatusCode::BAD_REQUEST);
    let base_url = spawn_engine(Arc::new(engine)).await;
    let client = HttpClient::new(&base_url).unwrap();
    let deployer = Deployer::new(Arc::new(client), Arc::new(NoopEventSink));

    let result = deployer
        .deploy_manifest(serde_json::json!({"models": []}), "h2")
        .await;

    assert!(!result.is_success());
    let error = result.error().unwrap();
    assert!(error.contains("hash:h2"));
    assert!(error.contains("manifest rejected"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "FAILED");
}

#[tokio::test]
async fn test_first_deploy_to_fresh_engine() {
    let engine = Arc::new(FakeEngine::fresh());
    let base_url = spawn_engine(engine.clone()).await;
    let client = HttpClient::new(&base_url).unwrap();
    let deployer = Deployer::new(Arc::new(client), Arc::new(NoopEventSink));

    let result = deployer
        .deploy_manifest(serde_json::json!({"models": ["orders"]}), "h1")
        .await;

    assert!(result.is_success(), "deploy failed: {:?}", result.error());
    let received = engine.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["version"], "h1");
}

#[tokio::test]
async fn test_deploy_connection_failure_is_not_a_rejection() {
    let mut engine = FakeEngine::serving("h1");
    // Outlasts the client timeout, so the POST never gets a response.
    engine.deploy_delay = Some(Duration::from_secs(5));
    let engine = Arc::new(engine);
    let base_url = spawn_engine(engine.clone()).await;
    let client = HttpClient::with_timeout(&base_url, Duration::from_millis(200)).unwrap();
    let (sleep_fn, slept) = recording_sleep();
    let deployer =
        Deployer::new(Arc::new(client), Arc::new(NoopEventSink)).with_sleep_fn(sleep_fn);

    let result = deployer
        .deploy_manifest(serde_json::json!({"models": []}), "h2")
        .await;

    assert!(!result.is_success());
    let error = result.error().unwrap();
    assert!(error.contains("hash:h2"), "unexpected error: {error}");
    assert!(error.contains("engine unreachable while submitting manifest"));
    assert!(!error.contains("rejected"));
    assert_eq!(engine.received.lock().unwrap().len(), 1);
    // Only the idempotency check; no polling after a failed submission.
    assert_eq!(engine.status_calls(), 1);
    assert!(slept.lock().unwrap().is_empty());
}
