#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use thermowatch_core::error::CoreError;
use thermowatch_core::ingest::IngestionGate;
use thermowatch_core::prediction::{FailurePrediction, FailurePredictor};
use thermowatch_core::reading::Reading;
use thermowatch_db::PgStore;
use thermowatch_events::EventBus;
use tower::ServiceExt;

use thermowatch_api::config::{MonitorConfig, ServerConfig};
use thermowatch_api::router::build_app_router;
use thermowatch_api::state::AppState;
use thermowatch_api::ws::WsManager;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
    }
}

/// Predictor that answers with a fixed result and records history sizes.
pub struct StubPredictor {
    pub result: Result<f64, String>,
    pub seen: std::sync::Mutex<Vec<usize>>,
}

impl StubPredictor {
    pub fn returning(probability: f64) -> Self {
        Self {
            result: Ok(probability),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl FailurePredictor for StubPredictor {
    async fn predict(&self, history: &[Reading]) -> Result<FailurePrediction, CoreError> {
        self.seen.lock().unwrap().push(history.len());
        match &self.result {
            Ok(p) => FailurePrediction::new(*p),
            Err(msg) => Err(CoreError::PredictorUnavailable(msg.clone())),
        }
    }
}

/// Build the application state around `pool` with default monitor settings.
pub fn test_state(pool: PgPool, predictor: Arc<dyn FailurePredictor>) -> AppState {
    let monitor = MonitorConfig::default();
    let event_bus = Arc::new(EventBus::default());
    let gate = Arc::new(IngestionGate::new(
        PgStore::new(pool.clone()),
        Arc::clone(&event_bus),
        monitor.alert_rule().unwrap(),
    ));

    AppState {
        pool,
        config: Arc::new(test_config()),
        risk: monitor.risk_thresholds().unwrap(),
        monitor: Arc::new(monitor),
        ws_manager: Arc::new(WsManager::new()),
        event_bus,
        gate,
        predictor,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_predictor(pool, Arc::new(StubPredictor::returning(0.25)))
}

pub fn build_test_app_with_predictor(pool: PgPool, predictor: Arc<dyn FailurePredictor>) -> Router {
    build_app_router(test_state(pool, predictor), &test_config())
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}
