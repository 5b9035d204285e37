use std::sync::Arc;

use thermowatch_core::ingest::IngestionGate;
use thermowatch_core::prediction::FailurePredictor;
use thermowatch_core::risk::RiskThresholds;
use thermowatch_db::PgStore;
use thermowatch_events::EventBus;

use crate::config::{MonitorConfig, ServerConfig};
use crate::ws::WsManager;

/// Ingestion gate wired to Postgres and the in-process event bus.
pub type Gate = IngestionGate<PgStore, EventBus>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: thermowatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Alerting and prediction settings.
    pub monitor: Arc<MonitorConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Live feed shared by the gate, the WebSocket relay and the mailer.
    pub event_bus: Arc<EventBus>,
    /// Owns the alert cooldown state; every submission goes through it.
    pub gate: Arc<Gate>,
    pub predictor: Arc<dyn FailurePredictor>,
    pub risk: RiskThresholds,
}
