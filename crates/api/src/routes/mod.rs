pub mod health;
pub mod temperature;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                 WebSocket live feed
///
/// /temperature                        submit reading (POST)
/// /temperature/latest                 latest reading
/// /temperature/stats                  24h aggregates
/// /temperature/history                recent readings, oldest first
/// /temperature/predict                rule-based risk tier
/// /temperature/ml-predict             predictor failure probability
/// /temperature/alerts/history         recent alerts, newest first
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/temperature", temperature::router())
}
