//! Handlers for the temperature monitoring endpoints.
//!
//! Submissions go through the shared ingestion gate; everything else is a
//! read over the stored readings and alerts.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::Value;
use thermowatch_core::ingest::Submission;
use thermowatch_core::prediction::{predict_failure, FailurePrediction};
use thermowatch_core::risk::{self, RiskAssessment};
use thermowatch_db::models::alert::Alert;
use thermowatch_db::models::temperature::{ReadingStats, TemperatureReading};
use thermowatch_db::repositories::{AlertRepo, TemperatureRepo};

use crate::error::{AppError, AppResult};
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for reading history.
const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Default page size for alert history.
const DEFAULT_ALERT_LIMIT: i64 = 20;

/// Window covered by the stats endpoint.
const STATS_WINDOW_HOURS: i64 = 24;

/// Pull the reading out of a submission body.
///
/// Sensors post `{"value": ..}`; older firmware sends `{"temperature": ..}`.
fn reading_field(body: &Value) -> Option<&Value> {
    body.get("value").or_else(|| body.get("temperature"))
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// POST /api/v1/temperature
///
/// Validate and store one reading, broadcast it, and run the alert engine.
/// The response carries the stored reading and the alert it raised, if any.
pub async fn submit_reading(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DataResponse<Submission>>)> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let submission = state.gate.submit(reading_field(&body)).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: submission })))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/temperature/latest
pub async fn latest_reading(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<TemperatureReading>>>> {
    let latest = TemperatureRepo::latest(&state.pool).await?;
    Ok(Json(DataResponse { data: latest }))
}

/// GET /api/v1/temperature/stats
///
/// Aggregates over the last 24 hours.
pub async fn reading_stats(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ReadingStats>>> {
    let since = Utc::now() - Duration::hours(STATS_WINDOW_HOURS);
    let stats = TemperatureRepo::stats_since(&state.pool, since).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/temperature/history?limit=
///
/// The latest `limit` readings, oldest first.
pub async fn reading_history(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<TemperatureReading>>>> {
    let limit = thermowatch_db::clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT);
    let history = TemperatureRepo::history(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/temperature/alerts/history?limit=
///
/// The latest `limit` alerts, newest first.
pub async fn alert_history(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<Alert>>>> {
    let limit = thermowatch_db::clamp_limit(params.limit, DEFAULT_ALERT_LIMIT);
    let alerts = AlertRepo::list_recent(&state.pool, limit).await?;
    Ok(Json(DataResponse { data: alerts }))
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// GET /api/v1/temperature/predict
///
/// Rule-based risk tier and score for the latest reading.
pub async fn risk_assessment(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<RiskAssessment>>> {
    let latest = TemperatureRepo::latest(&state.pool).await?;
    let assessment = risk::score(latest.map(|r| r.value), &state.risk);
    Ok(Json(DataResponse { data: assessment }))
}

/// GET /api/v1/temperature/ml-predict
///
/// Failure probability from the external predictor.
pub async fn ml_prediction(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<FailurePrediction>>> {
    let prediction = predict_failure(
        state.gate.store(),
        state.predictor.as_ref(),
        state.monitor.ml_history_limit,
    )
    .await?;
    tracing::info!(probability = prediction.probability, "Failure prediction served");
    Ok(Json(DataResponse { data: prediction }))
}
