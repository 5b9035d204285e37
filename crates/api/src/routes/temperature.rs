use axum::routing::{get, post};
use axum::Router;

use crate::handlers::temperature;
use crate::state::AppState;

/// Routes mounted at `/temperature`.
///
/// ```text
/// POST /                  -> submit_reading
/// GET  /latest            -> latest_reading
/// GET  /stats             -> reading_stats
/// GET  /history           -> reading_history
/// GET  /predict           -> risk_assessment
/// GET  /ml-predict        -> ml_prediction
/// GET  /alerts/history    -> alert_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(temperature::submit_reading))
        .route("/latest", get(temperature::latest_reading))
        .route("/stats", get(temperature::reading_stats))
        .route("/history", get(temperature::reading_history))
        .route("/predict", get(temperature::risk_assessment))
        .route("/ml-predict", get(temperature::ml_prediction))
        .route("/alerts/history", get(temperature::alert_history))
}
