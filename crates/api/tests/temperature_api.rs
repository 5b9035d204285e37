//! Integration tests for the `/api/v1/temperature` endpoints.
//!
//! Each test gets a fresh migrated database from `sqlx::test`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, get, post_json, StubPredictor};
use serde_json::json;
use sqlx::PgPool;
use thermowatch_db::models::temperature::CreateTemperatureReading;
use thermowatch_db::repositories::{AlertRepo, TemperatureRepo};

/// Insert one reading per value, a minute apart, ending now.
async fn seed_readings(pool: &PgPool, values: &[f64]) {
    let now = Utc::now();
    let n = values.len() as i64;
    for (i, value) in values.iter().enumerate() {
        TemperatureRepo::insert(
            pool,
            &CreateTemperatureReading {
                value: *value,
                observed_at: now - Duration::minutes(n - 1 - i as i64),
            },
        )
        .await
        .unwrap();
    }
}

// ---------------------------------------------------------------------------
// POST /api/v1/temperature
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_normal_reading_returns_201_without_alert(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(app, "/api/v1/temperature", json!({ "value": 45.5 })).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["value"], 45.5);
    assert!(json["data"]["id"].as_i64().unwrap() > 0);
    assert!(json["data"]["alert"].is_null());

    assert!(AlertRepo::list_recent(&pool, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_accepts_temperature_alias_and_numeric_string(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(app, "/api/v1/temperature", json!({ "temperature": "52.5" })).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let latest = TemperatureRepo::latest(&pool).await.unwrap().unwrap();
    assert_eq!(latest.value, 52.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_invalid_value_returns_400_and_stores_nothing(pool: PgPool) {
    for body in [json!({ "value": "hot" }), json!({ "value": null }), json!({})] {
        let app = common::build_test_app(pool.clone());
        let response = post_json(app, "/api/v1/temperature", body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    assert!(TemperatureRepo::latest(&pool).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_malformed_json_returns_400(pool: PgPool) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = common::build_test_app(pool);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/temperature")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn breaches_within_cooldown_record_a_single_alert(pool: PgPool) {
    // One router shares one gate, so the cooldown state carries across requests.
    let app = common::build_test_app(pool.clone());

    let mut raised = Vec::new();
    for value in [65.0, 70.0, 75.0] {
        let response =
            post_json(app.clone(), "/api/v1/temperature", json!({ "value": value })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        raised.push(!body_json(response).await["data"]["alert"].is_null());
    }
    assert_eq!(raised, vec![true, false, false]);

    let alerts = AlertRepo::list_recent(&pool, 10).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].value, 65.0);
    assert_eq!(alerts[0].message, "Temperature 65.0°C exceeded threshold 60°C");

    let response = get(app, "/api/v1/temperature/alerts/history").await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reading_at_threshold_does_not_alert(pool: PgPool) {
    let app = common::build_test_app(pool.clone());

    let response = post_json(app, "/api/v1/temperature", json!({ "value": 60.0 })).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(AlertRepo::list_recent(&pool, 10).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn latest_is_null_on_empty_database(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/temperature/latest").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn history_returns_limit_oldest_first(pool: PgPool) {
    seed_readings(&pool, &[10.0, 20.0, 30.0, 40.0]).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/temperature/history?limit=2").await;

    let json = body_json(response).await;
    let values: Vec<f64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["value"].as_f64().unwrap())
        .collect();
    assert_eq!(values, vec![30.0, 40.0]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_summarise_recent_readings(pool: PgPool) {
    seed_readings(&pool, &[40.0, 50.0, 60.0]).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/temperature/stats").await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["current"], 60.0);
    assert_eq!(data["highest"], 60.0);
    assert_eq!(data["lowest"], 40.0);
    assert_eq!(data["count"], 3);
}

// ---------------------------------------------------------------------------
// GET /api/v1/temperature/predict
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn risk_is_unknown_without_readings(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/temperature/predict").await).await;

    assert_eq!(json["data"]["tier"], "unknown");
    assert!(json["data"]["score"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn risk_scores_latest_reading(pool: PgPool) {
    seed_readings(&pool, &[20.0, 55.0]).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/api/v1/temperature/predict").await).await;

    assert_eq!(json["data"]["tier"], "medium");
    assert_eq!(json["data"]["score"], 50);
}

// ---------------------------------------------------------------------------
// GET /api/v1/temperature/ml-predict
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ml_predict_rejects_short_history(pool: PgPool) {
    seed_readings(&pool, &[50.0; 14]).await;
    let predictor = Arc::new(StubPredictor::returning(0.9));
    let app = common::build_test_app_with_predictor(pool, predictor.clone());

    let response = get(app, "/api/v1/temperature/ml-predict").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INSUFFICIENT_HISTORY");
    assert!(predictor.seen.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ml_predict_returns_probability(pool: PgPool) {
    seed_readings(&pool, &[50.0; 20]).await;
    let predictor = Arc::new(StubPredictor::returning(0.42));
    let app = common::build_test_app_with_predictor(pool, predictor.clone());

    let response = get(app, "/api/v1/temperature/ml-predict").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["probability"], 0.42);
    assert_eq!(*predictor.seen.lock().unwrap(), vec![20]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ml_predict_maps_predictor_failure_to_503(pool: PgPool) {
    seed_readings(&pool, &[50.0; 15]).await;
    let app = common::build_test_app_with_predictor(
        pool,
        Arc::new(StubPredictor::failing("model file missing")),
    );

    let response = get(app, "/api/v1/temperature/ml-predict").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "PREDICTOR_UNAVAILABLE");
}
