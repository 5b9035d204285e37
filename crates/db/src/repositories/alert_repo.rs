//! Repository for the `alerts` table.

use sqlx::PgPool;

use crate::models::alert::{Alert, CreateAlert};

/// Column list for `alerts` SELECT queries.
const COLUMNS: &str = "id, value, message, occurred_at, created_at";

/// Provides query operations for alert history.
pub struct AlertRepo;

impl AlertRepo {
    pub async fn insert(pool: &PgPool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (value, message, occurred_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.value)
            .bind(&input.message)
            .bind(input.occurred_at)
            .fetch_one(pool)
            .await
    }

    /// The `limit` most recent alerts, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM alerts \
             ORDER BY occurred_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
