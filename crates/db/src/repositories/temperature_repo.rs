//! Repository for the `temperature_readings` table (append-only).

use sqlx::PgPool;
use thermowatch_core::types::Timestamp;

use crate::models::temperature::{CreateTemperatureReading, ReadingStats, TemperatureReading};

/// Column list for `temperature_readings` SELECT queries.
const COLUMNS: &str = "id, value, observed_at, created_at";

/// Provides query operations for temperature readings.
pub struct TemperatureRepo;

impl TemperatureRepo {
    /// Insert a single reading.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateTemperatureReading,
    ) -> Result<TemperatureReading, sqlx::Error> {
        let query = format!(
            "INSERT INTO temperature_readings (value, observed_at) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TemperatureReading>(&query)
            .bind(input.value)
            .bind(input.observed_at)
            .fetch_one(pool)
            .await
    }

    /// The most recent reading, if any.
    pub async fn latest(pool: &PgPool) -> Result<Option<TemperatureReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM temperature_readings \
             ORDER BY observed_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, TemperatureReading>(&query)
            .fetch_optional(pool)
            .await
    }

    /// The `limit` most recent readings, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<TemperatureReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM temperature_readings \
             ORDER BY observed_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, TemperatureReading>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recent readings, oldest first (chart order).
    pub async fn history(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<TemperatureReading>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ( \
                SELECT {COLUMNS} FROM temperature_readings \
                ORDER BY observed_at DESC, id DESC \
                LIMIT $1 \
             ) recent \
             ORDER BY observed_at ASC, id ASC"
        );
        sqlx::query_as::<_, TemperatureReading>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Average, highest and lowest value since `since`, plus the latest value overall.
    pub async fn stats_since(pool: &PgPool, since: Timestamp) -> Result<ReadingStats, sqlx::Error> {
        let query = "\
            SELECT \
                (SELECT value FROM temperature_readings \
                 ORDER BY observed_at DESC, id DESC LIMIT 1) AS current, \
                AVG(value) AS average, \
                MAX(value) AS highest, \
                MIN(value) AS lowest, \
                COUNT(*) AS count \
            FROM temperature_readings \
            WHERE observed_at >= $1";
        sqlx::query_as::<_, ReadingStats>(query)
            .bind(since)
            .fetch_one(pool)
            .await
    }
}
