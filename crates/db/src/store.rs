//! Postgres implementation of the core storage seams.

use async_trait::async_trait;
use thermowatch_core::alert::{AlertEvent, StoredAlert};
use thermowatch_core::error::CoreError;
use thermowatch_core::ingest::{AlertStore, ReadingStore};
use thermowatch_core::reading::{Reading, StoredReading};

use crate::models::alert::CreateAlert;
use crate::models::temperature::CreateTemperatureReading;
use crate::repositories::{AlertRepo, TemperatureRepo};
use crate::DbPool;

/// [`ReadingStore`] and [`AlertStore`] over a connection pool.
///
/// Cheap to clone; the pool is reference counted.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn storage_error(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

#[async_trait]
impl ReadingStore for PgStore {
    async fn insert_reading(&self, reading: &Reading) -> Result<StoredReading, CoreError> {
        let row = TemperatureRepo::insert(&self.pool, &CreateTemperatureReading::from(reading))
            .await
            .map_err(storage_error)?;
        Ok(row.into())
    }

    async fn latest_reading(&self) -> Result<Option<StoredReading>, CoreError> {
        let row = TemperatureRepo::latest(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Into::into))
    }

    async fn recent_readings(&self, limit: i64) -> Result<Vec<StoredReading>, CoreError> {
        let rows = TemperatureRepo::list_recent(&self.pool, limit)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl AlertStore for PgStore {
    async fn insert_alert(&self, alert: &AlertEvent) -> Result<StoredAlert, CoreError> {
        let row = AlertRepo::insert(&self.pool, &CreateAlert::from(alert))
            .await
            .map_err(storage_error)?;
        Ok(row.into())
    }
}
