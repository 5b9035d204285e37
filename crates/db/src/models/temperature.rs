//! Temperature reading rows and the 24-hour statistics view.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thermowatch_core::reading::{Reading, StoredReading};
use thermowatch_core::types::{DbId, Timestamp};

/// A row in `temperature_readings`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemperatureReading {
    pub id: DbId,
    pub value: f64,
    pub observed_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting a reading.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemperatureReading {
    pub value: f64,
    pub observed_at: Timestamp,
}

impl From<&Reading> for CreateTemperatureReading {
    fn from(reading: &Reading) -> Self {
        Self {
            value: reading.value,
            observed_at: reading.observed_at,
        }
    }
}

impl From<TemperatureReading> for StoredReading {
    fn from(row: TemperatureReading) -> Self {
        Self {
            id: row.id,
            value: row.value,
            observed_at: row.observed_at,
        }
    }
}

/// Summary of recent readings.
///
/// `current` is the latest reading overall; the aggregates cover the
/// requested window only. All aggregates are `None` when the window is empty.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReadingStats {
    pub current: Option<f64>,
    pub average: Option<f64>,
    pub highest: Option<f64>,
    pub lowest: Option<f64>,
    pub count: i64,
}
