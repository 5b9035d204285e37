//! Alert history rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thermowatch_core::alert::{AlertEvent, StoredAlert};
use thermowatch_core::types::{DbId, Timestamp};

/// A row in `alerts`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub value: f64,
    pub message: String,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for inserting an alert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlert {
    pub value: f64,
    pub message: String,
    pub occurred_at: Timestamp,
}

impl From<&AlertEvent> for CreateAlert {
    fn from(alert: &AlertEvent) -> Self {
        Self {
            value: alert.value,
            message: alert.message.clone(),
            occurred_at: alert.occurred_at,
        }
    }
}

impl From<Alert> for StoredAlert {
    fn from(row: Alert) -> Self {
        Self {
            id: row.id,
            value: row.value,
            message: row.message,
            occurred_at: row.occurred_at,
        }
    }
}
