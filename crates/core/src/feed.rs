//! Live feed events pushed to dashboards.
//!
//! A [`FeedEvent`] is the envelope every broadcast carries. The topic names
//! are part of the client contract and must not change.

use serde::{Deserialize, Serialize};

use crate::alert::AlertEvent;
use crate::reading::StoredReading;
use crate::types::Timestamp;

/// Topic of a live feed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedTopic {
    #[serde(rename = "new-temperature")]
    NewTemperature,
    #[serde(rename = "new-alert")]
    NewAlert,
    #[serde(rename = "error")]
    Error,
}

impl FeedTopic {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedTopic::NewTemperature => "new-temperature",
            FeedTopic::NewAlert => "new-alert",
            FeedTopic::Error => "error",
        }
    }
}

/// A single broadcast on the live feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEvent {
    pub topic: FeedTopic,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
}

impl FeedEvent {
    pub fn new(topic: FeedTopic, payload: serde_json::Value) -> Self {
        Self {
            topic,
            payload,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn new_temperature(reading: &StoredReading) -> Self {
        Self::new(FeedTopic::NewTemperature, to_payload(reading))
    }

    pub fn new_alert(alert: &AlertEvent) -> Self {
        Self::new(FeedTopic::NewAlert, to_payload(alert))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            FeedTopic::Error,
            serde_json::json!({ "message": message.into() }),
        )
    }

    /// Decode the payload of a [`FeedTopic::NewAlert`] event.
    pub fn alert(&self) -> Option<AlertEvent> {
        if self.topic != FeedTopic::NewAlert {
            return None;
        }
        serde_json::from_value(self.payload.clone()).ok()
    }
}

// Plain structs of numbers, strings and timestamps always serialize.
fn to_payload<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}
