//! Ingestion gate: validate, persist, broadcast, then run the alert engine.
//!
//! The gate holds no business rules of its own. It sequences the
//! collaborators behind [`ReadingStore`], [`AlertStore`] and [`Publisher`]
//! and owns the single [`AlertState`] instance.
//!
//! Failure asymmetry: a failed reading write fails the submission and the
//! engine never sees that reading; a failed alert write is logged and the
//! submission still succeeds, because the reading is already durable.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::alert::{decide, AlertEvent, AlertRule, AlertState, Decision, StoredAlert};
use crate::error::CoreError;
use crate::feed::FeedEvent;
use crate::reading::{parse_reading_value, Reading, StoredReading};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// Durable storage for readings.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    async fn insert_reading(&self, reading: &Reading) -> Result<StoredReading, CoreError>;

    async fn latest_reading(&self) -> Result<Option<StoredReading>, CoreError>;

    /// The `limit` most recent readings, newest first.
    async fn recent_readings(&self, limit: i64) -> Result<Vec<StoredReading>, CoreError>;
}

/// Durable storage for alert history.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn insert_alert(&self, alert: &AlertEvent) -> Result<StoredAlert, CoreError>;
}

/// Fire-and-forget live feed.
pub trait Publisher: Send + Sync {
    fn publish(&self, event: FeedEvent) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// IngestionGate
// ---------------------------------------------------------------------------

/// Result of an accepted submission.
///
/// Serializes as the stored reading's fields plus an `alert` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    #[serde(flatten)]
    pub reading: StoredReading,
    /// The alert emitted for this reading, if any.
    pub alert: Option<AlertEvent>,
}

pub struct IngestionGate<S, P: ?Sized> {
    store: S,
    publisher: Arc<P>,
    rule: AlertRule,
    state: Mutex<AlertState>,
}

impl<S, P> IngestionGate<S, P>
where
    S: ReadingStore + AlertStore,
    P: Publisher + ?Sized,
{
    pub fn new(store: S, publisher: Arc<P>, rule: AlertRule) -> Self {
        Self {
            store,
            publisher,
            rule,
            state: Mutex::new(AlertState::new()),
        }
    }

    pub fn rule(&self) -> &AlertRule {
        &self.rule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the cooldown state.
    pub async fn alert_state(&self) -> AlertState {
        *self.state.lock().await
    }

    /// Accept a raw reading value observed now.
    pub async fn submit(&self, raw: Option<&serde_json::Value>) -> Result<Submission, CoreError> {
        self.submit_at(raw, chrono::Utc::now()).await
    }

    /// Accept a raw reading value observed at `now`.
    pub async fn submit_at(
        &self,
        raw: Option<&serde_json::Value>,
        now: Timestamp,
    ) -> Result<Submission, CoreError> {
        let value = parse_reading_value(raw)?;
        let reading = Reading {
            value,
            observed_at: now,
        };

        let stored = match self.store.insert_reading(&reading).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(error = %e, value, "Failed to persist temperature reading");
                self.broadcast(FeedEvent::error("Error saving temperature data on server."));
                return Err(e);
            }
        };

        self.broadcast(FeedEvent::new_temperature(&stored));

        // Decide under the lock so two concurrent breaches cannot both pass
        // the cooldown check. No I/O happens while the lock is held.
        let decision = {
            let mut state = self.state.lock().await;
            let (decision, next) = decide(&self.rule, &reading, now, *state);
            *state = next;
            decision
        };

        let alert = match decision {
            Decision::Normal => None,
            Decision::Suppressed { last_alert_sent_at } => {
                tracing::info!(
                    value,
                    threshold = self.rule.high_threshold(),
                    %last_alert_sent_at,
                    "High temperature detected, but within cooldown period"
                );
                None
            }
            Decision::Alert(alert) => {
                tracing::warn!(
                    value,
                    threshold = self.rule.high_threshold(),
                    "High temperature detected, raising alert"
                );
                match self.store.insert_alert(&alert).await {
                    Ok(saved) => tracing::debug!(alert_id = saved.id, "Alert saved"),
                    Err(e) => tracing::error!(error = %e, "Failed to persist alert"),
                }
                self.broadcast(FeedEvent::new_alert(&alert));
                Some(alert)
            }
        };

        Ok(Submission {
            reading: stored,
            alert,
        })
    }

    fn broadcast(&self, event: FeedEvent) {
        let topic = event.topic.as_str();
        if let Err(e) = self.publisher.publish(event) {
            tracing::warn!(error = %e, topic, "Failed to broadcast feed event");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
