//! High-temperature alert decision engine.
//!
//! Pure logic, no I/O. The caller owns the [`AlertState`] and passes it in
//! together with the current time, so the cooldown can be exercised without
//! touching the wall clock.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::reading::Reading;
use crate::types::{DbId, Timestamp};

/// Default high-temperature threshold in degrees Celsius.
pub const DEFAULT_HIGH_THRESHOLD: f64 = 60.0;

/// Default minimum interval between two consecutive alerts.
pub const DEFAULT_ALERT_COOLDOWN: Duration = Duration::from_secs(60);

/// Threshold and cooldown that drive [`decide`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertRule {
    high_threshold: f64,
    cooldown: TimeDelta,
}

impl AlertRule {
    /// Build a rule, rejecting non-positive or non-finite thresholds and a
    /// zero cooldown.
    pub fn new(high_threshold: f64, cooldown: Duration) -> Result<Self, CoreError> {
        if !high_threshold.is_finite() || high_threshold <= 0.0 {
            return Err(CoreError::Validation(format!(
                "High threshold must be a positive number, got {high_threshold}"
            )));
        }
        if cooldown.is_zero() {
            return Err(CoreError::Validation(
                "Alert cooldown must be greater than zero".to_string(),
            ));
        }
        let cooldown = TimeDelta::from_std(cooldown).map_err(|_| {
            CoreError::Validation(format!("Alert cooldown {cooldown:?} is out of range"))
        })?;
        Ok(Self {
            high_threshold,
            cooldown,
        })
    }

    pub fn high_threshold(&self) -> f64 {
        self.high_threshold
    }

    pub fn cooldown(&self) -> TimeDelta {
        self.cooldown
    }
}

impl Default for AlertRule {
    fn default() -> Self {
        Self {
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            cooldown: TimeDelta::seconds(DEFAULT_ALERT_COOLDOWN.as_secs() as i64),
        }
    }
}

/// Cooldown bookkeeping for the engine.
///
/// `None` means no alert has been sent since the process started. Not
/// persisted: after a restart the first breach alerts immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertState {
    last_alert_sent_at: Option<Timestamp>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_alert_sent_at(&self) -> Option<Timestamp> {
        self.last_alert_sent_at
    }
}

/// An alert emitted for a threshold breach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// The reading value that breached the threshold.
    pub value: f64,
    pub message: String,
    pub occurred_at: Timestamp,
}

/// An alert after it has been written to the alert history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAlert {
    pub id: DbId,
    pub value: f64,
    pub message: String,
    pub occurred_at: Timestamp,
}

/// Outcome of evaluating one reading.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The reading is at or below the threshold.
    Normal,
    /// The reading breached the threshold and the cooldown has elapsed.
    Alert(AlertEvent),
    /// The reading breached the threshold but an alert was sent too recently.
    Suppressed { last_alert_sent_at: Timestamp },
}

impl Decision {
    pub fn into_alert(self) -> Option<AlertEvent> {
        match self {
            Decision::Alert(alert) => Some(alert),
            _ => None,
        }
    }
}

/// Evaluate `reading` against `rule` at time `now`.
///
/// Returns the decision and the state to carry into the next call. The state
/// only changes when an alert is emitted. Re-arming requires strictly more
/// than the cooldown to have elapsed: a breach exactly one cooldown after the
/// previous alert is still suppressed.
pub fn decide(
    rule: &AlertRule,
    reading: &Reading,
    now: Timestamp,
    state: AlertState,
) -> (Decision, AlertState) {
    if reading.value <= rule.high_threshold {
        return (Decision::Normal, state);
    }

    if let Some(last) = state.last_alert_sent_at {
        if now.signed_duration_since(last) <= rule.cooldown {
            return (
                Decision::Suppressed {
                    last_alert_sent_at: last,
                },
                state,
            );
        }
    }

    let alert = AlertEvent {
        value: reading.value,
        message: alert_message(reading.value, rule.high_threshold),
        occurred_at: now,
    };
    let next = AlertState {
        last_alert_sent_at: Some(now),
    };
    (Decision::Alert(alert), next)
}

fn alert_message(value: f64, threshold: f64) -> String {
    format!("Temperature {value:.1}°C exceeded threshold {threshold}°C")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
