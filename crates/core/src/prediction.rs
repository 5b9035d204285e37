//! ML failure prediction over recent reading history.
//!
//! The model itself is opaque: any [`FailurePredictor`] that turns an
//! ordered history into a probability will do. See
//! [`crate::scripting::ScriptPredictor`] for the subprocess implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ingest::ReadingStore;
use crate::reading::Reading;

/// Fewest readings the feature pipeline can work with.
pub const MIN_HISTORY_POINTS: usize = 15;

/// How many recent readings are handed to the predictor by default.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Probability of failure in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailurePrediction {
    pub probability: f64,
}

impl FailurePrediction {
    pub fn new(probability: f64) -> Result<Self, CoreError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(CoreError::PredictorUnavailable(format!(
                "Predictor returned an out-of-range probability: {probability}"
            )));
        }
        Ok(Self { probability })
    }
}

#[async_trait]
pub trait FailurePredictor: Send + Sync {
    /// Predict from `history`, ordered oldest first.
    async fn predict(&self, history: &[Reading]) -> Result<FailurePrediction, CoreError>;
}

/// Load up to `history_limit` recent readings and run the predictor.
///
/// Fails with [`CoreError::InsufficientHistory`] before calling the
/// predictor when fewer than [`MIN_HISTORY_POINTS`] readings exist.
pub async fn predict_failure<S, P>(
    store: &S,
    predictor: &P,
    history_limit: i64,
) -> Result<FailurePrediction, CoreError>
where
    S: ReadingStore + ?Sized,
    P: FailurePredictor + ?Sized,
{
    let mut history: Vec<Reading> = store
        .recent_readings(history_limit)
        .await?
        .iter()
        .map(|r| r.reading())
        .collect();
    history.reverse();

    tracing::debug!(count = history.len(), "Loaded history for failure prediction");

    if history.len() < MIN_HISTORY_POINTS {
        tracing::warn!(
            found = history.len(),
            required = MIN_HISTORY_POINTS,
            "Not enough historical data for ML prediction"
        );
        return Err(CoreError::InsufficientHistory {
            found: history.len(),
            required: MIN_HISTORY_POINTS,
        });
    }

    predictor.predict(&history).await
}
