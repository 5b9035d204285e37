#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not enough data (at least {required} required, found {found})")]
    InsufficientHistory { found: usize, required: usize },

    #[error("Failure predictor unavailable: {0}")]
    PredictorUnavailable(String),

    #[error("Broadcast failed: {0}")]
    Broadcast(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
