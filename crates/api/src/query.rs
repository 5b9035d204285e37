//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for list endpoints. Clamped with [`thermowatch_db::clamp_limit`].
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
