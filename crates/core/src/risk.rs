//! Rule-based risk scoring of the latest reading.
//!
//! A stateless piecewise-linear mapping from one temperature to a discrete
//! tier and a 0-100 score. Recomputed on every request, never stored.

use serde::Serialize;

use crate::error::CoreError;

/// Default lower bound of the Medium tier, in degrees Celsius.
pub const DEFAULT_MEDIUM_THRESHOLD: f64 = 50.0;

/// Degrees above the high threshold at which the High-tier score saturates
/// at 100. A tuning constant, not derived from configuration.
pub const HIGH_TIER_SPAN: f64 = 20.0;

/// Discrete classification of the latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    /// No reading is available.
    Unknown,
}

/// Tier plus a rounded score in `0..=100`; `score` is `None` only for
/// [`RiskTier::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub score: Option<u8>,
}

/// Tier boundaries. Invariant: `0 < medium < high`, both finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskThresholds {
    medium: f64,
    high: f64,
}

impl RiskThresholds {
    pub fn new(medium: f64, high: f64) -> Result<Self, CoreError> {
        if !medium.is_finite() || !high.is_finite() || medium <= 0.0 || medium >= high {
            return Err(CoreError::Validation(format!(
                "Risk thresholds must satisfy 0 < medium < high (medium={medium}, high={high})"
            )));
        }
        Ok(Self { medium, high })
    }

    pub fn medium(&self) -> f64 {
        self.medium
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Score the latest reading.
///
/// | Tier   | Condition              | Raw score                              |
/// |--------|------------------------|----------------------------------------|
/// | High   | `v >= high`            | `(v - high) / HIGH_TIER_SPAN * 100`    |
/// | Medium | `medium <= v < high`   | `(v - medium) / (high - medium) * 100` |
/// | Low    | `v < medium`           | `v / medium * 100`                     |
///
/// The raw score is clamped to `[0, 100]` and rounded.
pub fn score(latest: Option<f64>, thresholds: &RiskThresholds) -> RiskAssessment {
    let Some(v) = latest else {
        return RiskAssessment {
            tier: RiskTier::Unknown,
            score: None,
        };
    };

    let RiskThresholds { medium, high } = *thresholds;
    let (tier, raw) = if v >= high {
        (RiskTier::High, (v - high) / HIGH_TIER_SPAN * 100.0)
    } else if v >= medium {
        (RiskTier::Medium, (v - medium) / (high - medium) * 100.0)
    } else {
        (RiskTier::Low, v / medium * 100.0)
    };

    RiskAssessment {
        tier,
        score: Some(raw.clamp(0.0, 100.0).round() as u8),
    }
}
