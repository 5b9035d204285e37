//! Sensor readings and inbound value validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// One timestamped temperature measurement, in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub observed_at: Timestamp,
}

/// A reading after it has been durably written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    pub id: DbId,
    pub value: f64,
    pub observed_at: Timestamp,
}

impl StoredReading {
    /// Drop the storage identity and return the plain reading.
    pub fn reading(&self) -> Reading {
        Reading {
            value: self.value,
            observed_at: self.observed_at,
        }
    }
}

/// Validate a raw inbound reading value.
///
/// Accepts a JSON number, or a string that parses as a number (sensor
/// firmware sometimes sends `"63.5"`). Missing values, `null`, booleans,
/// objects and non-finite numbers are rejected.
pub fn parse_reading_value(raw: Option<&serde_json::Value>) -> Result<f64, CoreError> {
    let value = match raw {
        None | Some(serde_json::Value::Null) => {
            return Err(CoreError::Validation(
                "Invalid temperature data: value is required".to_string(),
            ));
        }
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(CoreError::Validation(
            "Invalid temperature data: value must be a finite number".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn accepts_json_number() {
        assert_eq!(parse_reading_value(Some(&json!(63.5))).unwrap(), 63.5);
        assert_eq!(parse_reading_value(Some(&json!(-4))).unwrap(), -4.0);
    }

    #[test]
    fn accepts_numeric_string() {
        assert_eq!(parse_reading_value(Some(&json!(" 41.25 "))).unwrap(), 41.25);
    }

    #[test]
    fn rejects_missing_and_null() {
        assert_matches!(parse_reading_value(None), Err(CoreError::Validation(_)));
        assert_matches!(
            parse_reading_value(Some(&serde_json::Value::Null)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_non_numeric() {
        for raw in [json!("hot"), json!(true), json!({"v": 1}), json!([1.0]), json!("NaN")] {
            assert_matches!(
                parse_reading_value(Some(&raw)),
                Err(CoreError::Validation(_)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_infinite_string() {
        assert_matches!(
            parse_reading_value(Some(&json!("inf"))),
            Err(CoreError::Validation(_))
        );
    }
}
