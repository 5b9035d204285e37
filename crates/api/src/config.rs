use std::path::PathBuf;
use std::time::Duration;

use thermowatch_core::alert::{AlertRule, DEFAULT_ALERT_COOLDOWN, DEFAULT_HIGH_THRESHOLD};
use thermowatch_core::error::CoreError;
use thermowatch_core::prediction::DEFAULT_HISTORY_LIMIT;
use thermowatch_core::risk::{RiskThresholds, DEFAULT_MEDIUM_THRESHOLD};
use thermowatch_core::scripting::HistoryTransport;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks on shutdown (default: `5`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `5000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
        }
    }
}

/// Alerting, scoring and prediction settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Breach threshold in °C; also the High risk tier boundary.
    pub high_threshold: f64,
    /// Medium risk tier boundary in °C.
    pub medium_threshold: f64,
    /// Minimum interval between two alerts.
    pub alert_cooldown: Duration,
    /// Interpreter used to run the predictor script.
    pub python_executable: String,
    pub predictor_script: PathBuf,
    /// Must stay below the HTTP request timeout so a slow script surfaces
    /// as 503 rather than 408.
    pub predictor_timeout: Duration,
    /// Whether the history goes to the script as `argv[1]` or on stdin.
    pub predictor_input: HistoryTransport,
    /// Readings handed to the predictor.
    pub ml_history_limit: i64,
}

impl MonitorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                              |
    /// |--------------------------|--------------------------------------|
    /// | `HIGH_TEMP_THRESHOLD`    | `60`                                 |
    /// | `MEDIUM_TEMP_THRESHOLD`  | `50`                                 |
    /// | `ALERT_COOLDOWN_SECS`    | `60`                                 |
    /// | `PYTHON_EXECUTABLE`      | `python3`                            |
    /// | `PREDICTOR_SCRIPT`       | `ml_scripts/predict_failure.py`      |
    /// | `PREDICTOR_TIMEOUT_SECS` | `10`                                 |
    /// | `PREDICTOR_INPUT`        | `argv` (or `stdin`)                  |
    /// | `ML_HISTORY_LIMIT`       | `100`                                |
    pub fn from_env() -> Self {
        let high_threshold: f64 = std::env::var("HIGH_TEMP_THRESHOLD")
            .map(|v| v.parse().expect("HIGH_TEMP_THRESHOLD must be a number"))
            .unwrap_or(DEFAULT_HIGH_THRESHOLD);

        let medium_threshold: f64 = std::env::var("MEDIUM_TEMP_THRESHOLD")
            .map(|v| v.parse().expect("MEDIUM_TEMP_THRESHOLD must be a number"))
            .unwrap_or(DEFAULT_MEDIUM_THRESHOLD);

        let alert_cooldown = std::env::var("ALERT_COOLDOWN_SECS")
            .map(|v| {
                Duration::from_secs(v.parse().expect("ALERT_COOLDOWN_SECS must be a valid u64"))
            })
            .unwrap_or(DEFAULT_ALERT_COOLDOWN);

        let python_executable =
            std::env::var("PYTHON_EXECUTABLE").unwrap_or_else(|_| "python3".into());

        let predictor_script = std::env::var("PREDICTOR_SCRIPT")
            .unwrap_or_else(|_| "ml_scripts/predict_failure.py".into())
            .into();

        let predictor_timeout = Duration::from_secs(
            std::env::var("PREDICTOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .expect("PREDICTOR_TIMEOUT_SECS must be a valid u64"),
        );

        let predictor_input: HistoryTransport = std::env::var("PREDICTOR_INPUT")
            .map(|v| v.parse().expect("PREDICTOR_INPUT must be 'argv' or 'stdin'"))
            .unwrap_or_default();

        let ml_history_limit: i64 = std::env::var("ML_HISTORY_LIMIT")
            .map(|v| v.parse().expect("ML_HISTORY_LIMIT must be a valid i64"))
            .unwrap_or(DEFAULT_HISTORY_LIMIT);

        Self {
            high_threshold,
            medium_threshold,
            alert_cooldown,
            python_executable,
            predictor_script,
            predictor_timeout,
            predictor_input,
            ml_history_limit,
        }
    }

    pub fn alert_rule(&self) -> Result<AlertRule, CoreError> {
        AlertRule::new(self.high_threshold, self.alert_cooldown)
    }

    pub fn risk_thresholds(&self) -> Result<RiskThresholds, CoreError> {
        RiskThresholds::new(self.medium_threshold, self.high_threshold)
    }

    /// Rejects a predictor timeout that the request timeout would cut short.
    pub fn check_timeouts(&self, server: &ServerConfig) -> Result<(), CoreError> {
        let request_timeout = Duration::from_secs(server.request_timeout_secs);
        if self.predictor_timeout >= request_timeout {
            return Err(CoreError::Validation(format!(
                "PREDICTOR_TIMEOUT_SECS ({}s) must be shorter than REQUEST_TIMEOUT_SECS ({}s)",
                self.predictor_timeout.as_secs(),
                server.request_timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            medium_threshold: DEFAULT_MEDIUM_THRESHOLD,
            alert_cooldown: DEFAULT_ALERT_COOLDOWN,
            python_executable: "python3".into(),
            predictor_script: "ml_scripts/predict_failure.py".into(),
            predictor_timeout: Duration::from_secs(10),
            predictor_input: HistoryTransport::Argument,
            ml_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
