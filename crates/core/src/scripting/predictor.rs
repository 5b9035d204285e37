//! Failure predictor backed by an external script.
//!
//! Wire contract:
//!
//! - input: JSON array, oldest first,
//!   `[{"timestamp": "<rfc3339>", "temperature": 61.2}, ...]`, passed as the
//!   script's first argument (default) or on stdin, see [`HistoryTransport`].
//! - stdout: one JSON object, either `{"ml_prediction_probability": 0.17}`
//!   (`probability` is accepted as an alias) or `{"error": "..."}`.
//! - any non-zero exit code is a failure; stderr is logged, not parsed.
//!
//! The script runs with its own directory as the working directory.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use super::subprocess::run_command;
use crate::error::CoreError;
use crate::prediction::{FailurePrediction, FailurePredictor};
use crate::reading::Reading;
use crate::types::Timestamp;

#[derive(Serialize)]
struct HistoryPoint {
    timestamp: Timestamp,
    temperature: f64,
}

#[derive(Deserialize)]
struct PredictorReply {
    #[serde(alias = "probability")]
    ml_prediction_probability: Option<f64>,
    error: Option<String>,
}

/// How the JSON history reaches the script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryTransport {
    /// `<interpreter> <script> '<json>'`, read from `sys.argv[1]`.
    #[default]
    Argument,
    /// `<interpreter> <script>` with the JSON written to stdin.
    Stdin,
}

impl FromStr for HistoryTransport {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argv" | "arg" | "argument" => Ok(Self::Argument),
            "stdin" => Ok(Self::Stdin),
            other => Err(CoreError::Validation(format!(
                "Unknown predictor input '{other}', expected 'argv' or 'stdin'"
            ))),
        }
    }
}

/// Runs `<interpreter> <script>` once per prediction.
#[derive(Debug, Clone)]
pub struct ScriptPredictor {
    interpreter: String,
    script: PathBuf,
    timeout: Duration,
    transport: HistoryTransport,
}

impl ScriptPredictor {
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout,
            transport: HistoryTransport::default(),
        }
    }

    pub fn with_transport(mut self, transport: HistoryTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Script path resolved against the server's working directory, so it
    /// still points at the script after the child switches directories.
    fn script_path(&self) -> PathBuf {
        if self.script.is_absolute() {
            return self.script.clone();
        }
        std::env::current_dir()
            .map(|cwd| cwd.join(&self.script))
            .unwrap_or_else(|_| self.script.clone())
    }
}

#[async_trait]
impl FailurePredictor for ScriptPredictor {
    async fn predict(&self, history: &[Reading]) -> Result<FailurePrediction, CoreError> {
        let points: Vec<HistoryPoint> = history
            .iter()
            .map(|r| HistoryPoint {
                timestamp: r.observed_at,
                temperature: r.value,
            })
            .collect();
        let payload = serde_json::to_string(&points)
            .map_err(|e| CoreError::Internal(format!("Failed to encode history: {e}")))?;

        let script = self.script_path();
        let mut cmd = Command::new(&self.interpreter);
        cmd.arg(&script);
        // The script loads its model relative to its own directory.
        if let Some(dir) = script.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        let stdin = match self.transport {
            HistoryTransport::Argument => {
                cmd.arg(&payload);
                Vec::new()
            }
            HistoryTransport::Stdin => payload.into_bytes(),
        };

        tracing::debug!(
            interpreter = %self.interpreter,
            script = %script.display(),
            transport = ?self.transport,
            points = points.len(),
            "Spawning failure predictor"
        );

        let output = run_command(&mut cmd, &stdin, self.timeout)
            .await
            .map_err(|e| CoreError::PredictorUnavailable(e.to_string()))?;

        if !output.success() {
            tracing::error!(
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "Failure predictor exited with an error"
            );
            return Err(CoreError::PredictorUnavailable(format!(
                "Predictor exited with code {}",
                output.exit_code
            )));
        }

        tracing::debug!(duration_ms = output.duration_ms, "Failure predictor finished");
        parse_reply(&output.stdout)
    }
}

/// Interpret the predictor's stdout.
pub fn parse_reply(stdout: &str) -> Result<FailurePrediction, CoreError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(CoreError::PredictorUnavailable(
            "Predictor produced no output".to_string(),
        ));
    }

    let reply: PredictorReply = serde_json::from_str(trimmed).map_err(|e| {
        tracing::error!(error = %e, output = trimmed, "Unparsable predictor output");
        CoreError::PredictorUnavailable("Failed to parse predictor output".to_string())
    })?;

    match (reply.ml_prediction_probability, reply.error) {
        (_, Some(error)) => Err(CoreError::PredictorUnavailable(error)),
        (Some(p), None) => FailurePrediction::new(p),
        (None, None) => Err(CoreError::PredictorUnavailable(
            "Predictor output has no probability".to_string(),
        )),
    }
}
