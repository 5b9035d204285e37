//! Out-of-process script execution.
//!
//! [`subprocess::run_command`] spawns a child, writes the given bytes to its
//! stdin and collects its output under a timeout. [`ScriptPredictor`] builds on it to
//! call the external failure-prediction script.

pub mod predictor;
pub mod subprocess;

pub use predictor::{HistoryTransport, ScriptPredictor};
pub use subprocess::{run_command, ScriptError, ScriptOutput};
