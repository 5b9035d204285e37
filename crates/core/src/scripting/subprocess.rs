//! Spawn a child process with a JSON stdin payload and a hard deadline.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Cap on captured bytes per output stream (1 MiB).
const MAX_OUTPUT_BYTES: u64 = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Failed to run script: {0}")]
    Io(#[from] std::io::Error),

    #[error("Script timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
}

/// Captured result of a finished child process.
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl ScriptOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run `cmd` to completion, writing `input` to its stdin.
///
/// The child is killed if `timeout` elapses first (`kill_on_drop`).
pub async fn run_command(
    cmd: &mut Command,
    input: &[u8],
    timeout: Duration,
) -> Result<ScriptOutput, ScriptError> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let start = Instant::now();
    let mut child = cmd.spawn()?;

    let stdout_task = tokio::spawn(read_capped(child.stdout.take()));
    let stderr_task = tokio::spawn(read_capped(child.stderr.take()));

    let stdin = child.stdin.take();
    let run = async {
        if let Some(mut stdin) = stdin {
            // The script may exit without reading stdin; a broken pipe is not an error.
            let _ = stdin.write_all(input).await;
        }
        child.wait().await
    };

    let status = match tokio::time::timeout(timeout, run).await {
        Ok(status) => status?,
        Err(_) => {
            return Err(ScriptError::Timeout {
                elapsed_ms: start.elapsed().as_millis() as u64,
            });
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(ScriptOutput {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code: status.code().unwrap_or(-1),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

async fn read_capped<R: AsyncRead + Unpin>(stream: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(stream) = stream {
        let _ = stream.take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await;
    }
    buf
}
