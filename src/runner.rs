//! Process runner.
//!
//! Spawns one child per request and folds every outcome, including spawn
//! failures, into an [`ExecutionResult`].

use crate::accumulator::OutputAccumulator;
use crate::limits::OutputLimits;
use crate::output::{exit_code, ExecutionResult, SPAWN_FAILURE_CODE};
use crate::request::ExecutionRequest;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};

const READ_CHUNK: usize = 8192;

/// Executes [`ExecutionRequest`]s under fixed [`OutputLimits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    limits: OutputLimits,
}

impl ProcessRunner {
    /// Create a runner with the given limits.
    pub fn new(limits: OutputLimits) -> Self {
        Self { limits }
    }

    /// Get the output limits.
    pub fn limits(&self) -> OutputLimits {
        self.limits
    }

    /// Execute a request and wait for the process to finish.
    ///
    /// Never fails: a process that cannot be started yields code `-1` with
    /// the spawn error in `err`. There is no timeout; the child runs to
    /// completion.
    pub async fn run(&self, request: ExecutionRequest) -> ExecutionResult {
        let argv = request.argv();
        let payload = request.stdin_payload().map(str::to_owned);

        let mut cmd = Command::new(&request.command);
        cmd.args(&argv)
            .current_dir(&request.working_dir)
            .stdin(if payload.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(
            command = %request.command,
            args = ?argv,
            cwd = %request.working_dir,
            stdin = payload.is_some(),
            "spawning process"
        );

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(command = %request.command, error = %e, "failed to spawn process");
                return ExecutionResult::spawn_failure(String::new(), &e);
            }
        };

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (_, stdout_text, stderr_bytes) = tokio::join!(
            write_stdin(stdin, payload),
            read_stdout(stdout, self.limits),
            read_stderr(stderr),
        );

        match child.wait().await {
            Ok(status) => {
                let code = exit_code(status);
                tracing::info!(
                    command = %request.command,
                    code,
                    out_chars = stdout_text.chars().count(),
                    err_bytes = stderr_bytes.len(),
                    "process exited"
                );
                ExecutionResult {
                    exit_code: code,
                    stdout: stdout_text,
                    stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
                }
            }
            Err(e) => {
                tracing::warn!(command = %request.command, error = %e, "failed to wait for process");
                ExecutionResult {
                    exit_code: SPAWN_FAILURE_CODE,
                    stdout: stdout_text,
                    stderr: e.to_string(),
                }
            }
        }
    }
}

/// Write the payload once and close the pipe.
async fn write_stdin(stdin: Option<ChildStdin>, payload: Option<String>) {
    let (Some(mut pipe), Some(payload)) = (stdin, payload) else {
        return;
    };

    // A child may exit or close stdin without reading everything
    if let Err(e) = pipe.write_all(payload.as_bytes()).await {
        tracing::debug!(error = %e, "stdin write interrupted");
    }
    if let Err(e) = pipe.shutdown().await {
        tracing::debug!(error = %e, "stdin close failed");
    }
}

/// Drain stdout through the accumulator until EOF.
async fn read_stdout<R>(stdout: Option<R>, limits: OutputLimits) -> String
where
    R: AsyncRead + Unpin,
{
    let mut acc = OutputAccumulator::new(limits);
    let Some(mut stdout) = stdout else {
        return acc.finish();
    };

    let mut buf = [0u8; READ_CHUNK];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break, // EOF
            // Past the cap the accumulator ignores chunks; keep draining
            Ok(n) => acc.push(&buf[..n]),
            Err(e) => {
                tracing::warn!(error = %e, "stdout read error");
                break;
            }
        }
    }

    acc.finish()
}

/// Read stderr to EOF, unbounded.
async fn read_stderr<R>(stderr: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut stderr) = stderr {
        if let Err(e) = stderr.read_to_end(&mut buf).await {
            tracing::warn!(error = %e, "stderr read error");
        }
    }
    buf
}
