//! Execution result returned to callers.

use serde::{Deserialize, Serialize};

/// Exit code reported when the process could not be started.
pub const SPAWN_FAILURE_CODE: i32 = -1;

/// Offset added to the signal number for signal-terminated processes.
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Outcome of one tool execution.
///
/// Serialized as `{"code": <int>, "out": <string>, "err": <string>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code, [`SPAWN_FAILURE_CODE`] if the process never ran.
    #[serde(rename = "code")]
    pub exit_code: i32,

    /// Captured stdout, bounded by the output limits.
    #[serde(rename = "out")]
    pub stdout: String,

    /// Full stderr, or the spawn error message.
    #[serde(rename = "err")]
    pub stderr: String,
}

impl ExecutionResult {
    /// Result for a process that could not be started.
    pub fn spawn_failure(stdout: String, error: &std::io::Error) -> Self {
        Self {
            exit_code: SPAWN_FAILURE_CODE,
            stdout,
            stderr: error.to_string(),
        }
    }

    /// Check if the process exited successfully (code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if the process never started.
    pub fn is_spawn_failure(&self) -> bool {
        self.exit_code == SPAWN_FAILURE_CODE
    }
}

/// Map an exit status to a single integer.
///
/// Signal termination has no exit code on Unix; it is reported as
/// `128 + signal` like a shell would.
pub(crate) fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return SIGNAL_EXIT_BASE + signal;
        }
    }

    SPAWN_FAILURE_CODE
}
