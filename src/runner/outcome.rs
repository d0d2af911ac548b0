//! Result type for SDK command execution

use serde::{Deserialize, Serialize};

/// Exit code reported for rejections, timeouts and internal failures.
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Outcome of one tool invocation.
///
/// Validation rejections share this shape so callers only branch on
/// `success`. The exit code is serialized as `returncode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "returncode")]
    pub exit_code: i32,
}

impl ExecutionOutcome {
    /// A process that ran to completion.
    pub fn completed(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            success: exit_code == 0,
            stdout,
            stderr,
            exit_code,
        }
    }

    /// Input or policy rejection; nothing was spawned.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::failure(reason.into())
    }

    pub fn timed_out(seconds: u64) -> Self {
        Self::failure(format!("Command timed out after {seconds} seconds"))
    }

    /// Spawn failure, I/O error or any other unexpected condition.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::failure(message.into())
    }

    fn failure(stderr: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code: SENTINEL_EXIT_CODE,
        }
    }

    /// Pretty JSON text returned to the protocol layer.
    pub fn to_payload(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\": false, \"stdout\": \"\", \
                 \"stderr\": \"failed to serialize outcome: {e}\", \"returncode\": -1}}"
            )
        })
    }
}
