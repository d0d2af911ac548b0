//! Configuration types for SDK command execution

use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for command execution (5 minutes)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Overrides the SDK binary name or path.
pub const SDK_BIN_ENV: &str = "DEMISTO_SDK_BIN";

/// Overrides the content root; also exported to the child process.
pub const CONTENT_PATH_ENV: &str = "DEMISTO_SDK_CONTENT_PATH";

/// Configuration for [`SdkRunner`](super::SdkRunner).
///
/// `None` fields fall back to the environment, read on every invocation.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// SDK binary name or path, checked by the binary validator before use
    pub sdk_bin: Option<String>,
    /// Content root override (same role as `DEMISTO_SDK_CONTENT_PATH`)
    pub content_path: Option<PathBuf>,
    /// Maximum time to wait for a single command to complete
    pub command_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sdk_bin: None,
            content_path: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl RunnerConfig {
    /// Create a new configuration with a custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            command_timeout: timeout,
            ..Self::default()
        }
    }
}
