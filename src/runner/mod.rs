//! SDK Command Execution Module
//!
//! This module runs `demisto-sdk` with an argument vector that a tool handler
//! assembled from validated values.
//!
//! # Security Controls
//!
//! - **Trusted Binary**: The executable named by `DEMISTO_SDK_BIN` (default
//!   `demisto-sdk`) is checked against an allowlist before every spawn.
//!
//! - **No Shell**: Arguments are passed as an argument vector. Nothing is ever
//!   interpreted by a shell.
//!
//! - **Content Root**: Each invocation resolves a content root (a directory
//!   containing `Packs/`) that becomes the working directory and is exported
//!   to the child as `DEMISTO_SDK_CONTENT_PATH`.
//!
//! - **Command Timeout**: Every command has an upper bound (default 5 minutes).
//!
//! # Timeout Behavior
//!
//! When a command exceeds its timeout:
//! - The child's whole process group is killed (SIGKILL)
//! - Partial output is discarded
//! - The outcome reports `Command timed out after <N> seconds` with exit code -1
//!
//! Failures of any kind are reported as an [`ExecutionOutcome`], never as an
//! error returned to the caller.

mod config;
mod content_root;
mod executor;
mod outcome;
mod spec;

use std::io;
use std::path::PathBuf;

pub use config::{RunnerConfig, CONTENT_PATH_ENV, DEFAULT_COMMAND_TIMEOUT, SDK_BIN_ENV};
pub use content_root::{
    expand_tilde, locate_content_root, resolve_content_root, FALLBACK_CONTENT_DIR, MARKER_DIR,
};
pub use executor::SdkRunner;
pub use outcome::{ExecutionOutcome, SENTINEL_EXIT_CODE};
pub use spec::CommandSpec;

/// Executes validated command specs.
///
/// Tool handlers only ever talk to this trait, which lets tests observe what
/// would have been spawned.
pub trait CommandRunner: Send + Sync {
    /// Where the next invocation's content root will be. Creates nothing.
    fn locate_content_root(&self) -> io::Result<PathBuf>;

    /// Run the command and report how it went.
    fn run(&self, spec: &CommandSpec) -> ExecutionOutcome;
}
