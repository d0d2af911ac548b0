//! Low-level process execution for SDK commands

use anyhow::{Context, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::env;
use std::io::{self, Read};
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use super::config::{RunnerConfig, CONTENT_PATH_ENV, SDK_BIN_ENV};
use super::content_root::{locate_content_root, resolve_content_root};
use super::outcome::{ExecutionOutcome, SENTINEL_EXIT_CODE};
use super::spec::CommandSpec;
use super::CommandRunner;
use crate::security::{validate_sdk_binary, DEFAULT_SDK_BINARY};

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured size per stream (10MB)
const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Runs `demisto-sdk` as a child process.
#[derive(Debug, Clone, Default)]
pub struct SdkRunner {
    config: RunnerConfig,
}

impl SdkRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// The binary requested by configuration or `DEMISTO_SDK_BIN`, before validation.
    pub fn requested_binary(&self) -> String {
        if let Some(bin) = self.config.sdk_bin.as_deref().filter(|b| !b.is_empty()) {
            return bin.to_string();
        }
        env::var(SDK_BIN_ENV)
            .ok()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_SDK_BINARY.to_string())
    }

    /// Resolve the content root for one invocation, creating it if needed.
    pub fn content_root(&self, hint: Option<&Path>) -> io::Result<PathBuf> {
        let cwd = env::current_dir()?;
        resolve_content_root(hint, self.env_override().as_deref(), &cwd)
    }

    fn env_override(&self) -> Option<PathBuf> {
        match &self.config.content_path {
            Some(path) => Some(path.clone()),
            None => env::var_os(CONTENT_PATH_ENV).map(PathBuf::from),
        }
    }

    fn spawn(&self, binary: &Path, spec: &CommandSpec, root: &Path) -> Result<Child> {
        let mut cmd = Command::new(binary);
        cmd.args(spec.args())
            .current_dir(root)
            .env(CONTENT_PATH_ENV, root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        cmd.spawn()
            .with_context(|| format!("Failed to spawn {}", binary.display()))
    }

    fn execute(&self, binary: &Path, spec: &CommandSpec, root: &Path) -> Result<ExecutionOutcome> {
        let timeout = self.config.command_timeout;
        let start = Instant::now();
        let mut child = self.spawn(binary, spec, root)?;

        // Drain both pipes while waiting, otherwise a chatty child blocks on a
        // full pipe buffer and never exits.
        let stdout_rx = collect_stream(child.stdout.take());
        let stderr_rx = collect_stream(child.stderr.take());

        let wait_result = match child.wait_timeout(timeout) {
            Ok(status) => status,
            Err(e) => {
                kill_process_group(&mut child);
                return Err(e).context("Failed to wait for demisto-sdk");
            }
        };

        let Some(status) = wait_result else {
            kill_process_group(&mut child);
            warn!(
                command = %spec.display(),
                timeout_secs = timeout.as_secs(),
                "demisto-sdk timed out"
            );
            return Ok(ExecutionOutcome::timed_out(timeout.as_secs()));
        };

        let stdout = stdout_rx
            .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
            .unwrap_or_else(|_| "[output collection timed out]".to_string());
        let mut stderr = stderr_rx
            .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
            .unwrap_or_else(|_| "[output collection timed out]".to_string());

        let exit_code = exit_code_of(status, &mut stderr);
        let elapsed_ms = start.elapsed().as_millis() as u64;
        if exit_code == 0 {
            debug!(command = %spec.display(), elapsed_ms, "demisto-sdk finished");
        } else {
            info!(command = %spec.display(), exit_code, elapsed_ms, "demisto-sdk failed");
        }

        Ok(ExecutionOutcome::completed(exit_code, stdout, stderr))
    }
}

impl CommandRunner for SdkRunner {
    fn locate_content_root(&self) -> io::Result<PathBuf> {
        let cwd = env::current_dir()?;
        Ok(locate_content_root(None, self.env_override().as_deref(), &cwd))
    }

    fn run(&self, spec: &CommandSpec) -> ExecutionOutcome {
        let root = match self.content_root(spec.working_dir()) {
            Ok(root) => root,
            Err(e) => {
                warn!(error = %e, "failed to prepare content root");
                return ExecutionOutcome::internal(format!("Failed to prepare content root: {e}"));
            }
        };

        let requested = self.requested_binary();
        let binary = match validate_sdk_binary(&requested) {
            Ok(path) => path,
            Err(rejection) => {
                warn!(binary = %requested, reason = %rejection, "untrusted SDK binary rejected");
                return ExecutionOutcome::rejected(format!(
                    "Invalid or untrusted SDK binary: {requested}. \
                     Only '{DEFAULT_SDK_BINARY}' is allowed. ({rejection})"
                ));
            }
        };

        debug!(
            binary = %binary.display(),
            root = %root.display(),
            command = %spec.display(),
            "running demisto-sdk"
        );

        match self.execute(&binary, spec, &root) {
            Ok(outcome) => outcome,
            Err(e) => {
                let kind = error_kind(&e);
                warn!(kind = %kind, error = %format!("{e:#}"), "demisto-sdk execution failed");
                ExecutionOutcome::internal(format!("{kind}: {e:#}"))
            }
        }
    }
}

/// Name of the underlying I/O error kind, or `Error` when there is none.
fn error_kind(error: &anyhow::Error) -> String {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<io::Error>())
        .map(|io_error| format!("{:?}", io_error.kind()))
        .unwrap_or_else(|| "Error".to_string())
}

/// Read a child pipe on its own thread.
fn collect_stream<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// Read a stream to string, keeping at most [`MAX_OUTPUT_SIZE`] bytes.
///
/// Past the limit the rest of the stream is drained and discarded so the
/// child never sees a broken pipe.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    while stream.read(&mut chunk).unwrap_or(0) > 0 {}
                    buf.extend_from_slice(b"\n[output truncated at 10MB]");
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Exit code of a finished child, or the sentinel if a signal ended it.
fn exit_code_of(status: ExitStatus, stderr: &mut String) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    if let Some(signal) = status.signal() {
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!("[terminated by signal {signal}]"));
    }
    SENTINEL_EXIT_CODE
}

/// Kill the child and everything it started, then reap it.
fn kill_process_group(child: &mut Child) {
    if let Ok(pid) = i32::try_from(child.id()) {
        // The child leads its own group, so its pid is the group id.
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}
