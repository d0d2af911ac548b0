//! Shared helpers: fake SDK scripts, sandboxed content roots and a spy runner

use serde_json::Value;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use demisto_mcp::config::PathPolicy;
use demisto_mcp::runner::{CommandRunner, CommandSpec, ExecutionOutcome, RunnerConfig, SdkRunner};
use demisto_mcp::tools::Dispatcher;

/// Fake SDK that prints each argument on its own line.
pub const ECHO_ARGS: &str = r#"printf '%s\n' "$@""#;

/// Write an executable `demisto-sdk` shell script into `dir`.
pub fn fake_sdk(dir: &Path, body: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create bin dir");
    let path = dir.join("demisto-sdk");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write fake sdk");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod fake sdk");
    path
}

/// Content root with a `Packs/` marker, canonicalized.
pub fn content_root(temp: &TempDir) -> PathBuf {
    let root = temp.path().join("content");
    fs::create_dir_all(root.join("Packs")).expect("Failed to create content root");
    root.canonicalize().expect("Failed to canonicalize content root")
}

/// Dispatcher backed by a real `SdkRunner` running the fake SDK.
pub fn sdk_dispatcher(temp: &TempDir, body: &str, timeout: Duration) -> (Dispatcher, PathBuf) {
    let sdk = fake_sdk(&temp.path().join("bin"), body);
    let root = content_root(temp);
    let config = RunnerConfig {
        sdk_bin: Some(sdk.to_string_lossy().into_owned()),
        content_path: Some(root.clone()),
        command_timeout: timeout,
    };
    let dispatcher = Dispatcher::new(Arc::new(SdkRunner::new(config)), PathPolicy::ContentRoot);
    (dispatcher, root)
}

/// Runner that counts invocations and records specs without spawning anything.
pub struct SpyRunner {
    root: PathBuf,
    pub invocations: AtomicUsize,
    pub specs: Mutex<Vec<CommandSpec>>,
}

impl SpyRunner {
    pub fn new(root: &Path) -> Arc<Self> {
        Arc::new(Self {
            root: root.to_path_buf(),
            invocations: AtomicUsize::new(0),
            specs: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn last_args(&self) -> Vec<String> {
        self.specs
            .lock()
            .unwrap()
            .last()
            .map(|spec| spec.args().to_vec())
            .unwrap_or_default()
    }
}

impl CommandRunner for SpyRunner {
    fn locate_content_root(&self) -> io::Result<PathBuf> {
        Ok(self.root.clone())
    }

    fn run(&self, spec: &CommandSpec) -> ExecutionOutcome {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.specs.lock().unwrap().push(spec.clone());
        ExecutionOutcome::completed(0, String::new(), String::new())
    }
}

/// Dispatcher over a spy runner confined to a fresh content root.
pub fn spy_dispatcher(temp: &TempDir) -> (Dispatcher, Arc<SpyRunner>, PathBuf) {
    let root = content_root(temp);
    let spy = SpyRunner::new(&root);
    let dispatcher = Dispatcher::new(spy.clone(), PathPolicy::ContentRoot);
    (dispatcher, spy, root)
}

/// Parse a tool payload.
pub fn payload(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| panic!("payload is not JSON ({e}): {text}"))
}
