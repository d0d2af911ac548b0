//! Validated calls run the SDK with an exact argv, inside the content root

use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

use demisto_mcp::config::PathPolicy;
use demisto_mcp::runner::{RunnerConfig, SdkRunner};
use demisto_mcp::tools::Dispatcher;

use super::helpers::*;

#[test]
#[serial]
fn test_argv_working_dir_and_environment() {
    let temp = TempDir::new().unwrap();
    let body = format!("{ECHO_ARGS}\npwd -P\nprintf '%s\\n' \"$DEMISTO_SDK_CONTENT_PATH\"");
    let (dispatcher, root) = sdk_dispatcher(&temp, &body, Duration::from_secs(30));

    let result = payload(&dispatcher.call(
        "validate_content",
        json!({"input_path": "Packs/MyPack", "use_git": true}),
    ));

    assert_eq!(result["success"], true, "{result}");
    assert_eq!(result["returncode"], 0);
    let root_text = root.display().to_string();
    let input = root.join("Packs/MyPack").display().to_string();
    let lines: Vec<&str> = result["stdout"].as_str().unwrap().lines().collect();
    assert_eq!(
        lines,
        vec!["validate", "-i", input.as_str(), "-g", root_text.as_str(), root_text.as_str()]
    );
}

#[test]
#[serial]
fn test_payload_is_not_shell_interpreted() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, _root) = sdk_dispatcher(&temp, ECHO_ARGS, Duration::from_secs(30));

    let result = payload(&dispatcher.call(
        "run_command",
        json!({"command": "!ip ip=1.1.1.1; echo pwned $(id)", "args": "{\"verbose\": true}"}),
    ));

    assert_eq!(result["success"], true, "{result}");
    let lines: Vec<&str> = result["stdout"].as_str().unwrap().lines().collect();
    assert_eq!(
        lines,
        vec!["run", "-q", "!ip ip=1.1.1.1; echo pwned $(id)", "--args", "{\"verbose\": true}"]
    );
}

#[test]
#[serial]
fn test_nonzero_exit_is_reported() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, _root) = sdk_dispatcher(
        &temp,
        "echo partial\necho boom >&2\nexit 3",
        Duration::from_secs(30),
    );

    let result = payload(&dispatcher.call("lint_content", json!({"input_path": "Packs/A"})));
    assert_eq!(result["success"], false);
    assert_eq!(result["returncode"], 3);
    assert_eq!(result["stdout"], "partial\n");
    assert_eq!(result["stderr"], "boom\n");
}

#[test]
#[serial]
fn test_timeout_kills_the_command() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, _root) = sdk_dispatcher(&temp, "sleep 30", Duration::from_secs(1));

    let started = Instant::now();
    let result = payload(&dispatcher.call(
        "zip_packs",
        json!({"input_path": "Packs/A", "output_path": "out"}),
    ));

    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(result["success"], false);
    assert_eq!(result["returncode"], -1);
    assert_eq!(result["stdout"], "");
    assert_eq!(result["stderr"], "Command timed out after 1 seconds");
}

#[test]
#[serial]
fn test_untrusted_binary_is_refused() {
    let temp = TempDir::new().unwrap();
    let root = content_root(&temp);
    let config = RunnerConfig {
        sdk_bin: Some("/bin/sh".to_string()),
        content_path: Some(root),
        command_timeout: Duration::from_secs(30),
    };
    let dispatcher = Dispatcher::new(Arc::new(SdkRunner::new(config)), PathPolicy::ContentRoot);

    let result = payload(&dispatcher.call("init_pack", json!({"name": "MyPack"})));
    assert_eq!(result["success"], false);
    assert_eq!(result["returncode"], -1);
    assert!(result["stderr"]
        .as_str()
        .unwrap()
        .starts_with("Invalid or untrusted SDK binary: /bin/sh. Only 'demisto-sdk' is allowed."));
}

#[test]
#[serial]
fn test_output_paths_may_not_exist_yet() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, root) = sdk_dispatcher(&temp, ECHO_ARGS, Duration::from_secs(30));

    let result = payload(&dispatcher.call(
        "init_pack",
        json!({"name": "NewPack", "output_dir": "Packs/New/Nested"}),
    ));
    assert_eq!(result["success"], true, "{result}");
    let output = root.join("Packs/New/Nested").display().to_string();
    let lines: Vec<&str> = result["stdout"].as_str().unwrap().lines().collect();
    assert_eq!(lines, vec!["init", "--pack", "-n", "NewPack", "-o", output.as_str()]);
}
