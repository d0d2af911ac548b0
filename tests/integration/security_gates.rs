//! Rejections happen before any process is spawned

use serde_json::json;
use tempfile::TempDir;

use super::helpers::*;

#[test]
fn test_insecure_upload_requires_acknowledgment() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, _root) = spy_dispatcher(&temp);

    let result = payload(&dispatcher.call(
        "upload_content",
        json!({"input_path": "Packs/MyPack", "insecure": true}),
    ));

    assert_eq!(result["success"], false);
    assert_eq!(result["returncode"], -1);
    let stderr = result["stderr"].as_str().unwrap();
    assert!(stderr.starts_with("SECURITY WARNING"));
    assert!(stderr.contains("acknowledge_insecure_risk"));
    assert_eq!(spy.count(), 0);
}

#[test]
fn test_acknowledged_upload_passes_insecure() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, root) = spy_dispatcher(&temp);

    let result = payload(&dispatcher.call(
        "upload_content",
        json!({"input_path": "Packs/MyPack", "insecure": true, "acknowledge_insecure_risk": true}),
    ));

    assert_eq!(result["success"], true);
    assert_eq!(spy.count(), 1);
    assert_eq!(
        spy.last_args(),
        vec![
            "upload".to_string(),
            "-i".to_string(),
            root.join("Packs/MyPack").display().to_string(),
            "--insecure".to_string(),
        ]
    );
}

#[test]
fn test_list_files_gate_checked_first() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, _root) = spy_dispatcher(&temp);

    let result = payload(&dispatcher.call(
        "list_files",
        json!({"insecure": true, "output_path": "../../etc"}),
    ));
    assert!(result["stderr"].as_str().unwrap().starts_with("SECURITY WARNING"));
    assert_eq!(spy.count(), 0);
}

#[test]
fn test_injection_in_names_never_spawns() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, _root) = spy_dispatcher(&temp);

    for (tool, args) in [
        ("init_pack", json!({"name": "pack;rm -rf /"})),
        ("init_pack", json!({"name": "$(whoami)"})),
        ("init_integration", json!({"name": "Good", "pack": "Pack`id`"})),
        ("init_script", json!({"name": "a b", "pack": "P"})),
        ("openapi_codegen", json!({"input_path": "Packs/spec.json", "name": "x|y"})),
    ] {
        let result = payload(&dispatcher.call(tool, args));
        assert_eq!(result["success"], false, "{tool} should be rejected");
        assert_eq!(result["returncode"], -1);
        assert!(
            result["stderr"].as_str().unwrap().starts_with("Invalid"),
            "{tool}: {}",
            result["stderr"]
        );
    }
    assert_eq!(spy.count(), 0);
}

#[test]
fn test_path_escapes_never_spawn() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, _root) = spy_dispatcher(&temp);

    for args in [
        json!({"input_path": "../../../etc/passwd"}),
        json!({"input_path": "/etc"}),
        json!({"input_path": "Packs/A; rm -rf /"}),
        json!({"input_path": "-rf"}),
        json!({"input_path": ""}),
    ] {
        let result = payload(&dispatcher.call("validate_content", args.clone()));
        assert_eq!(result["success"], false, "{args} should be rejected");
        assert!(result["stderr"].as_str().unwrap().starts_with("Invalid input path."));
    }
    assert_eq!(spy.count(), 0);
}

#[test]
fn test_symlink_escape_rejected() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, root) = spy_dispatcher(&temp);
    let outside = temp.path().join("outside");
    std::fs::create_dir_all(&outside).unwrap();
    std::os::unix::fs::symlink(&outside, root.join("Packs/Link")).unwrap();

    let result = payload(&dispatcher.call(
        "format_content",
        json!({"input_path": "Packs/Link/file.yml"}),
    ));
    assert_eq!(result["success"], false);
    assert_eq!(spy.count(), 0);
}

#[test]
fn test_version_and_payload_checks() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, _root) = spy_dispatcher(&temp);

    let result = payload(&dispatcher.call(
        "update_release_notes",
        json!({"input_path": "Packs/A", "version": "patch"}),
    ));
    assert_eq!(result["stderr"], "Invalid version. Must be: major, minor, or revision.");

    let result = payload(&dispatcher.call(
        "run_command",
        json!({"command": "!ip ip=1.1.1.1", "args": "{broken"}),
    ));
    assert_eq!(result["stderr"], "Invalid args. Must be a JSON string.");

    let result = payload(&dispatcher.call("run_playbook", json!({})));
    assert_eq!(result["stderr"], "Playbook ID is required.");
    assert_eq!(spy.count(), 0);

    let result = payload(&dispatcher.call(
        "run_command",
        json!({"command": "!ip ip=1.1.1.1; echo"}),
    ));
    assert_eq!(result["success"], true);
    assert_eq!(spy.last_args(), vec!["run", "-q", "!ip ip=1.1.1.1; echo"]);
}
