//! Full request/response exchange over in-memory streams

use serde_json::{json, Value};
use serial_test::serial;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use demisto_mcp::server::McpServer;

use super::helpers::*;

/// Writer shared with the server so the test can read what it wrote.
#[derive(Clone, Default)]
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// One `tools/call` request line.
fn tool_call(id: i64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments},
    })
    .to_string()
}

fn exchange(server: &McpServer, lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let writer = SharedWriter::default();
    server.serve(Cursor::new(input), writer.clone()).unwrap();
    let output = writer.0.lock().unwrap().clone();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn response(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("no response for id {id}"))
}

fn tool_payload(response: &Value) -> Value {
    payload(response["result"]["content"][0]["text"].as_str().unwrap())
}

#[test]
#[serial]
fn test_session_over_stdio() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, root) = sdk_dispatcher(&temp, ECHO_ARGS, Duration::from_secs(30));
    let server = McpServer::new(Arc::new(dispatcher));

    let responses = exchange(
        &server,
        &[
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#.to_string(),
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#.to_string(),
            tool_call(3, "format_content", json!({"input_path": "Packs/A"})),
            tool_call(4, "init_pack", json!({"name": "bad;name"})),
            tool_call(5, "upload_content", json!({"input_path": "Packs/A", "insecure": true})),
        ],
    );
    assert_eq!(responses.len(), 5);

    let init = response(&responses, 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "demisto-mcp");
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");

    let tools = response(&responses, 2)["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"upload_content"));
    assert!(!names.contains(&"search_patterns"));

    let formatted = tool_payload(response(&responses, 3));
    assert_eq!(formatted["success"], true);
    let input = root.join("Packs/A").display().to_string();
    let lines: Vec<&str> = formatted["stdout"].as_str().unwrap().lines().collect();
    assert_eq!(lines, vec!["format", "-i", input.as_str(), "-y"]);

    let rejected = tool_payload(response(&responses, 4));
    assert_eq!(rejected["returncode"], -1);
    assert!(rejected["stderr"].as_str().unwrap().starts_with("Invalid pack name."));

    let gated = tool_payload(response(&responses, 5));
    assert!(gated["stderr"].as_str().unwrap().starts_with("SECURITY WARNING"));
}

#[test]
fn test_rejections_do_not_reach_runner_over_stdio() {
    let temp = TempDir::new().unwrap();
    let (dispatcher, spy, _root) = spy_dispatcher(&temp);
    let server = McpServer::new(Arc::new(dispatcher));

    let responses = exchange(
        &server,
        &[
            tool_call(1, "validate_content", json!({"input_path": "../outside"})),
            tool_call(2, "no_such_tool", json!({})),
            r#"{"jsonrpc":"2.0","id":3,"method":"shutdown"}"#.to_string(),
        ],
    );

    assert_eq!(tool_payload(response(&responses, 1))["success"], false);
    assert_eq!(
        response(&responses, 2)["result"]["content"][0]["text"],
        "Unknown tool: no_such_tool"
    );
    assert_eq!(response(&responses, 3)["error"]["code"], -32601);
    assert_eq!(spy.count(), 0);
}
