//! `demisto-mcp call` - one-shot tool invocation.

use anyhow::{bail, Context, Result};
use serde_json::Value;

use super::build_dispatcher;
use crate::config::ServerConfig;

/// Dispatch `tool` once and print the payload exactly as a client would see it.
pub fn execute(config: &ServerConfig, tool: &str, args: Option<&str>) -> Result<()> {
    let arguments = parse_arguments(args)?;
    let dispatcher = build_dispatcher(config);
    println!("{}", dispatcher.call(tool, arguments));
    Ok(())
}

fn parse_arguments(args: Option<&str>) -> Result<Value> {
    let Some(text) = args else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value = serde_json::from_str(text).context("--args must be valid JSON")?;
    if !value.is_object() {
        bail!("--args must be a JSON object");
    }
    Ok(value)
}
