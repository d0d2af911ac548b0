//! `demisto-mcp tools` - print the tool catalogue.

use anyhow::{Context, Result};
use serde_json::json;

use super::build_dispatcher;
use crate::config::ServerConfig;

pub fn execute(config: &ServerConfig) -> Result<()> {
    let dispatcher = build_dispatcher(config);
    let catalogue = json!({"tools": dispatcher.tool_definitions()});
    let text =
        serde_json::to_string_pretty(&catalogue).context("Failed to serialize tool catalogue")?;
    println!("{text}");
    Ok(())
}
