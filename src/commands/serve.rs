//! `demisto-mcp serve`

use anyhow::Result;
use std::sync::Arc;

use super::build_dispatcher;
use crate::config::ServerConfig;
use crate::server::McpServer;

/// Run the stdio server until the client closes stdin.
pub fn execute(config: &ServerConfig) -> Result<()> {
    let dispatcher = Arc::new(build_dispatcher(config));
    McpServer::new(dispatcher).serve_stdio()
}
