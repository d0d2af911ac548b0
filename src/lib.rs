pub mod commands;
pub mod config;
pub mod runner;
pub mod search;
pub mod security;
pub mod server;
pub mod tools;

/// Environment variable holding the log filter; `RUST_LOG` is the fallback.
pub const LOG_ENV: &str = "DEMISTO_MCP_LOG";
