//! MCP stdio server.
//!
//! Reads one JSON-RPC message per line from the client and writes one
//! response per line. Logging goes to stderr; stdout carries only protocol.

mod core;
pub mod protocol;

pub use self::core::{McpServer, MAX_IN_FLIGHT, SERVER_NAME};
pub use protocol::{Request, Response, RpcError, PROTOCOL_VERSION};
