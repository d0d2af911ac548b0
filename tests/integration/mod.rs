//! Integration tests for demisto-mcp
//!
//! These drive the dispatcher and the stdio server end to end, with a fake
//! `demisto-sdk` shell script standing in for the real SDK.

pub mod helpers;
pub mod sdk_execution;
pub mod security_gates;
pub mod stdio_server;
