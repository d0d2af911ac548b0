//! Tool dispatch layer.
//!
//! Tool names are resolved to a closed [`ToolName`] once, handlers turn the
//! argument bag into a validated [`CommandSpec`](crate::runner::CommandSpec),
//! and the [`Dispatcher`] runs it and serializes the outcome.

mod args;
pub mod catalogue;
mod dispatch;
mod guard;
pub mod handlers;

pub use args::ToolArgs;
pub use catalogue::{tool_definition, SdkTool};
pub use dispatch::Dispatcher;
pub use guard::PathGuard;

use crate::search::RagTool;

/// Every tool the server can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Sdk(SdkTool),
    Rag(RagTool),
}

impl ToolName {
    /// Resolve a wire name. Pattern-search tools only resolve when search is
    /// available.
    pub fn parse(name: &str, rag_available: bool) -> Option<Self> {
        if let Some(tool) = SdkTool::from_name(name) {
            return Some(ToolName::Sdk(tool));
        }
        if rag_available {
            return RagTool::from_name(name).map(ToolName::Rag);
        }
        None
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolName::Sdk(tool) => tool.name(),
            ToolName::Rag(tool) => tool.name(),
        }
    }
}
