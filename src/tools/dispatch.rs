//! Tool-call boundary.

use serde_json::{json, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::args::ToolArgs;
use super::catalogue::{tool_definition, SdkTool};
use super::guard::PathGuard;
use super::handlers;
use super::ToolName;
use crate::config::PathPolicy;
use crate::runner::{CommandRunner, ExecutionOutcome};
use crate::search::{PatternSearch, RagTool};

/// Routes tool calls to handlers and turns every result into a text payload.
///
/// Built once at startup. Nothing here ever returns an error or unwinds to
/// the caller; rejections, failures and panics all become structured payloads.
#[derive(Clone)]
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    search: Option<Arc<PatternSearch>>,
    path_policy: PathPolicy,
}

impl Dispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>, path_policy: PathPolicy) -> Self {
        Self {
            runner,
            search: None,
            path_policy,
        }
    }

    /// Register the pattern-search tools.
    pub fn with_search(mut self, search: Arc<PatternSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn rag_available(&self) -> bool {
        self.search.is_some()
    }

    pub fn path_policy(&self) -> PathPolicy {
        self.path_policy
    }

    /// `tools/list` entries for every registered tool.
    pub fn tool_definitions(&self) -> Vec<Value> {
        let mut tools: Vec<Value> = SdkTool::ALL
            .iter()
            .map(|t| tool_definition(t.name(), t.description(), t.input_schema()))
            .collect();
        if self.rag_available() {
            tools.extend(
                RagTool::ALL
                    .iter()
                    .map(|t| tool_definition(t.name(), t.description(), t.input_schema())),
            );
        }
        tools
    }

    /// Invoke `name` with `arguments` and return the pretty-printed payload.
    pub fn call(&self, name: &str, arguments: Value) -> String {
        let Some(tool) = ToolName::parse(name, self.rag_available()) else {
            warn!(tool = name, "unknown tool");
            return format!("Unknown tool: {name}");
        };

        let args = ToolArgs::new(arguments);
        debug!(tool = name, "tool call");

        match tool {
            ToolName::Sdk(tool) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.call_sdk(tool, &args)))
                    .unwrap_or_else(|payload| {
                        let message = panic_message(payload.as_ref());
                        error!(tool = name, panic = %message, "tool handler panicked");
                        ExecutionOutcome::internal(format!("Internal error: {message}"))
                    });
                outcome.to_payload()
            }
            ToolName::Rag(tool) => {
                let value = match &self.search {
                    Some(search) => {
                        panic::catch_unwind(AssertUnwindSafe(|| tool.call(search, &args)))
                            .unwrap_or_else(|payload| {
                                let message = panic_message(payload.as_ref());
                                error!(tool = name, panic = %message, "tool handler panicked");
                                json!({"error": format!("Internal error: {message}")})
                            })
                    }
                    None => json!({"error": "Pattern search is not available."}),
                };
                serde_json::to_string_pretty(&value).unwrap_or_else(|e| {
                    format!("{{\"error\": \"failed to serialize result: {e}\"}}")
                })
            }
        }
    }

    /// Validate and build, then run. Nothing on disk changes before the
    /// arguments have passed validation.
    fn call_sdk(&self, tool: SdkTool, args: &ToolArgs) -> ExecutionOutcome {
        let guard = match self.path_policy {
            PathPolicy::CharactersOnly => PathGuard::characters_only(),
            PathPolicy::ContentRoot => match self.runner.locate_content_root() {
                Ok(root) => PathGuard::confined(root),
                Err(e) => {
                    warn!(error = %e, "failed to locate content root");
                    return ExecutionOutcome::internal(format!(
                        "Failed to locate content root: {e}"
                    ));
                }
            },
        };

        let spec = match handlers::build(tool, args, &guard) {
            Ok(spec) => spec,
            Err(reason) => {
                warn!(tool = tool.name(), reason = %reason, "tool call rejected");
                return ExecutionOutcome::rejected(reason);
            }
        };

        match guard.root() {
            Some(root) => self.runner.run(&spec.in_dir(root)),
            None => self.runner.run(&spec),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("rag_available", &self.rag_available())
            .field("path_policy", &self.path_policy)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
