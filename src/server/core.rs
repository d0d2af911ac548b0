//! Stdio request loop.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use super::protocol::{
    self, Request, Response, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND, PROTOCOL_VERSION,
    SERVER_BUSY,
};
use crate::tools::Dispatcher;

/// Maximum number of tool calls running at once.
pub const MAX_IN_FLIGHT: usize = 16;

pub const SERVER_NAME: &str = "demisto-mcp";

type SharedWriter<W> = Arc<Mutex<W>>;

/// MCP server speaking newline-delimited JSON-RPC over a reader/writer pair.
///
/// `tools/call` runs on a worker thread so a slow subprocess never blocks the
/// read loop. Every response goes through one locked writer, one line each.
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: usize,
}

impl McpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: MAX_IN_FLIGHT,
        }
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    /// Serve stdin/stdout until stdin closes.
    pub fn serve_stdio(&self) -> Result<()> {
        let stdin = std::io::stdin();
        self.serve(stdin.lock(), std::io::stdout())
    }

    /// Read requests until EOF, then wait for outstanding tool calls.
    pub fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: BufRead,
        W: Write + Send + 'static,
    {
        info!(
            tools = self.dispatcher.tool_definitions().len(),
            rag_available = self.dispatcher.rag_available(),
            "server started"
        );
        let writer = Arc::new(Mutex::new(writer));
        let mut workers: Vec<JoinHandle<()>> = Vec::new();

        for line in reader.lines() {
            let line = line.context("Failed to read request")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            workers.retain(|handle| !handle.is_finished());

            match protocol::parse_request(line) {
                Ok(request) => {
                    if let Some(worker) = self.handle(request, &writer)? {
                        workers.push(worker);
                    }
                }
                Err(response) => {
                    warn!(line = %line, "malformed request");
                    send(&writer, &response)?;
                }
            }
        }

        debug!(outstanding = workers.len(), "input closed, waiting for tool calls");
        for worker in workers {
            if worker.join().is_err() {
                warn!("tool worker panicked");
            }
        }
        info!("server stopped");
        Ok(())
    }

    fn handle<W>(
        &self,
        request: Request,
        writer: &SharedWriter<W>,
    ) -> Result<Option<JoinHandle<()>>>
    where
        W: Write + Send + 'static,
    {
        let Some(id) = request.id else {
            debug!(method = %request.method, "notification");
            return Ok(None);
        };

        let response = match request.method.as_str() {
            "initialize" => Response::success(id, initialize_result(&request.params)),
            "ping" => Response::success(id, json!({})),
            "tools/list" => {
                Response::success(id, json!({"tools": self.dispatcher.tool_definitions()}))
            }
            "tools/call" => return self.spawn_call(id, request.params, writer),
            other => {
                debug!(method = other, "unknown method");
                Response::error(id, METHOD_NOT_FOUND, format!("Unknown method: {other}"))
            }
        };
        send(writer, &response)?;
        Ok(None)
    }

    fn spawn_call<W>(
        &self,
        id: Value,
        params: Value,
        writer: &SharedWriter<W>,
    ) -> Result<Option<JoinHandle<()>>>
    where
        W: Write + Send + 'static,
    {
        let Some(name) = params.get("name").and_then(Value::as_str).map(str::to_owned) else {
            send(writer, &Response::error(id, INVALID_PARAMS, "Missing tool name"))?;
            return Ok(None);
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        // Only this thread increments, so load-then-add cannot overshoot.
        let current = self.in_flight.load(Ordering::SeqCst);
        if current >= self.max_in_flight {
            warn!(tool = %name, in_flight = current, "tool call limit reached, rejecting");
            let message = format!("Server busy: {current} tool calls already in flight");
            send(writer, &Response::error(id, SERVER_BUSY, message))?;
            return Ok(None);
        }
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        let dispatcher = Arc::clone(&self.dispatcher);
        let in_flight = Arc::clone(&self.in_flight);
        let worker_writer = Arc::clone(writer);
        let worker_id = id.clone();
        let spawned = thread::Builder::new()
            .name(format!("tool-{name}"))
            .spawn(move || {
                let text = dispatcher.call(&name, arguments);
                in_flight.fetch_sub(1, Ordering::SeqCst);
                let response = Response::success(worker_id, protocol::text_content(text));
                if let Err(e) = send(&worker_writer, &response) {
                    warn!(tool = %name, error = %e, "failed to write tool result");
                }
            });

        match spawned {
            Ok(handle) => Ok(Some(handle)),
            Err(e) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                warn!(error = %e, "failed to spawn tool worker");
                let message = format!("Failed to start tool call: {e}");
                send(writer, &Response::error(id, INTERNAL_ERROR, message))?;
                Ok(None)
            }
        }
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("dispatcher", &self.dispatcher)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}

fn initialize_result(params: &Value) -> Value {
    let version = params
        .get("protocolVersion")
        .and_then(Value::as_str)
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": {"tools": {}},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn send<W: Write>(writer: &SharedWriter<W>, response: &Response) -> Result<()> {
    let mut guard = writer.lock().unwrap_or_else(PoisonError::into_inner);
    protocol::write_message(&mut *guard, response)
}
