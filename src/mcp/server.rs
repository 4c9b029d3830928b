use crate::app::App;
use crate::errors::{ErrorCode, McpError, ToolError};
use crate::mcp::catalog::{tool_by_name, tool_catalog, validate_tool_args};
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::task::{AbortHandle, JoinSet};

const PROTOCOL_VERSION: &str = "2025-06-18";
const SERVER_NAME: &str = "search-console-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn text_content(payload: &Value, is_error: bool) -> Value {
    let text = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    let mut result = serde_json::json!({
        "content": [ { "type": "text", "text": text } ]
    });
    if is_error {
        result["isError"] = Value::Bool(true);
    }
    result
}

/// Upstream and argument failures inside a tool are results the assistant
/// can read and act on, not protocol errors.
fn tool_error_result(error: &ToolError) -> Value {
    text_content(&error.to_payload(), true)
}

enum Incoming {
    Reply(JsonRpcResponse),
    Call { id: Value, params: Value },
    Cancel(Value),
    Ignore,
}

/// In-flight calls are keyed by the JSON text of their id, so `1` and `"1"`
/// stay distinct.
fn request_key(id: &Value) -> String {
    id.to_string()
}

async fn write_response<W>(writer: &mut W, response: &JsonRpcResponse) -> Result<(), ToolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_string(response).unwrap_or_default();
    writer.write_all(payload.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: App) -> Self {
        Self { app: Arc::new(app) }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": tool_catalog() })
    }

    /// Runs one `tools/call`. Owns its inputs so it can be spawned and later
    /// aborted by a `notifications/cancelled`.
    async fn call_tool(app: Arc<App>, id: Value, params: Value) -> JsonRpcResponse {
        match Self::handle_tools_call(&app, &params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::failure(id, err.code.as_i32(), err.message),
        }
    }

    async fn handle_tools_call(app: &App, params: &Value) -> Result<Value, McpError> {
        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        if name.is_empty() {
            return Err(McpError::invalid_params("Missing tool name"));
        }
        if tool_by_name(name).is_none() {
            let known: Vec<&str> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
            return Err(McpError::invalid_params(format!(
                "Unknown tool: {} (available: {})",
                name,
                known.join(", ")
            )));
        }
        let args = params
            .get("arguments")
            .cloned()
            .filter(|v| !v.is_null())
            .unwrap_or_else(|| Value::Object(Default::default()));
        validate_tool_args(name, &args)?;

        match app.tool_executor.execute(name, args).await {
            Ok(result) => Ok(text_content(&result, false)),
            Err(err) => Ok(tool_error_result(&err)),
        }
    }

    fn classify(&self, line: &str) -> Incoming {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Incoming::Ignore;
        }

        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Incoming::Reply(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error",
                ))
            }
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => {
                return Incoming::Reply(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request",
                ))
            }
        };

        if request.is_notification() {
            if request.method == "notifications/cancelled" {
                return match request.params.get("requestId") {
                    Some(target) if !target.is_null() => Incoming::Cancel(target.clone()),
                    _ => Incoming::Ignore,
                };
            }
            if !request.method.starts_with("notifications/") {
                self.app.logger.debug(
                    "ignoring request without id",
                    Some(&serde_json::json!({ "method": request.method })),
                );
            }
            return Incoming::Ignore;
        }
        let id = request.id.clone().unwrap_or(Value::Null);

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.handle_tools_list()),
            "tools/call" => {
                return Incoming::Call {
                    id,
                    params: request.params,
                }
            }
            method if method.starts_with("notifications/") => {
                JsonRpcResponse::success(id, serde_json::json!({}))
            }
            _ => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                "Method not found",
            ),
        };
        Incoming::Reply(response)
    }

    /// Reads JSON-RPC lines until EOF. Tool calls run as separate tasks so
    /// the reader keeps serving `ping` and cancellations while they are in
    /// flight; aborting a task drops its pending upstream request. After EOF
    /// the loop drains the calls still running.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ToolError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut writer = writer;
        let mut calls: JoinSet<JsonRpcResponse> = JoinSet::new();
        let mut in_flight: HashMap<String, AbortHandle> = HashMap::new();
        let mut reading = true;

        loop {
            tokio::select! {
                line = lines.next_line(), if reading => {
                    let Some(line) = line.map_err(|err| ToolError::internal(err.to_string()))? else {
                        reading = false;
                        continue;
                    };
                    match self.classify(&line) {
                        Incoming::Reply(response) => write_response(&mut writer, &response).await?,
                        Incoming::Call { id, params } => {
                            let key = request_key(&id);
                            let handle = calls.spawn(Self::call_tool(self.app.clone(), id, params));
                            if let Some(previous) = in_flight.insert(key, handle) {
                                previous.abort();
                            }
                        }
                        Incoming::Cancel(target) => {
                            if let Some(handle) = in_flight.remove(&request_key(&target)) {
                                handle.abort();
                                self.app.logger.info(
                                    "tool call cancelled",
                                    Some(&serde_json::json!({ "request_id": target })),
                                );
                            }
                        }
                        Incoming::Ignore => {}
                    }
                }
                Some(joined) = calls.join_next() => match joined {
                    Ok(response) => {
                        in_flight.remove(&request_key(&response.id));
                        write_response(&mut writer, &response).await?;
                    }
                    Err(err) if err.is_cancelled() => {}
                    Err(err) => self.app.logger.error(
                        "tool call task failed",
                        Some(&serde_json::json!({ "error": err.to_string() })),
                    ),
                },
                else => break,
            }
        }
        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), ToolError> {
        self.app.logger.info(
            "search-console-mcp starting",
            Some(&serde_json::json!({ "version": SERVER_VERSION, "transport": "stdio" })),
        );
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }
}
