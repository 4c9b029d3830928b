use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ToolError;
use crate::services::logger::Logger;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn handle(&self, args: Value) -> Result<Value, ToolError>;
}

#[derive(Clone)]
pub struct ToolExecutor {
    logger: Logger,
    handlers: Arc<HashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolExecutor {
    pub fn new(logger: Logger, handlers: HashMap<String, Arc<dyn ToolHandler>>) -> Self {
        Self {
            logger: logger.child("executor"),
            handlers: Arc::new(handlers),
        }
    }

    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatches one tool call. `trace_id` is taken from the arguments when
    /// present, generated otherwise, and stripped before the handler sees them.
    pub async fn execute(&self, tool: &str, args: Value) -> Result<Value, ToolError> {
        let Some(handler) = self.handlers.get(tool) else {
            return Err(
                ToolError::invalid_params(format!("Unknown tool: {}", tool)).with_hint(format!(
                    "Available tools: {}",
                    self.tool_names().join(", ")
                )),
            );
        };

        let trace_id = args
            .get("trace_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut cleaned = args;
        if let Value::Object(map) = &mut cleaned {
            map.remove("trace_id");
        }

        let started_at = chrono::Utc::now().timestamp_millis();
        self.logger.debug(
            "tool call started",
            Some(&serde_json::json!({ "tool": tool, "trace_id": trace_id })),
        );
        let result = handler.handle(cleaned).await;
        let duration_ms = chrono::Utc::now().timestamp_millis() - started_at;

        match &result {
            Ok(_) => self.logger.info(
                "tool call finished",
                Some(&serde_json::json!({
                    "tool": tool,
                    "trace_id": trace_id,
                    "duration_ms": duration_ms,
                })),
            ),
            Err(err) => self.logger.warn(
                "tool call failed",
                Some(&serde_json::json!({
                    "tool": tool,
                    "trace_id": trace_id,
                    "duration_ms": duration_ms,
                    "kind": err.kind,
                    "error": err.message,
                })),
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<Value>>);

    #[async_trait]
    impl ToolHandler for Recorder {
        async fn handle(&self, args: Value) -> Result<Value, ToolError> {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(args.clone());
            }
            Ok(serde_json::json!({ "ok": true }))
        }
    }

    #[tokio::test]
    async fn execute_strips_trace_id_before_dispatch() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert("list_sites".to_string(), recorder.clone());
        let executor = ToolExecutor::new(Logger::new("test"), handlers);

        let result = executor
            .execute("list_sites", serde_json::json!({ "trace_id": "abc" }))
            .await
            .expect("dispatch");
        assert_eq!(result, serde_json::json!({ "ok": true }));

        let seen = recorder.0.lock().expect("lock");
        assert_eq!(seen.as_slice(), &[serde_json::json!({})]);
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let executor = ToolExecutor::new(Logger::new("test"), HashMap::new());
        let err = executor
            .execute("nope", Value::Null)
            .await
            .expect_err("unknown tool");
        assert_eq!(err.kind, crate::errors::ToolErrorKind::InvalidParams);
    }
}
