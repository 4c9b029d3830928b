use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::search_console::SearchConsoleClient;
use crate::services::tool_executor::ToolHandler;
use serde_json::Value;
use std::sync::Arc;

/// Handler for `list_sites`. Takes no arguments.
#[derive(Clone)]
pub struct SitesManager {
    logger: Logger,
    client: Arc<SearchConsoleClient>,
}

impl SitesManager {
    pub fn new(logger: Logger, client: Arc<SearchConsoleClient>) -> Self {
        Self {
            logger: logger.child("sites"),
            client,
        }
    }

    pub async fn list(&self) -> Result<Value, ToolError> {
        let response = self
            .client
            .list_sites()
            .await
            .map_err(|err| ToolError::from(err).with_context("listing sites"))?;
        serde_json::to_value(response)
            .map_err(|err| ToolError::internal(format!("marshalling result: {}", err)))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SitesManager {
    async fn handle(&self, _args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", None);
        self.list().await
    }
}
