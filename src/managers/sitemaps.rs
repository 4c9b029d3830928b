use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::search_console::SearchConsoleClient;
use crate::services::tool_executor::ToolHandler;
use serde_json::Value;
use std::sync::Arc;

/// Handler for `list_sitemaps`.
#[derive(Clone)]
pub struct SitemapsManager {
    logger: Logger,
    client: Arc<SearchConsoleClient>,
}

impl SitemapsManager {
    pub fn new(logger: Logger, client: Arc<SearchConsoleClient>) -> Self {
        Self {
            logger: logger.child("sitemaps"),
            client,
        }
    }

    pub async fn list(&self, args: Value) -> Result<Value, ToolError> {
        let site_url = args
            .get("site_url")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or("");
        if site_url.is_empty() {
            return Err(ToolError::invalid_params("site_url is required"));
        }
        let response = self
            .client
            .list_sitemaps(site_url)
            .await
            .map_err(|err| ToolError::from(err).with_context("listing sitemaps"))?;
        serde_json::to_value(response)
            .map_err(|err| ToolError::internal(format!("marshalling result: {}", err)))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SitemapsManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", args.get("site_url"));
        self.list(args).await
    }
}
