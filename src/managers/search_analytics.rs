use crate::errors::ToolError;
use crate::models::AnalyticsQuery;
use crate::services::logger::Logger;
use crate::services::search_console::SearchConsoleClient;
use crate::services::tool_executor::ToolHandler;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct QueryArgs {
    site_url: String,
    #[serde(flatten)]
    query: AnalyticsQuery,
}

/// Handler for `query_search_analytics`.
#[derive(Clone)]
pub struct SearchAnalyticsManager {
    logger: Logger,
    client: Arc<SearchConsoleClient>,
}

impl SearchAnalyticsManager {
    pub fn new(logger: Logger, client: Arc<SearchConsoleClient>) -> Self {
        Self {
            logger: logger.child("search_analytics"),
            client,
        }
    }

    pub async fn query(&self, args: Value) -> Result<Value, ToolError> {
        let args: QueryArgs = serde_json::from_value(args)
            .map_err(|err| ToolError::invalid_params(format!("query_search_analytics: {}", err)))?;
        if args.site_url.trim().is_empty() {
            return Err(ToolError::invalid_params("site_url must not be empty"));
        }
        let response = self
            .client
            .query_search_analytics(&args.site_url, &args.query)
            .await
            .map_err(|err| ToolError::from(err).with_context("querying search analytics"))?;
        serde_json::to_value(response)
            .map_err(|err| ToolError::internal(format!("marshalling result: {}", err)))
    }
}

#[async_trait::async_trait]
impl ToolHandler for SearchAnalyticsManager {
    async fn handle(&self, args: Value) -> Result<Value, ToolError> {
        self.logger.debug("handle", args.get("site_url"));
        self.query(args).await
    }
}
