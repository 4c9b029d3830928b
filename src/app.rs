use crate::constants::network::TIMEOUT_API_REQUEST_MS;
use crate::errors::ToolError;
use crate::managers::search_analytics::SearchAnalyticsManager;
use crate::managers::sitemaps::SitemapsManager;
use crate::managers::sites::SitesManager;
use crate::mcp::catalog::tool_catalog;
use crate::services::auth::{ServiceAccountAuth, ServiceAccountKey};
use crate::services::credentials::Credentials;
use crate::services::logger::Logger;
use crate::services::search_console::{resolve_api_base_url, SearchConsoleClient};
use crate::services::tool_executor::{ToolExecutor, ToolHandler};
use crate::services::transport::{ApiTransport, ReqwestTransport};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct App {
    pub logger: Logger,
    pub tool_executor: Arc<ToolExecutor>,
}

impl App {
    fn validate_tool_wiring(handlers: &HashMap<String, Arc<dyn ToolHandler>>) -> Result<(), ToolError> {
        let mut missing: Vec<String> = tool_catalog()
            .iter()
            .filter(|tool| !handlers.contains_key(&tool.name))
            .map(|tool| tool.name.clone())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(ToolError::internal("Tool wiring is incomplete")
            .with_hint("Every tool in tool_catalog.json must have a handler.")
            .with_details(serde_json::json!({ "missing_tools": missing })))
    }

    /// Production wiring: service account auth over reqwest against the
    /// configured API base URL.
    pub fn initialize(logger: Logger, credentials: &Credentials) -> Result<Self, ToolError> {
        let key = ServiceAccountKey::from_json(&credentials.service_account_json)?;
        let timeout = Duration::from_millis(TIMEOUT_API_REQUEST_MS);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ToolError::internal(format!("Failed to build HTTP client: {}", err)))?;
        let auth = Arc::new(ServiceAccountAuth::new(
            logger.clone(),
            key,
            http.clone(),
            timeout,
        )?);
        logger.info(
            "service account ready",
            Some(&serde_json::json!({ "client_email": auth.client_email() })),
        );
        let transport: Arc<dyn ApiTransport> = Arc::new(ReqwestTransport::new(http, auth, timeout));
        Self::with_transport(logger, transport, resolve_api_base_url())
    }

    pub fn with_transport(
        logger: Logger,
        transport: Arc<dyn ApiTransport>,
        base_url: impl Into<String>,
    ) -> Result<Self, ToolError> {
        let client = Arc::new(SearchConsoleClient::new(logger.clone(), transport, base_url));

        let mut handlers: HashMap<String, Arc<dyn ToolHandler>> = HashMap::new();
        handlers.insert(
            "query_search_analytics".to_string(),
            Arc::new(SearchAnalyticsManager::new(logger.clone(), client.clone())),
        );
        handlers.insert(
            "list_sites".to_string(),
            Arc::new(SitesManager::new(logger.clone(), client.clone())),
        );
        handlers.insert(
            "list_sitemaps".to_string(),
            Arc::new(SitemapsManager::new(logger.clone(), client)),
        );

        Self::validate_tool_wiring(&handlers)?;

        let tool_executor = Arc::new(ToolExecutor::new(logger.clone(), handlers));
        Ok(Self {
            logger,
            tool_executor,
        })
    }
}
