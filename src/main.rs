use clap::Parser;
use search_console_mcp::app::App;
use search_console_mcp::constants::credentials::{
    ENV_SERVICE_ACCOUNT_FILE, ENV_SERVICE_ACCOUNT_JSON,
};
use search_console_mcp::mcp::server::McpServer;
use search_console_mcp::services::credentials::CredentialResolver;
use search_console_mcp::services::logger::Logger;
use std::path::PathBuf;

/// MCP server exposing Google Search Console analytics over stdio.
#[derive(Debug, Parser)]
#[command(name = "search-console-mcp", version)]
struct Args {
    /// Path to a Google service account JSON key file.
    #[arg(long, value_name = "PATH")]
    service_account_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let logger = Logger::new("search-console-mcp");

    let Some(credentials) =
        CredentialResolver::new(logger.clone()).resolve(args.service_account_file.as_deref())
    else {
        logger.error(
            "no service account credentials provided",
            Some(&serde_json::json!({
                "hint": format!(
                    "set --service-account-file, {} or {}",
                    ENV_SERVICE_ACCOUNT_FILE, ENV_SERVICE_ACCOUNT_JSON
                ),
            })),
        );
        std::process::exit(1);
    };

    let app = match App::initialize(logger.clone(), &credentials) {
        Ok(app) => app,
        Err(err) => {
            logger.error(
                "failed to create Search Console client",
                Some(&serde_json::json!({ "error": err.message })),
            );
            std::process::exit(1);
        }
    };

    if let Err(err) = McpServer::new(app).run_stdio().await {
        logger.error(
            "server stopped with error",
            Some(&serde_json::json!({ "error": err.message })),
        );
        std::process::exit(1);
    }
}
