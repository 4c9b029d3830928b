pub mod auth;
pub mod credentials;
pub mod logger;
pub mod search_console;
pub mod site_identity;
pub mod site_resolver;
pub mod tool_executor;
pub mod transport;
