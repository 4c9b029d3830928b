#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Method;
use search_console_mcp::errors::GscError;
use search_console_mcp::services::transport::{ApiRequest, ApiResponse, ApiTransport};
use std::sync::Mutex;

pub static ENV_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

pub const BASE_URL: &str = "https://gsc.test/webmasters/v3";

pub fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

struct Route {
    method: Method,
    url: String,
    status: u16,
    body: String,
}

/// Canned upstream: answers by exact method + URL and records every request.
/// Unrouted requests get a 404 so a wrong identity shows up as a failure.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(Route {
                method,
                url: url(path),
                status,
                body: body.to_string(),
            });
        }
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GscError> {
        if let Ok(mut log) = self.log.lock() {
            log.push(request.clone());
        }
        let routes = self
            .routes
            .lock()
            .map_err(|_| GscError::Transport("route table poisoned".to_string()))?;
        let response = routes
            .iter()
            .find(|route| route.method == request.method && route.url == request.url)
            .map(|route| ApiResponse {
                status: route.status,
                body: route.body.clone(),
            })
            .unwrap_or_else(|| ApiResponse {
                status: 404,
                body: format!("no route for {} {}", request.method, request.url),
            });
        Ok(response)
    }
}

pub const SITES_PATH: &str = "/sites";

pub fn query_path(encoded_site: &str) -> String {
    format!("/sites/{}/searchAnalytics/query", encoded_site)
}

pub fn sitemaps_path(encoded_site: &str) -> String {
    format!("/sites/{}/sitemaps", encoded_site)
}

pub fn site_list(entries: &[&str]) -> String {
    let entries: Vec<serde_json::Value> = entries
        .iter()
        .map(|site| serde_json::json!({ "siteUrl": site, "permissionLevel": "siteFullUser" }))
        .collect();
    serde_json::json!({ "siteEntry": entries }).to_string()
}

/// Transport whose requests never complete, for cancellation tests.
#[derive(Default)]
pub struct StalledTransport {
    started: std::sync::atomic::AtomicUsize,
}

impl StalledTransport {
    pub fn started(&self) -> usize {
        self.started.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl ApiTransport for StalledTransport {
    async fn send(&self, _request: ApiRequest) -> Result<ApiResponse, GscError> {
        self.started
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        std::future::pending::<Result<ApiResponse, GscError>>().await
    }
}
