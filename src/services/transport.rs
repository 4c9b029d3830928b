use crate::errors::GscError;
use crate::services::auth::ServiceAccountAuth;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated "send request, get status and body" capability. Status
/// handling belongs to the caller; only network-level failures are errors.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GscError>;
}

pub struct ReqwestTransport {
    client: Client,
    auth: Arc<ServiceAccountAuth>,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(client: Client, auth: Arc<ServiceAccountAuth>, timeout: Duration) -> Self {
        Self {
            client,
            auth,
            timeout,
        }
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, GscError> {
        let token = self.auth.access_token().await?;
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .bearer_auth(token)
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(ApiResponse { status, body })
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> GscError {
    if err.is_timeout() {
        return GscError::Timeout;
    }
    GscError::Transport(err.to_string())
}
