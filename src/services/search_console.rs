use crate::constants::api::{BASE_URL, BASE_URL_ENV};
use crate::constants::limits::{DEFAULT_ROW_LIMIT, ERROR_BODY_MAX_CHARS};
use crate::errors::GscError;
use crate::models::{
    AnalyticsQuery, ApiSearchAnalyticsRequest, ApiSearchAnalyticsResponse, ApiSiteListResponse,
    ApiSitemapListResponse, SearchAnalyticsResponse, SiteList, Sitemap, SitemapList,
};
use crate::services::logger::Logger;
use crate::services::site_identity::{normalize, SiteIdentity};
use crate::services::site_resolver::{resolve_site, SiteLister};
use crate::services::transport::{ApiRequest, ApiTransport};
use crate::utils::text::truncate_with_ellipsis;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use url::Url;

pub fn resolve_api_base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .map(|raw| raw.trim().trim_end_matches('/').to_string())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| BASE_URL.to_string())
}

/// Search Console API operations. Every operation that takes a site accepts
/// free-form input (`example.com`, `https://example.com/blog`,
/// `sc-domain:example.com`) and recovers from a wrong guess once.
pub struct SearchConsoleClient {
    logger: Logger,
    transport: Arc<dyn ApiTransport>,
    base_url: String,
}

impl SearchConsoleClient {
    pub fn new(logger: Logger, transport: Arc<dyn ApiTransport>, base_url: impl Into<String>) -> Self {
        Self {
            logger: logger.child("client"),
            transport,
            base_url: base_url.into(),
        }
    }

    pub async fn query_search_analytics(
        &self,
        site_url: &str,
        query: &AnalyticsQuery,
    ) -> Result<SearchAnalyticsResponse, GscError> {
        self.with_site_resolution(site_url, |site| self.query_search_analytics_for(site, query))
            .await
    }

    pub async fn list_sitemaps(&self, site_url: &str) -> Result<SitemapList, GscError> {
        self.with_site_resolution(site_url, |site| self.list_sitemaps_for(site))
            .await
    }

    pub async fn list_sites(&self) -> Result<SiteList, GscError> {
        let url = self.endpoint(&["sites"])?;
        let raw: ApiSiteListResponse = self.send(ApiRequest::get(url), "sites").await?;
        Ok(SiteList {
            sites: raw.site_entry,
            queried_at: Utc::now(),
        })
    }

    /// Runs `op` against the normalized identity. A 403 triggers one lookup of
    /// the accessible properties and exactly one retry against the match.
    /// When the lookup itself fails, the original 403 is what the caller sees.
    async fn with_site_resolution<T, F, Fut>(&self, raw: &str, op: F) -> Result<T, GscError>
    where
        F: Fn(SiteIdentity) -> Fut,
        Fut: Future<Output = Result<T, GscError>>,
    {
        let normalized = normalize(raw);
        let first_error = match op(normalized.clone()).await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_permission_denied() => err,
            Err(err) => return Err(err),
        };

        self.logger.info(
            "site URL returned 403, attempting property resolution",
            Some(&serde_json::json!({ "input": raw, "tried": normalized.to_string() })),
        );
        let resolved = match resolve_site(self, raw).await {
            Ok(resolved) => resolved,
            Err(resolve_err) => {
                self.logger.warn(
                    "property resolution failed",
                    Some(&serde_json::json!({ "input": raw, "error": resolve_err.to_string() })),
                );
                return Err(first_error);
            }
        };

        self.logger.info(
            "retrying with resolved property",
            Some(&serde_json::json!({ "input": raw, "resolved": resolved.to_string() })),
        );
        op(resolved).await
    }

    async fn query_search_analytics_for(
        &self,
        site: SiteIdentity,
        query: &AnalyticsQuery,
    ) -> Result<SearchAnalyticsResponse, GscError> {
        let row_limit = if query.row_limit <= 0 {
            DEFAULT_ROW_LIMIT
        } else {
            query.row_limit
        };
        let site_url = site.to_string();
        let body = serde_json::to_value(ApiSearchAnalyticsRequest {
            start_date: &query.start_date,
            end_date: &query.end_date,
            dimensions: &query.dimensions,
            row_limit,
        })
        .map_err(|err| GscError::Malformed(format!("encoding request body: {}", err)))?;
        let url = self.endpoint(&["sites", &site_url, "searchAnalytics", "query"])?;
        let raw: ApiSearchAnalyticsResponse = self
            .send(ApiRequest::post_json(url, body), "search analytics")
            .await?;

        Ok(SearchAnalyticsResponse {
            site_url,
            start_date: query.start_date.clone(),
            end_date: query.end_date.clone(),
            dimensions: query.dimensions.clone(),
            row_count: raw.rows.len(),
            rows: raw.rows,
            queried_at: Utc::now(),
        })
    }

    async fn list_sitemaps_for(&self, site: SiteIdentity) -> Result<SitemapList, GscError> {
        let site_url = site.to_string();
        let url = self.endpoint(&["sites", &site_url, "sitemaps"])?;
        let raw: ApiSitemapListResponse = self.send(ApiRequest::get(url), "sitemaps").await?;
        Ok(SitemapList {
            site_url,
            sitemaps: raw.sitemap.into_iter().map(Sitemap::from).collect(),
            queried_at: Utc::now(),
        })
    }

    /// Appends percent-encoded path segments to the base URL. A site identity
    /// is always one segment, so `https://x.com/` becomes `https:%2F%2Fx.com%2F`.
    fn endpoint(&self, segments: &[&str]) -> Result<String, GscError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| GscError::Transport(format!("invalid API base URL: {}", err)))?;
        url.path_segments_mut()
            .map_err(|_| GscError::Transport("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest, what: &str) -> Result<T, GscError> {
        self.logger.debug(
            "request",
            Some(&serde_json::json!({ "method": request.method.as_str(), "url": request.url })),
        );
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(GscError::from_status(
                response.status,
                truncate_with_ellipsis(&response.body, ERROR_BODY_MAX_CHARS),
            ));
        }
        serde_json::from_str(&response.body)
            .map_err(|err| GscError::Malformed(format!("parsing {} response: {}", what, err)))
    }
}

#[async_trait]
impl SiteLister for SearchConsoleClient {
    async fn list_sites(&self) -> Result<SiteList, GscError> {
        SearchConsoleClient::list_sites(self).await
    }
}
