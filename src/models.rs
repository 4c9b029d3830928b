//! Request and response shapes. `Api*` types mirror the Webmasters v3 wire
//! format; the rest is what the tools hand back to the assistant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyticsQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub row_limit: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchAnalyticsRow {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsResponse {
    /// The property actually queried, after normalization or resolution.
    pub site_url: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    pub row_count: usize,
    pub rows: Vec<SearchAnalyticsRow>,
    pub queried_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteList {
    pub sites: Vec<Site>,
    pub queried_at: DateTime<Utc>,
}

impl SiteList {
    pub fn identities(&self) -> Vec<String> {
        self.sites.iter().map(|site| site.site_url.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sitemap {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_submitted: Option<DateTime<Utc>>,
    pub is_pending: bool,
    pub is_sitemaps_index: bool,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_downloaded: Option<DateTime<Utc>>,
    pub warnings: i64,
    pub errors: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapList {
    pub site_url: String,
    pub sitemaps: Vec<Sitemap>,
    pub queried_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiSearchAnalyticsRequest<'a> {
    pub start_date: &'a str,
    pub end_date: &'a str,
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub dimensions: &'a [String],
    pub row_limit: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Vec<SearchAnalyticsRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiSiteListResponse {
    #[serde(default)]
    pub site_entry: Vec<Site>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiSitemapEntry {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub last_submitted: Option<String>,
    #[serde(default)]
    pub is_pending: bool,
    #[serde(default)]
    pub is_sitemaps_index: bool,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub last_downloaded: Option<String>,
    #[serde(default, deserialize_with = "int64_lenient")]
    pub warnings: i64,
    #[serde(default, deserialize_with = "int64_lenient")]
    pub errors: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSitemapListResponse {
    #[serde(default)]
    pub sitemap: Vec<ApiSitemapEntry>,
}

impl From<ApiSitemapEntry> for Sitemap {
    fn from(entry: ApiSitemapEntry) -> Self {
        Sitemap {
            path: entry.path,
            last_submitted: parse_rfc3339(entry.last_submitted.as_deref()),
            is_pending: entry.is_pending,
            is_sitemaps_index: entry.is_sitemaps_index,
            kind: entry.kind,
            last_downloaded: parse_rfc3339(entry.last_downloaded.as_deref()),
            warnings: entry.warnings,
            errors: entry.errors,
        }
    }
}

fn is_empty_slice(value: &&[String]) -> bool {
    value.is_empty()
}

fn parse_rfc3339(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

// Google encodes int64 fields as JSON strings.
fn int64_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
